//! Deposit lifecycle transition rules.
//!
//! Deposits move through valid lifecycle states:
//! NotDepositedYet -> Deposited -> Claimed | Cancelled | Expired.
//! Cancelling an untouched key moves it straight from NotDepositedYet to
//! Cancelled, which permanently retires the key.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use teller_types::DepositStatus;

// Static transition table - each state maps to allowed next states
static TRANSITIONS: Lazy<HashMap<DepositStatus, HashSet<DepositStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		DepositStatus::NotDepositedYet,
		HashSet::from([DepositStatus::Deposited, DepositStatus::Cancelled]),
	);
	m.insert(
		DepositStatus::Deposited,
		HashSet::from([
			DepositStatus::Claimed,
			DepositStatus::Cancelled,
			DepositStatus::Expired,
		]),
	);
	m.insert(DepositStatus::Claimed, HashSet::new()); // terminal
	m.insert(DepositStatus::Cancelled, HashSet::new()); // terminal
	m.insert(DepositStatus::Expired, HashSet::new()); // terminal
	m
});

/// Checks if a lifecycle transition is valid.
pub fn is_valid_transition(from: DepositStatus, to: DepositStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}
