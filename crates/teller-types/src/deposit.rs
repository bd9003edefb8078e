//! Deposit record types for the escrow state machine.
//!
//! This module defines the record keyed by (giver, asset, transferId) that
//! the claim engine carries through its lifecycle, along with the status
//! enum shared by the engine, the API layer, and tests.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset identifier reserved for the chain's native currency.
///
/// Any other asset value denotes a fungible-token contract. Native deposits
/// carry their value attached to the call instead of being pulled through a
/// token allowance.
pub const NATIVE_ASSET: Address = Address::ZERO;

/// Caller-chosen 32-byte key distinguishing multiple concurrent escrows
/// from the same giver/asset pair.
pub type TransferId = B256;

/// Returns true when the asset identifier denotes the native currency.
pub fn is_native_asset(asset: &Address) -> bool {
	*asset == NATIVE_ASSET
}

/// Key identifying a single escrow record.
///
/// One record exists per key at a time; once a key leaves `NotDepositedYet`
/// it never returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositKey {
	/// Party whose value is locked under this key.
	pub giver: Address,
	/// Asset identifier (zero address for the native currency).
	pub asset: Address,
	/// Caller-chosen transfer identifier.
	pub transfer_id: TransferId,
}

impl DepositKey {
	pub fn new(giver: Address, asset: Address, transfer_id: TransferId) -> Self {
		Self {
			giver,
			asset,
			transfer_id,
		}
	}
}

impl fmt::Display for DepositKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.giver, self.asset, self.transfer_id)
	}
}

/// A deposit held in escrow.
///
/// `amount` for a `Deposited` record is locked value actually held by the
/// custody address in the balance ledger; every transition out of
/// `Deposited` is paired with a release of exactly `amount` to the correct
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
	/// Asset identifier (zero address for the native currency).
	pub asset: Address,
	/// Quantity held in escrow for this record.
	pub amount: U256,
	/// Absolute unix timestamp after which the deposit is no longer
	/// claimable and becomes refundable.
	pub expiration: u64,
	/// Current lifecycle status.
	pub status: DepositStatus,
}

impl DepositRecord {
	/// A zero-value `Cancelled` record, written when a giver burns a key
	/// that was never deposited into.
	pub fn burned(asset: Address) -> Self {
		Self {
			asset,
			amount: U256::ZERO,
			expiration: 0,
			status: DepositStatus::Cancelled,
		}
	}
}

/// Status of a deposit record.
///
/// `NotDepositedYet` is the default for keys that have never been touched;
/// records advance along NotDepositedYet -> Deposited -> {Claimed |
/// Cancelled}, or Deposited -> Expired via refund.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DepositStatus {
	/// No deposit has ever been made at this key.
	#[default]
	NotDepositedYet,
	/// Value is locked and awaiting claim, cancellation, or expiry.
	Deposited,
	/// Value has been released to a recipient.
	Claimed,
	/// The giver cancelled the record (or burned the key).
	Cancelled,
	/// The record expired and its value was refunded to the giver.
	Expired,
}

impl fmt::Display for DepositStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DepositStatus::NotDepositedYet => write!(f, "NotDepositedYet"),
			DepositStatus::Deposited => write!(f, "Deposited"),
			DepositStatus::Claimed => write!(f, "Claimed"),
			DepositStatus::Cancelled => write!(f, "Cancelled"),
			DepositStatus::Expired => write!(f, "Expired"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_native_asset_sentinel() {
		assert!(is_native_asset(&NATIVE_ASSET));
		assert!(!is_native_asset(&Address::repeat_byte(0x11)));
	}

	#[test]
	fn test_burned_record_is_zeroed() {
		let asset = Address::repeat_byte(0x22);
		let record = DepositRecord::burned(asset);
		assert_eq!(record.asset, asset);
		assert_eq!(record.amount, U256::ZERO);
		assert_eq!(record.expiration, 0);
		assert_eq!(record.status, DepositStatus::Cancelled);
	}

	#[test]
	fn test_status_default_and_display() {
		assert_eq!(DepositStatus::default(), DepositStatus::NotDepositedYet);
		assert_eq!(DepositStatus::Deposited.to_string(), "Deposited");
		assert_eq!(DepositStatus::Expired.to_string(), "Expired");
	}
}
