//! In-memory balance ledger implementation for the teller service.
//!
//! This module provides a memory-based implementation of the LedgerInterface
//! trait, useful for testing and development scenarios where no real chain
//! or token contracts are involved. Balances and allowances can be seeded
//! from configuration, and a list of blocked recipients simulates
//! destinations that reject transfers.

use crate::{LedgerError, LedgerInterface};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use teller_types::{
	is_native_asset, parse_address, ConfigSchema, Field, FieldType, Schema, ValidationError,
	NATIVE_ASSET,
};
use tokio::sync::RwLock;

/// Mutable ledger state behind the lock.
#[derive(Default)]
struct LedgerState {
	/// Balance per (asset, holder) pair.
	balances: HashMap<(Address, Address), U256>,
	/// Remaining allowance per (asset, owner, spender) triple.
	allowances: HashMap<(Address, Address, Address), U256>,
	/// Recipients that reject any transfer directed at them.
	blocked: HashSet<Address>,
}

impl LedgerState {
	fn balance(&self, asset: Address, holder: Address) -> U256 {
		self.balances
			.get(&(asset, holder))
			.copied()
			.unwrap_or(U256::ZERO)
	}

	fn credit(&mut self, asset: Address, holder: Address, amount: U256) {
		let entry = self.balances.entry((asset, holder)).or_insert(U256::ZERO);
		*entry = entry.saturating_add(amount);
	}

	fn debit(&mut self, asset: Address, holder: Address, amount: U256) -> Result<(), LedgerError> {
		let available = self.balance(asset, holder);
		if available < amount {
			return Err(LedgerError::InsufficientBalance {
				asset,
				holder,
				needed: amount,
				available,
			});
		}
		self.balances.insert((asset, holder), available - amount);
		Ok(())
	}

	fn spend_allowance(
		&mut self,
		asset: Address,
		owner: Address,
		spender: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		let key = (asset, owner, spender);
		let available = self.allowances.get(&key).copied().unwrap_or(U256::ZERO);
		if available < amount {
			return Err(LedgerError::InsufficientAllowance {
				asset,
				owner,
				spender,
				needed: amount,
				available,
			});
		}
		// U256::MAX is treated as an unlimited allowance and not decremented.
		if available != U256::MAX {
			self.allowances.insert(key, available - amount);
		}
		Ok(())
	}
}

/// In-memory ledger implementation.
///
/// Holds all balances in a HashMap behind a read-write lock. Custody-side
/// movements (transfer_out, send_native) debit the custody address the
/// ledger was constructed with.
pub struct MemoryLedger {
	/// The deployment identity holding escrowed funds.
	custody: Address,
	/// Balances, allowances, and blocked recipients.
	state: RwLock<LedgerState>,
}

impl MemoryLedger {
	/// Creates an empty MemoryLedger for the given custody address.
	pub fn new(custody: Address) -> Self {
		Self::with_state(custody, LedgerState::default())
	}

	fn with_state(custody: Address, state: LedgerState) -> Self {
		Self {
			custody,
			state: RwLock::new(state),
		}
	}

	/// Adds `amount` of `asset` to `holder`'s balance.
	pub async fn credit(&self, asset: Address, holder: Address, amount: U256) {
		let mut state = self.state.write().await;
		state.credit(asset, holder, amount);
	}

	/// Grants `spender` an allowance over `owner`'s `asset` balance.
	///
	/// A value of `U256::MAX` grants an unlimited allowance.
	pub async fn approve(&self, asset: Address, owner: Address, spender: Address, amount: U256) {
		let mut state = self.state.write().await;
		state.allowances.insert((asset, owner, spender), amount);
	}

	/// Marks a recipient as rejecting every transfer directed at it.
	pub async fn block_recipient(&self, recipient: Address) {
		let mut state = self.state.write().await;
		state.blocked.insert(recipient);
	}
}

#[async_trait]
impl LedgerInterface for MemoryLedger {
	async fn balance_of(&self, asset: Address, holder: Address) -> Result<U256, LedgerError> {
		let state = self.state.read().await;
		Ok(state.balance(asset, holder))
	}

	async fn transfer_in(
		&self,
		asset: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		let mut state = self.state.write().await;
		// Native movements model value attached to a call; no allowance.
		if !is_native_asset(&asset) {
			state.spend_allowance(asset, from, to, amount)?;
		}
		state.debit(asset, from, amount)?;
		state.credit(asset, to, amount);
		Ok(())
	}

	async fn transfer_out(
		&self,
		asset: Address,
		amount: U256,
		to: Address,
	) -> Result<(), LedgerError> {
		let mut state = self.state.write().await;
		if state.blocked.contains(&to) {
			return Err(LedgerError::TransferRejected { asset, to });
		}
		state.debit(asset, self.custody, amount)?;
		state.credit(asset, to, amount);
		Ok(())
	}

	async fn send_native(&self, to: Address, amount: U256) -> Result<(), LedgerError> {
		let mut state = self.state.write().await;
		if state.blocked.contains(&to) {
			return Err(LedgerError::TransferRejected {
				asset: NATIVE_ASSET,
				to,
			});
		}
		state.debit(NATIVE_ASSET, self.custody, amount)?;
		state.credit(NATIVE_ASSET, to, amount);
		Ok(())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryLedgerSchema)
	}
}

/// Configuration schema for MemoryLedger.
///
/// All fields are optional:
/// - `balances`: array of `{ asset, holder, amount }` seed entries
/// - `allowances`: array of `{ asset, owner, amount, spender? }` entries,
///   with `spender` defaulting to the custody address
/// - `blocked`: array of recipient addresses that reject transfers
pub struct MemoryLedgerSchema;

fn address_string(name: &str) -> Field {
	Field::new(name, FieldType::String).with_validator(|value| {
		let s = value.as_str().ok_or_else(|| "expected a string".to_string())?;
		parse_address(s).map(|_| ())
	})
}

fn amount_string(name: &str) -> Field {
	Field::new(name, FieldType::String).with_validator(|value| {
		let s = value.as_str().ok_or_else(|| "expected a string".to_string())?;
		U256::from_str_radix(s, 10)
			.map(|_| ())
			.map_err(|e| format!("invalid decimal amount: {}", e))
	})
}

impl ConfigSchema for MemoryLedgerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new(
					"balances",
					FieldType::Array(Box::new(FieldType::Table(Schema::new(
						vec![
							address_string("asset"),
							address_string("holder"),
							amount_string("amount"),
						],
						vec![],
					)))),
				),
				Field::new(
					"allowances",
					FieldType::Array(Box::new(FieldType::Table(Schema::new(
						vec![
							address_string("asset"),
							address_string("owner"),
							amount_string("amount"),
						],
						vec![address_string("spender")],
					)))),
				),
				Field::new(
					"blocked",
					FieldType::Array(Box::new(FieldType::String)),
				),
			],
		);
		schema.validate(config)
	}
}

fn entry_address(entry: &toml::Value, name: &str) -> Result<Address, LedgerError> {
	let raw = entry
		.get(name)
		.and_then(|v| v.as_str())
		.ok_or_else(|| LedgerError::Configuration(format!("missing field '{}'", name)))?;
	parse_address(raw).map_err(LedgerError::Configuration)
}

fn entry_amount(entry: &toml::Value) -> Result<U256, LedgerError> {
	let raw = entry
		.get("amount")
		.and_then(|v| v.as_str())
		.ok_or_else(|| LedgerError::Configuration("missing field 'amount'".to_string()))?;
	U256::from_str_radix(raw, 10)
		.map_err(|e| LedgerError::Configuration(format!("invalid amount: {}", e)))
}

/// Factory function to create a memory ledger from configuration.
///
/// Validates the section against [`MemoryLedgerSchema`], then seeds the
/// ledger with any configured balances, allowances, and blocked recipients.
pub fn create_ledger(
	config: &toml::Value,
	custody: Address,
) -> Result<Box<dyn LedgerInterface>, LedgerError> {
	MemoryLedgerSchema
		.validate(config)
		.map_err(|e| LedgerError::Configuration(e.to_string()))?;

	let mut state = LedgerState::default();

	if let Some(entries) = config.get("balances").and_then(|v| v.as_array()) {
		for entry in entries {
			let asset = entry_address(entry, "asset")?;
			let holder = entry_address(entry, "holder")?;
			state.credit(asset, holder, entry_amount(entry)?);
		}
	}

	if let Some(entries) = config.get("allowances").and_then(|v| v.as_array()) {
		for entry in entries {
			let asset = entry_address(entry, "asset")?;
			let owner = entry_address(entry, "owner")?;
			let spender = match entry.get("spender") {
				Some(_) => entry_address(entry, "spender")?,
				None => custody,
			};
			state
				.allowances
				.insert((asset, owner, spender), entry_amount(entry)?);
		}
	}

	if let Some(entries) = config.get("blocked").and_then(|v| v.as_array()) {
		for entry in entries {
			let raw = entry
				.as_str()
				.ok_or_else(|| LedgerError::Configuration("blocked entries must be strings".to_string()))?;
			state
				.blocked
				.insert(parse_address(raw).map_err(LedgerError::Configuration)?);
		}
	}

	Ok(Box::new(MemoryLedger::with_state(custody, state)))
}

/// Registry for the memory ledger implementation.
pub struct Registry;

impl teller_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::LedgerFactory;

	fn factory() -> Self::Factory {
		create_ledger
	}
}

impl crate::LedgerRegistry for Registry {}
