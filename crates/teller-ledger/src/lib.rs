//! Balance ledger module for the teller escrow system.
//!
//! This module provides the abstraction over the external account-balance
//! ledger that actually holds native currency and fungible-token balances.
//! The claim engine never touches balances directly; it pulls deposits into
//! the custody address and releases them again exclusively through the
//! interface defined here.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use teller_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Error that occurs when a holder does not have the funds to move.
	#[error("Insufficient balance of {asset} for {holder}: needed {needed}, available {available}")]
	InsufficientBalance {
		asset: Address,
		holder: Address,
		needed: U256,
		available: U256,
	},
	/// Error that occurs when a token pull exceeds the spender's allowance.
	#[error(
		"Insufficient allowance of {asset} from {owner} to {spender}: needed {needed}, available {available}"
	)]
	InsufficientAllowance {
		asset: Address,
		owner: Address,
		spender: Address,
		needed: U256,
		available: U256,
	},
	/// Error that occurs when the destination refuses the transfer.
	#[error("Transfer of {asset} to {to} was rejected")]
	TransferRejected { asset: Address, to: Address },
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for ledger backends.
///
/// Implementations hold balances per (asset, holder) pair. Token pulls are
/// allowance-gated; native transfers move attached value and are not.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Returns the balance of `holder` in `asset`.
	async fn balance_of(&self, asset: Address, holder: Address) -> Result<U256, LedgerError>;

	/// Moves `amount` of `asset` from `from` into `to`.
	///
	/// For token assets the pull is gated by the allowance `from` granted to
	/// `to`; for the native asset the movement models value attached to a
	/// call and only the balance is checked.
	async fn transfer_in(
		&self,
		asset: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError>;

	/// Releases `amount` of a token `asset` from custody to `to`.
	async fn transfer_out(&self, asset: Address, amount: U256, to: Address)
		-> Result<(), LedgerError>;

	/// Sends `amount` of native currency from custody to `to`.
	///
	/// Fails with [`LedgerError::TransferRejected`] when the destination
	/// refuses the value.
	async fn send_native(&self, to: Address, amount: U256) -> Result<(), LedgerError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for ledger factory functions.
///
/// Factories receive the implementation's own configuration section plus
/// the custody address that will hold escrowed funds.
pub type LedgerFactory = fn(&toml::Value, Address) -> Result<Box<dyn LedgerInterface>, LedgerError>;

/// Registry trait for ledger implementations.
pub trait LedgerRegistry: ImplementationRegistry<Factory = LedgerFactory> {}

/// Get all registered ledger implementations.
///
/// Returns a vector of (name, factory) tuples for all available ledger
/// implementations, used by the service to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, LedgerFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// High-level ledger service bound to the custody address.
///
/// The LedgerService wraps a low-level backend and fixes the custody side
/// of every movement, so the engine expresses operations as "collect from
/// giver" and "release to destination" without repeating the custody
/// identity at each call site.
pub struct LedgerService {
	/// The underlying ledger backend implementation.
	backend: Box<dyn LedgerInterface>,
	/// The deployment identity holding escrowed funds.
	custody: Address,
}

impl LedgerService {
	/// Creates a new LedgerService with the specified backend and custody.
	pub fn new(backend: Box<dyn LedgerInterface>, custody: Address) -> Self {
		Self { backend, custody }
	}

	/// The custody address escrowed funds are held under.
	pub fn custody(&self) -> Address {
		self.custody
	}

	/// Returns the balance of `holder` in `asset`.
	pub async fn balance_of(&self, asset: Address, holder: Address) -> Result<U256, LedgerError> {
		self.backend.balance_of(asset, holder).await
	}

	/// Pulls `amount` of `asset` from `from` into custody.
	pub async fn collect(
		&self,
		asset: Address,
		from: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		self.backend
			.transfer_in(asset, from, self.custody, amount)
			.await
	}

	/// Releases `amount` of a token `asset` from custody to `to`.
	pub async fn release(&self, asset: Address, amount: U256, to: Address) -> Result<(), LedgerError> {
		self.backend.transfer_out(asset, amount, to).await
	}

	/// Sends `amount` of native currency from custody to `to`.
	pub async fn send_native(&self, to: Address, amount: U256) -> Result<(), LedgerError> {
		self.backend.send_native(to, amount).await
	}
}
