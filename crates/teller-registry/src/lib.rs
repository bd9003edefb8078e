//! Signer registry module for the teller escrow system.
//!
//! This module tracks which identities are authorized to co-sign claims.
//! It owns the activation flag map together with an insertion-ordered list
//! of currently-active signers, mutated only through the privileged batch
//! update so the two structures always agree. The controller role gating
//! mutations is transferable via a two-step handover.

use alloy_primitives::Address;
use std::collections::HashMap;
use teller_types::{EventBus, RegistryEvent, TellerEvent};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur during registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
	/// Error that occurs when the signer and state sequences differ in length.
	#[error("Length mismatch: {signers} signers against {states} states")]
	LengthMismatch { signers: usize, states: usize },
	/// Error that occurs when an identity is the zero sentinel.
	#[error("Null identity is not a valid signer or controller")]
	NullIdentity,
	/// Error that occurs when activating an already-active signer.
	#[error("Signer {0} is already active")]
	AlreadyActive(Address),
	/// Error that occurs when deactivating an already-inactive signer.
	#[error("Signer {0} is already inactive")]
	AlreadyInactive(Address),
	/// Error that occurs when a non-controller calls a gated operation.
	#[error("Caller {caller} is not the controller")]
	NotController { caller: Address },
	/// Error that occurs when a non-pending caller tries to accept a handover.
	#[error("Caller {caller} is not the pending controller")]
	NotPendingController { caller: Address },
}

/// Flag map plus enumeration, mutated together.
#[derive(Clone)]
struct RegistryState {
	controller: Address,
	pending_controller: Option<Address>,
	flags: HashMap<Address, bool>,
	active: Vec<Address>,
}

impl RegistryState {
	/// Applies one strict toggle: setting a signer to its current state is
	/// an error, not a no-op.
	fn apply(&mut self, signer: Address, active: bool) -> Result<(), RegistryError> {
		if signer == Address::ZERO {
			return Err(RegistryError::NullIdentity);
		}
		let current = self.flags.get(&signer).copied().unwrap_or(false);
		if current == active {
			return Err(if active {
				RegistryError::AlreadyActive(signer)
			} else {
				RegistryError::AlreadyInactive(signer)
			});
		}
		self.flags.insert(signer, active);
		if active {
			self.active.push(signer);
		} else {
			self.active.retain(|s| *s != signer);
		}
		Ok(())
	}
}

/// The signer registry component.
///
/// Claim verification consults [`SignerRegistry::is_active`]; the
/// administrative surface drives [`SignerRegistry::update_batch`] and the
/// controller handover. Every applied change publishes a
/// [`RegistryEvent`] on the bus.
pub struct SignerRegistry {
	state: Mutex<RegistryState>,
	event_bus: EventBus,
}

impl SignerRegistry {
	/// Creates a registry with the given controller and initial signer set.
	///
	/// The initial list passes through the same per-entry validation as
	/// [`SignerRegistry::update_batch`], so duplicates or the zero address
	/// are construction errors. All initial signers are activated and
	/// announced on the bus.
	pub fn new(
		controller: Address,
		initial_signers: &[Address],
		event_bus: EventBus,
	) -> Result<Self, RegistryError> {
		if controller == Address::ZERO {
			return Err(RegistryError::NullIdentity);
		}
		let mut state = RegistryState {
			controller,
			pending_controller: None,
			flags: HashMap::new(),
			active: Vec::new(),
		};
		for signer in initial_signers {
			state.apply(*signer, true)?;
		}
		for signer in initial_signers {
			event_bus
				.publish(TellerEvent::Registry(RegistryEvent::SignerUpdated {
					signer: *signer,
					active: true,
				}))
				.ok();
		}
		tracing::info!(
			component = "registry",
			controller = %controller,
			signers = initial_signers.len(),
			"Signer registry initialized"
		);
		Ok(Self {
			state: Mutex::new(state),
			event_bus,
		})
	}

	/// Returns whether the identity is currently an active signer.
	///
	/// Pure lookup with no side effects; unknown identities are inactive.
	pub async fn is_active(&self, signer: Address) -> bool {
		let state = self.state.lock().await;
		state.flags.get(&signer).copied().unwrap_or(false)
	}

	/// Returns the currently-active signers in insertion order.
	///
	/// The order is insertion order among currently-active members and is
	/// not stable across a remove-and-re-add.
	pub async fn list_active(&self) -> Vec<Address> {
		let state = self.state.lock().await;
		state.active.clone()
	}

	/// Returns the current controller identity.
	pub async fn controller(&self) -> Address {
		let state = self.state.lock().await;
		state.controller
	}

	/// Returns the pending controller, if a handover is in flight.
	pub async fn pending_controller(&self) -> Option<Address> {
		let state = self.state.lock().await;
		state.pending_controller
	}

	/// Batch-toggles signer activation flags, all-or-nothing.
	///
	/// Restricted to the controller. The batch is applied sequentially to a
	/// scratch copy of the registry state; only if every entry passes is
	/// the result committed and announced, so a failure anywhere leaves the
	/// registry exactly as before the call.
	///
	/// # Errors
	///
	/// [`RegistryError::NotController`] for non-controller callers,
	/// [`RegistryError::LengthMismatch`] when the sequences differ in
	/// length, [`RegistryError::NullIdentity`] for the zero address, and
	/// [`RegistryError::AlreadyActive`]/[`RegistryError::AlreadyInactive`]
	/// when an entry's desired state equals its current state.
	pub async fn update_batch(
		&self,
		caller: Address,
		signers: &[Address],
		states: &[bool],
	) -> Result<(), RegistryError> {
		let mut state = self.state.lock().await;
		if caller != state.controller {
			return Err(RegistryError::NotController { caller });
		}
		if signers.len() != states.len() {
			return Err(RegistryError::LengthMismatch {
				signers: signers.len(),
				states: states.len(),
			});
		}

		let mut scratch = state.clone();
		for (signer, active) in signers.iter().zip(states.iter()) {
			scratch.apply(*signer, *active)?;
		}
		*state = scratch;
		drop(state);

		for (signer, active) in signers.iter().zip(states.iter()) {
			self.event_bus
				.publish(TellerEvent::Registry(RegistryEvent::SignerUpdated {
					signer: *signer,
					active: *active,
				}))
				.ok();
		}
		tracing::info!(
			component = "registry",
			changes = signers.len(),
			"Signer batch applied"
		);
		Ok(())
	}

	/// Proposes a controller handover to `new_controller`.
	///
	/// Restricted to the current controller. The handover takes effect only
	/// once the transferee calls [`SignerRegistry::accept_controller`]; a
	/// later proposal replaces any pending one.
	pub async fn transfer_controller(
		&self,
		caller: Address,
		new_controller: Address,
	) -> Result<(), RegistryError> {
		let mut state = self.state.lock().await;
		if caller != state.controller {
			return Err(RegistryError::NotController { caller });
		}
		if new_controller == Address::ZERO {
			return Err(RegistryError::NullIdentity);
		}
		state.pending_controller = Some(new_controller);
		let current = state.controller;
		drop(state);

		self.event_bus
			.publish(TellerEvent::Registry(
				RegistryEvent::ControllerTransferStarted {
					current,
					pending: new_controller,
				},
			))
			.ok();
		tracing::info!(
			component = "registry",
			current = %current,
			pending = %new_controller,
			"Controller handover proposed"
		);
		Ok(())
	}

	/// Completes a pending controller handover.
	///
	/// The caller must be the pending controller recorded by
	/// [`SignerRegistry::transfer_controller`].
	pub async fn accept_controller(&self, caller: Address) -> Result<(), RegistryError> {
		let mut state = self.state.lock().await;
		if state.pending_controller != Some(caller) {
			return Err(RegistryError::NotPendingController { caller });
		}
		let previous = state.controller;
		state.controller = caller;
		state.pending_controller = None;
		drop(state);

		self.event_bus
			.publish(TellerEvent::Registry(RegistryEvent::ControllerTransferred {
				previous,
				new_controller: caller,
			}))
			.ok();
		tracing::info!(
			component = "registry",
			previous = %previous,
			controller = %caller,
			"Controller handover accepted"
		);
		Ok(())
	}
}
