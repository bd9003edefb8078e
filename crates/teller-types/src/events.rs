//! Event types for state-change notifications.
//!
//! This module defines the events published on every escrow and registry
//! state transition. Events flow through a broadcast bus allowing the
//! service's logging subscriber and off-process indexers to follow the
//! escrow lifecycle without polling.

use crate::TransferId;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all teller events.
///
/// Events are categorized by the component that produces them, allowing
/// consumers to filter and handle specific event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TellerEvent {
	/// Events from the signer registry.
	Registry(RegistryEvent),
	/// Events from the claim engine.
	Escrow(EscrowEvent),
}

/// Events emitted by the signer registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistryEvent {
	/// A signer's activation flag changed.
	SignerUpdated { signer: Address, active: bool },
	/// A controller handover was proposed and awaits acceptance.
	ControllerTransferStarted { current: Address, pending: Address },
	/// A controller handover was accepted by the pending controller.
	ControllerTransferred {
		previous: Address,
		new_controller: Address,
	},
}

/// Events emitted by the claim engine on record transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EscrowEvent {
	/// Value has been locked under a new record.
	Deposited {
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		amount: U256,
		expiration: u64,
	},
	/// A record was claimed and its value released to the recipient.
	///
	/// `authorizer` is the recovered signer for registry-mediated claims,
	/// or the giver itself for direct-authorization claims.
	Claimed {
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		amount: U256,
		recipient: Address,
		authorizer: Address,
	},
	/// A record was cancelled by its giver (including key burns and the
	/// no-op acknowledgment on already-settled records).
	Cancelled {
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
	},
	/// An expired record was refunded to its giver.
	Refunded {
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
	},
}
