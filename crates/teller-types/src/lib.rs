//! Common types module for the teller escrow system.
//!
//! This module defines the core data types and structures shared across the
//! escrow components. It provides a centralized location for shared types
//! to ensure consistency between the claim engine, the signer registry, the
//! balance ledger, and the service layer.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Broadcast bus carrying state-change notifications.
pub mod bus;
/// Deposit record types for the escrow state machine.
pub mod deposit;
/// Event types for state-change notifications.
pub mod events;
/// Implementation registry for pluggable backends.
pub mod registry;
/// Utility functions for hashing, formatting, and conversions.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use bus::EventBus;
pub use deposit::*;
pub use events::*;
pub use registry::*;
pub use utils::{
	parse_address, parse_transfer_id, truncate_id, with_0x_prefix, without_0x_prefix,
};
pub use validation::*;
