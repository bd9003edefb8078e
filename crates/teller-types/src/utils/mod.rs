//! Utility functions for common type conversions and transformations.
//!
//! This module provides helper functions for hex parsing, string formatting,
//! and typed-payload hashing used throughout the teller system.

pub mod conversion;
pub mod eip712;
pub mod formatting;

pub use conversion::{parse_address, parse_transfer_id};
pub use eip712::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder, DOMAIN_TYPE};
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
