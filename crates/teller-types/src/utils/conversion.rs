//! Conversion utilities for common data transformations.
//!
//! This module provides utility functions for parsing hex-encoded
//! identities and transfer identifiers from configuration and API input.

use super::formatting::without_0x_prefix;
use alloy_primitives::{hex, Address, B256};

/// Parses a 20-byte identity from a hex string, with or without "0x" prefix.
///
/// # Arguments
///
/// * `input` - A hex string such as "0x5fbdb2315678afecb367f032d93f642f64180aa3"
///
/// # Returns
///
/// The parsed address, or a message describing why the input is not one.
pub fn parse_address(input: &str) -> Result<Address, String> {
	let stripped = without_0x_prefix(input.trim());
	let bytes = hex::decode(stripped).map_err(|e| format!("invalid hex address: {}", e))?;
	if bytes.len() != 20 {
		return Err(format!("address must be 20 bytes, got {}", bytes.len()));
	}
	Ok(Address::from_slice(&bytes))
}

/// Parses a 32-byte transfer identifier from a hex string.
///
/// Shorter inputs are rejected rather than padded so callers cannot
/// accidentally collide keys through truncated identifiers.
pub fn parse_transfer_id(input: &str) -> Result<B256, String> {
	let stripped = without_0x_prefix(input.trim());
	let bytes = hex::decode(stripped).map_err(|e| format!("invalid hex transfer id: {}", e))?;
	if bytes.len() != 32 {
		return Err(format!("transfer id must be 32 bytes, got {}", bytes.len()));
	}
	Ok(B256::from_slice(&bytes))
}
