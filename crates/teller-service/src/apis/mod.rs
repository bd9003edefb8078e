//! Request processing for the teller API endpoints.
//!
//! The modules here hold the logic behind the REST surface: hex fields are
//! parsed up front, engine and registry rejections are mapped onto the
//! structured error envelope, and successful operations answer with fresh
//! state snapshots.

pub mod escrow;
pub mod signers;

use alloy_primitives::Address;
use teller_types::{parse_address, parse_transfer_id, without_0x_prefix, APIError, TransferId};

/// Parses a hex identity field, answering 400 on malformed input.
pub(crate) fn parse_identity(field: &str, input: &str) -> Result<Address, APIError> {
	parse_address(input).map_err(|e| APIError::BadRequest {
		error_type: "INVALID_ADDRESS".to_string(),
		message: format!("{}: {}", field, e),
		details: None,
	})
}

/// Parses a 32-byte transfer id field, answering 400 on malformed input.
pub(crate) fn parse_transfer(input: &str) -> Result<TransferId, APIError> {
	parse_transfer_id(input).map_err(|e| APIError::BadRequest {
		error_type: "INVALID_TRANSFER_ID".to_string(),
		message: e,
		details: None,
	})
}

/// Decodes a hex signature field, answering 400 on malformed input.
///
/// Length is not checked here; the engine reports wrong-size signatures as
/// failed recoveries.
pub(crate) fn parse_signature(field: &str, input: &str) -> Result<Vec<u8>, APIError> {
	hex::decode(without_0x_prefix(input.trim())).map_err(|e| APIError::BadRequest {
		error_type: "INVALID_SIGNATURE".to_string(),
		message: format!("{}: {}", field, e),
		details: None,
	})
}
