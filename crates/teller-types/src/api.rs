//! API types for the teller HTTP API.
//!
//! This module defines the request and response types for the escrow and
//! signer-registry endpoints, plus the structured error envelope handlers
//! use to map engine rejections onto HTTP status codes.

use crate::DepositStatus;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to lock value under a new deposit record.
///
/// Identities and the transfer id are hex strings; `value` is the native
/// currency attached to the call and must be "0" for token deposits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
	/// The giver submitting the deposit.
	pub caller: String,
	/// Asset identifier (zero address for the native currency).
	pub asset: String,
	/// 32-byte transfer identifier.
	pub transfer_id: String,
	/// Quantity to lock.
	#[serde(with = "u256_serde")]
	pub amount: U256,
	/// Absolute unix timestamp after which the deposit becomes refundable.
	pub expiration: u64,
	/// Native value attached to the call.
	#[serde(with = "u256_serde", default)]
	pub value: U256,
}

/// Request to claim a deposit with an active signer's signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
	/// The submitting party (anyone may submit).
	pub caller: String,
	/// The giver whose record is claimed.
	pub giver: String,
	/// Asset identifier.
	pub asset: String,
	/// 32-byte transfer identifier.
	pub transfer_id: String,
	/// Destination for the released value.
	pub recipient: String,
	/// Hex-encoded 65-byte signer signature over the claim fingerprint.
	pub signer_signature: String,
}

/// Request composing a signature-authorized deposit with a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimWithDepositRequest {
	pub caller: String,
	pub giver: String,
	pub asset: String,
	pub transfer_id: String,
	pub recipient: String,
	#[serde(with = "u256_serde")]
	pub amount: U256,
	pub expiration: u64,
	/// Hex-encoded giver signature over the deposit authorization payload.
	pub giver_signature: String,
	/// Hex-encoded signer signature over the claim fingerprint.
	pub signer_signature: String,
}

/// Request to claim with the giver's own authorization, bypassing the
/// signer registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectClaimRequest {
	pub caller: String,
	pub giver: String,
	pub asset: String,
	pub transfer_id: String,
	pub recipient: String,
	/// Hex-encoded giver signature over the claim authorization payload.
	pub giver_signature: String,
}

/// Request to cancel the caller's own record (or burn an untouched key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
	pub caller: String,
	pub asset: String,
	pub transfer_id: String,
}

/// Request to refund an expired record back to its giver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
	pub caller: String,
	pub giver: String,
	pub asset: String,
	pub transfer_id: String,
}

/// Snapshot of one escrow record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowResponse {
	pub giver: String,
	pub asset: String,
	pub transfer_id: String,
	#[serde(with = "u256_serde")]
	pub amount: U256,
	pub expiration: u64,
	pub status: DepositStatus,
	/// True iff the record is Deposited and not yet past expiration.
	pub claimable: bool,
}

/// Request to batch-toggle signer activation flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSignersRequest {
	/// Must be the current controller.
	pub caller: String,
	pub signers: Vec<String>,
	pub states: Vec<bool>,
}

/// Current registry membership and controller state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignersResponse {
	pub controller: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pending_controller: Option<String>,
	/// Active signers in insertion order.
	pub signers: Vec<String>,
}

/// Request to propose a controller handover.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferControllerRequest {
	/// Must be the current controller.
	pub caller: String,
	pub new_controller: String,
}

/// Request to accept a pending controller handover.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptControllerRequest {
	/// Must be the pending controller.
	pub caller: String,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	pub details: Option<serde_json::Value>,
	/// Suggested retry delay in seconds
	#[serde(rename = "retryAfter")]
	pub retry_after: Option<u64>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Bad request with validation errors (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Unprocessable entity for business logic failures (422)
	UnprocessableEntity {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Service unavailable with optional retry information (503)
	ServiceUnavailable {
		error_type: String,
		message: String,
		retry_after: Option<u64>,
	},
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::UnprocessableEntity { .. } => 422,
			APIError::ServiceUnavailable { .. } => 503,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
				retry_after: None,
			},
			APIError::UnprocessableEntity {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
				retry_after: None,
			},
			APIError::ServiceUnavailable {
				error_type,
				message,
				retry_after,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: *retry_after,
			},
			APIError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: None,
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			},
			APIError::ServiceUnavailable { message, .. } => {
				write!(f, "Service Unavailable: {}", message)
			},
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			422 => StatusCode::UNPROCESSABLE_ENTITY,
			503 => StatusCode::SERVICE_UNAVAILABLE,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}

/// Serde module for U256 serialization as decimal strings.
pub mod u256_serde {
	use alloy_primitives::U256;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		U256::from_str_radix(&s, 10).map_err(D::Error::custom)
	}
}
