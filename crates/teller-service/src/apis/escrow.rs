//! Escrow endpoints for the teller API.
//!
//! Each mutating operation parses the hex identities out of the request,
//! runs the matching engine operation, and answers with a snapshot of the
//! resulting record. Malformed fields are 400s, engine rejections are 422s,
//! and a busy engine is a 503 with a retry hint.

use alloy_primitives::{Address, U256};
use teller_core::{EscrowError, Teller};
use teller_types::{
	APIError, CancelRequest, ClaimRequest, ClaimWithDepositRequest, DepositRequest, DepositStatus,
	DirectClaimRequest, EscrowResponse, RefundRequest, TransferId,
};

use super::{parse_identity, parse_signature, parse_transfer};

/// Processes a deposit request.
pub async fn process_deposit(
	request: DepositRequest,
	teller: &Teller,
) -> Result<EscrowResponse, APIError> {
	let caller = parse_identity("caller", &request.caller)?;
	let asset = parse_identity("asset", &request.asset)?;
	let transfer_id = parse_transfer(&request.transfer_id)?;

	teller
		.engine()
		.deposit(
			caller,
			asset,
			transfer_id,
			request.amount,
			request.expiration,
			request.value,
		)
		.await
		.map_err(map_escrow_error)?;

	Ok(escrow_snapshot(teller, caller, asset, transfer_id).await)
}

/// Processes a claim carrying an active signer's authorization.
///
/// Any caller may submit a claim; the field is validated only.
pub async fn process_claim(
	request: ClaimRequest,
	teller: &Teller,
) -> Result<EscrowResponse, APIError> {
	parse_identity("caller", &request.caller)?;
	let giver = parse_identity("giver", &request.giver)?;
	let asset = parse_identity("asset", &request.asset)?;
	let transfer_id = parse_transfer(&request.transfer_id)?;
	let recipient = parse_identity("recipient", &request.recipient)?;
	let signature = parse_signature("signerSignature", &request.signer_signature)?;

	teller
		.engine()
		.claim(giver, asset, transfer_id, recipient, &signature)
		.await
		.map_err(map_escrow_error)?;

	Ok(escrow_snapshot(teller, giver, asset, transfer_id).await)
}

/// Processes a claim composed with a signature-authorized deposit pull.
pub async fn process_claim_with_deposit(
	request: ClaimWithDepositRequest,
	teller: &Teller,
) -> Result<EscrowResponse, APIError> {
	parse_identity("caller", &request.caller)?;
	let giver = parse_identity("giver", &request.giver)?;
	let asset = parse_identity("asset", &request.asset)?;
	let transfer_id = parse_transfer(&request.transfer_id)?;
	let recipient = parse_identity("recipient", &request.recipient)?;
	let giver_signature = parse_signature("giverSignature", &request.giver_signature)?;
	let signer_signature = parse_signature("signerSignature", &request.signer_signature)?;

	teller
		.engine()
		.claim_with_deposit_sig(
			giver,
			asset,
			transfer_id,
			recipient,
			request.amount,
			request.expiration,
			&giver_signature,
			&signer_signature,
		)
		.await
		.map_err(map_escrow_error)?;

	Ok(escrow_snapshot(teller, giver, asset, transfer_id).await)
}

/// Processes a claim authorized directly by the giver's own signature.
pub async fn process_direct_claim(
	request: DirectClaimRequest,
	teller: &Teller,
) -> Result<EscrowResponse, APIError> {
	parse_identity("caller", &request.caller)?;
	let giver = parse_identity("giver", &request.giver)?;
	let asset = parse_identity("asset", &request.asset)?;
	let transfer_id = parse_transfer(&request.transfer_id)?;
	let recipient = parse_identity("recipient", &request.recipient)?;
	let signature = parse_signature("giverSignature", &request.giver_signature)?;

	teller
		.engine()
		.claim_with_direct_auth(giver, asset, transfer_id, recipient, &signature)
		.await
		.map_err(map_escrow_error)?;

	Ok(escrow_snapshot(teller, giver, asset, transfer_id).await)
}

/// Processes a cancellation of the caller's own record.
pub async fn process_cancellation(
	request: CancelRequest,
	teller: &Teller,
) -> Result<EscrowResponse, APIError> {
	let caller = parse_identity("caller", &request.caller)?;
	let asset = parse_identity("asset", &request.asset)?;
	let transfer_id = parse_transfer(&request.transfer_id)?;

	teller
		.engine()
		.cancel(caller, asset, transfer_id)
		.await
		.map_err(map_escrow_error)?;

	Ok(escrow_snapshot(teller, caller, asset, transfer_id).await)
}

/// Processes a refund of an expired record back to its giver.
pub async fn process_refund(
	request: RefundRequest,
	teller: &Teller,
) -> Result<EscrowResponse, APIError> {
	parse_identity("caller", &request.caller)?;
	let giver = parse_identity("giver", &request.giver)?;
	let asset = parse_identity("asset", &request.asset)?;
	let transfer_id = parse_transfer(&request.transfer_id)?;

	teller
		.engine()
		.refund(giver, asset, transfer_id)
		.await
		.map_err(map_escrow_error)?;

	Ok(escrow_snapshot(teller, giver, asset, transfer_id).await)
}

/// Retrieves the record snapshot under `(giver, asset, transfer_id)`.
///
/// Keys that were never touched answer with a default record in the
/// not-deposited state rather than a 404.
pub async fn get_escrow_record(
	giver: &str,
	asset: &str,
	transfer_id: &str,
	teller: &Teller,
) -> Result<EscrowResponse, APIError> {
	let giver = parse_identity("giver", giver)?;
	let asset = parse_identity("asset", asset)?;
	let transfer_id = parse_transfer(transfer_id)?;

	Ok(escrow_snapshot(teller, giver, asset, transfer_id).await)
}

/// Builds the record snapshot every escrow endpoint answers with.
async fn escrow_snapshot(
	teller: &Teller,
	giver: Address,
	asset: Address,
	transfer_id: TransferId,
) -> EscrowResponse {
	let engine = teller.engine();
	let record = engine.record(giver, asset, transfer_id).await;
	let claimable = engine.is_claimable(giver, asset, transfer_id).await;

	let (amount, expiration, status) = match record {
		Some(record) => (record.amount, record.expiration, record.status),
		None => (U256::ZERO, 0, DepositStatus::NotDepositedYet),
	};

	EscrowResponse {
		giver: giver.to_string(),
		asset: asset.to_string(),
		transfer_id: transfer_id.to_string(),
		amount,
		expiration,
		status,
		claimable,
	}
}

/// Maps engine rejections onto the error envelope.
///
/// A busy engine answers 503 with a retry hint; everything else is a 422
/// carrying a stable error code.
fn map_escrow_error(error: EscrowError) -> APIError {
	let error_type = match &error {
		EscrowError::ReentrancyBlocked => {
			return APIError::ServiceUnavailable {
				error_type: "OPERATION_IN_PROGRESS".to_string(),
				message: error.to_string(),
				retry_after: Some(1),
			};
		},
		EscrowError::AlreadyDeposited { .. } => "ALREADY_DEPOSITED",
		EscrowError::AmountMismatch { .. } => "AMOUNT_MISMATCH",
		EscrowError::AssetMismatch { .. } => "ASSET_MISMATCH",
		EscrowError::NotClaimable { .. } => "NOT_CLAIMABLE",
		EscrowError::NotExpired { .. } => "NOT_EXPIRED",
		EscrowError::Erc20Only => "ERC20_ONLY",
		EscrowError::InvalidSignerSignature { .. } => "INVALID_SIGNER_SIGNATURE",
		EscrowError::InvalidGiverSignature { .. } => "INVALID_GIVER_SIGNATURE",
		EscrowError::SendFailure { .. } => "SEND_FAILURE",
		EscrowError::Ledger(_) => "LEDGER_REJECTED",
	};

	APIError::UnprocessableEntity {
		error_type: error_type.to_string(),
		message: error.to_string(),
		details: None,
	}
}
