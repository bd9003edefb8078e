//! Signer-registry endpoints for the teller API.
//!
//! Membership answers come straight from the registry. Mutating calls rely
//! on the registry's own controller checks and surface rejections as 422s.

use teller_core::Teller;
use teller_registry::RegistryError;
use teller_types::{
	APIError, AcceptControllerRequest, SignersResponse, TransferControllerRequest,
	UpdateSignersRequest,
};

use super::parse_identity;

/// Builds the current registry roster.
pub async fn get_signer_roster(teller: &Teller) -> SignersResponse {
	let registry = teller.registry();
	let controller = registry.controller().await;
	let pending_controller = registry.pending_controller().await;
	let signers = registry.list_active().await;

	SignersResponse {
		controller: controller.to_string(),
		pending_controller: pending_controller.map(|pending| pending.to_string()),
		signers: signers.iter().map(|signer| signer.to_string()).collect(),
	}
}

/// Processes a batch update of signer activation flags.
pub async fn process_update_signers(
	request: UpdateSignersRequest,
	teller: &Teller,
) -> Result<SignersResponse, APIError> {
	let caller = parse_identity("caller", &request.caller)?;
	let mut signers = Vec::with_capacity(request.signers.len());
	for entry in &request.signers {
		signers.push(parse_identity("signers", entry)?);
	}

	teller
		.registry()
		.update_batch(caller, &signers, &request.states)
		.await
		.map_err(map_registry_error)?;

	Ok(get_signer_roster(teller).await)
}

/// Processes a controller handover proposal.
pub async fn process_transfer_controller(
	request: TransferControllerRequest,
	teller: &Teller,
) -> Result<SignersResponse, APIError> {
	let caller = parse_identity("caller", &request.caller)?;
	let new_controller = parse_identity("newController", &request.new_controller)?;

	teller
		.registry()
		.transfer_controller(caller, new_controller)
		.await
		.map_err(map_registry_error)?;

	Ok(get_signer_roster(teller).await)
}

/// Processes the acceptance of a pending controller handover.
pub async fn process_accept_controller(
	request: AcceptControllerRequest,
	teller: &Teller,
) -> Result<SignersResponse, APIError> {
	let caller = parse_identity("caller", &request.caller)?;

	teller
		.registry()
		.accept_controller(caller)
		.await
		.map_err(map_registry_error)?;

	Ok(get_signer_roster(teller).await)
}

/// Maps registry rejections onto the error envelope.
fn map_registry_error(error: RegistryError) -> APIError {
	let error_type = match &error {
		RegistryError::LengthMismatch { .. } => "LENGTH_MISMATCH",
		RegistryError::NullIdentity => "NULL_IDENTITY",
		RegistryError::AlreadyActive(_) => "ALREADY_ACTIVE",
		RegistryError::AlreadyInactive(_) => "ALREADY_INACTIVE",
		RegistryError::NotController { .. } => "NOT_CONTROLLER",
		RegistryError::NotPendingController { .. } => "NOT_PENDING_CONTROLLER",
	};

	APIError::UnprocessableEntity {
		error_type: error_type.to_string(),
		message: error.to_string(),
		details: None,
	}
}
