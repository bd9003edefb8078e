//! Signature authorization for claim and deposit operations.
//!
//! Two signature schemes coexist:
//! - Active signers authorize claims with an EIP-191 personal-sign over the
//!   claim fingerprint.
//! - Givers authorize deposits and direct claims with EIP-712 typed-data
//!   signatures bound to this teller's signing domain.
//!
//! Recovery never fails loudly: malformed or forged signatures recover to an
//! address that will not match, and callers surface the mismatch.

use alloy_primitives::{eip191_hash_message, keccak256, Address, PrimitiveSignature, B256, U256};
use teller_types::{
	utils::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder},
	TransferId,
};

/// EIP-712 type string for a giver's deposit authorization.
pub const DEPOSIT_AUTHORIZATION_TYPE: &str =
	"DepositAuthorization(address asset,bytes32 transferId,uint256 amount,uint64 expiration)";

/// EIP-712 type string for a giver's direct claim authorization.
pub const CLAIM_AUTHORIZATION_TYPE: &str =
	"ClaimAuthorization(address asset,bytes32 transferId,address recipient)";

/// EIP-712 signing domain for all giver authorizations.
///
/// The domain separator is computed once at construction and bound to this
/// teller's name, version, chain id, and custody address, so authorizations
/// signed for one deployment never verify against another.
#[derive(Debug, Clone)]
pub struct SigningDomain {
	separator: B256,
}

impl SigningDomain {
	pub fn new(name: &str, version: &str, chain_id: u64, custody: Address) -> Self {
		Self {
			separator: compute_domain_hash(name, version, chain_id, &custody),
		}
	}

	/// Digest a giver signs to authorize pulling a deposit from their balance.
	pub fn deposit_authorization_digest(
		&self,
		asset: Address,
		transfer_id: TransferId,
		amount: U256,
		expiration: u64,
	) -> B256 {
		let type_hash = keccak256(DEPOSIT_AUTHORIZATION_TYPE.as_bytes());
		let mut enc = Eip712AbiEncoder::new();
		enc.push_b256(&type_hash);
		enc.push_address(&asset);
		enc.push_b256(&transfer_id);
		enc.push_u256(amount);
		enc.push_u64(expiration);
		let struct_hash = keccak256(enc.finish());
		compute_final_digest(&self.separator, &struct_hash)
	}

	/// Digest a giver signs to authorize a claim directly, without any
	/// registered signer involved.
	pub fn claim_authorization_digest(
		&self,
		asset: Address,
		transfer_id: TransferId,
		recipient: Address,
	) -> B256 {
		let type_hash = keccak256(CLAIM_AUTHORIZATION_TYPE.as_bytes());
		let mut enc = Eip712AbiEncoder::new();
		enc.push_b256(&type_hash);
		enc.push_address(&asset);
		enc.push_b256(&transfer_id);
		enc.push_address(&recipient);
		let struct_hash = keccak256(enc.finish());
		compute_final_digest(&self.separator, &struct_hash)
	}
}

/// Fingerprint of a claim, binding the full deposit key and the recipient.
///
/// Fields are encoded as padded 32-byte words before hashing so no two
/// distinct claims can collide through ambiguous concatenation.
pub fn claim_fingerprint(
	giver: Address,
	asset: Address,
	transfer_id: TransferId,
	recipient: Address,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_address(&giver);
	enc.push_address(&asset);
	enc.push_b256(&transfer_id);
	enc.push_address(&recipient);
	keccak256(enc.finish())
}

/// Digest an active signer signs to authorize a claim (EIP-191 over the
/// claim fingerprint).
pub fn signer_claim_digest(
	giver: Address,
	asset: Address,
	transfer_id: TransferId,
	recipient: Address,
) -> B256 {
	eip191_hash_message(claim_fingerprint(giver, asset, transfer_id, recipient))
}

/// Recovers the signing address from a 65-byte signature over a prehashed
/// digest. Returns the zero address when the signature cannot be parsed or
/// does not recover, so callers treat zero as "no valid signer".
pub fn recover_signer(digest: &B256, signature: &[u8]) -> Address {
	match PrimitiveSignature::try_from(signature) {
		Ok(sig) => sig
			.recover_address_from_prehash(digest)
			.unwrap_or(Address::ZERO),
		Err(_) => Address::ZERO,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;

	fn transfer_id(byte: u8) -> TransferId {
		B256::repeat_byte(byte)
	}

	#[test]
	fn test_signer_claim_digest_round_trips() {
		let signer = PrivateKeySigner::random();
		let digest = signer_claim_digest(
			Address::repeat_byte(0x01),
			Address::ZERO,
			transfer_id(0x42),
			Address::repeat_byte(0x02),
		);
		let sig = signer.sign_hash_sync(&digest).unwrap();

		assert_eq!(recover_signer(&digest, &sig.as_bytes()), signer.address());
	}

	#[test]
	fn test_recovery_failures_yield_zero_address() {
		let digest = B256::repeat_byte(0x11);
		// Wrong length cannot parse
		assert_eq!(recover_signer(&digest, &[0u8; 10]), Address::ZERO);
		// All-zero r and s parses but does not recover
		assert_eq!(recover_signer(&digest, &[0u8; 65]), Address::ZERO);
	}

	#[test]
	fn test_fingerprint_binds_every_field() {
		let giver = Address::repeat_byte(0x01);
		let asset = Address::repeat_byte(0x02);
		let recipient = Address::repeat_byte(0x03);
		let id = transfer_id(0x04);
		let base = claim_fingerprint(giver, asset, id, recipient);

		assert_ne!(
			base,
			claim_fingerprint(Address::repeat_byte(0xaa), asset, id, recipient)
		);
		assert_ne!(
			base,
			claim_fingerprint(giver, Address::repeat_byte(0xaa), id, recipient)
		);
		assert_ne!(
			base,
			claim_fingerprint(giver, asset, transfer_id(0xaa), recipient)
		);
		assert_ne!(
			base,
			claim_fingerprint(giver, asset, id, Address::repeat_byte(0xaa))
		);
	}

	#[test]
	fn test_deposit_authorization_binds_amount_and_expiration() {
		let domain = SigningDomain::new("Teller", "1", 1, Address::repeat_byte(0x99));
		let asset = Address::repeat_byte(0x02);
		let id = transfer_id(0x04);
		let base = domain.deposit_authorization_digest(asset, id, U256::from(100), 500);

		assert_ne!(
			base,
			domain.deposit_authorization_digest(asset, id, U256::from(101), 500)
		);
		assert_ne!(
			base,
			domain.deposit_authorization_digest(asset, id, U256::from(100), 501)
		);
	}

	#[test]
	fn test_authorization_kinds_never_collide() {
		let domain = SigningDomain::new("Teller", "1", 1, Address::repeat_byte(0x99));
		let asset = Address::repeat_byte(0x02);
		let id = transfer_id(0x04);
		let recipient = Address::repeat_byte(0x03);

		let deposit = domain.deposit_authorization_digest(asset, id, U256::ZERO, 0);
		let claim = domain.claim_authorization_digest(asset, id, recipient);
		assert_ne!(deposit, claim);
	}

	#[test]
	fn test_domains_are_isolated_by_custody_and_chain() {
		let asset = Address::repeat_byte(0x02);
		let id = transfer_id(0x04);
		let recipient = Address::repeat_byte(0x03);

		let a = SigningDomain::new("Teller", "1", 1, Address::repeat_byte(0x99));
		let b = SigningDomain::new("Teller", "1", 1, Address::repeat_byte(0x98));
		let c = SigningDomain::new("Teller", "1", 7, Address::repeat_byte(0x99));

		let base = a.claim_authorization_digest(asset, id, recipient);
		assert_ne!(base, b.claim_authorization_digest(asset, id, recipient));
		assert_ne!(base, c.claim_authorization_digest(asset, id, recipient));
	}

	#[test]
	fn test_giver_signature_verifies_against_giver_only() {
		let giver = PrivateKeySigner::random();
		let stranger = PrivateKeySigner::random();
		let domain = SigningDomain::new("Teller", "1", 1, Address::repeat_byte(0x99));
		let digest =
			domain.claim_authorization_digest(Address::ZERO, transfer_id(0x05), giver.address());

		let sig = giver.sign_hash_sync(&digest).unwrap();
		let recovered = recover_signer(&digest, &sig.as_bytes());
		assert_eq!(recovered, giver.address());
		assert_ne!(recovered, stranger.address());
	}
}
