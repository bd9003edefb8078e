//! Escrow engine holding deposit records and moving value through the
//! balance ledger.
//!
//! Records transition before any funds move. An outbound transfer that
//! fails rolls the record back, so a rejected operation leaves no trace.
//! A single in-flight flag serializes mutating operations: a ledger
//! backend that calls back into the engine mid-transfer is rejected
//! instead of observing half-finished state.

use std::collections::HashMap;
use std::sync::{
	atomic::{AtomicBool, Ordering},
	Arc,
};

use alloy_primitives::{Address, U256};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

use teller_ledger::{LedgerError, LedgerService};
use teller_registry::SignerRegistry;
use teller_types::{
	is_native_asset, truncate_id, DepositKey, DepositRecord, DepositStatus, EscrowEvent, EventBus,
	TellerEvent, TransferId,
};

use crate::{
	auth::{self, SigningDomain},
	clock::Clock,
	state::is_valid_transition,
};

/// Errors that can occur during escrow operations.
#[derive(Debug, Error)]
pub enum EscrowError {
	/// Error that occurs when a deposit key has already been used.
	#[error("Deposit already exists for {key}")]
	AlreadyDeposited { key: DepositKey },
	/// Error that occurs when the attached native value does not match
	/// the declared amount.
	#[error("Attached value {attached} does not match declared amount {amount}")]
	AmountMismatch { attached: U256, amount: U256 },
	/// Error that occurs when native value is attached to a token deposit.
	#[error("Native value {attached} attached to deposit of token {asset}")]
	AssetMismatch { asset: Address, attached: U256 },
	/// Error that occurs when a record is not in a claimable state.
	#[error("Record {key} is not claimable")]
	NotClaimable { key: DepositKey },
	/// Error that occurs when refunding a record that has not expired.
	#[error("Record {key} has not expired")]
	NotExpired { key: DepositKey },
	/// Error that occurs when a signature-composed deposit names the
	/// native asset.
	#[error("Signature-composed deposits support tokens only")]
	Erc20Only,
	/// Error that occurs when a claim signature does not recover to an
	/// active signer.
	#[error("Claim signature recovered to non-active signer {recovered}")]
	InvalidSignerSignature { recovered: Address },
	/// Error that occurs when a giver authorization does not recover to
	/// the giver.
	#[error("Authorization recovered to {recovered}, expected giver {giver}")]
	InvalidGiverSignature { recovered: Address, giver: Address },
	/// Error that occurs when an operation arrives while another is in
	/// flight.
	#[error("Another operation is in flight")]
	ReentrancyBlocked,
	/// Error that occurs when an outbound native send is rejected.
	#[error("Failed to send {amount} native to {to}")]
	SendFailure { amount: U256, to: Address },
	/// Error from the underlying balance ledger.
	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
}

/// Clears the in-flight flag when the operation holding it completes,
/// including on early error returns.
struct OperationGuard<'a> {
	flag: &'a AtomicBool,
}

impl<'a> OperationGuard<'a> {
	fn acquire(flag: &'a AtomicBool) -> Result<Self, EscrowError> {
		if flag.swap(true, Ordering::Acquire) {
			return Err(EscrowError::ReentrancyBlocked);
		}
		Ok(Self { flag })
	}
}

impl Drop for OperationGuard<'_> {
	fn drop(&mut self) {
		self.flag.store(false, Ordering::Release);
	}
}

/// A record is claimable while Deposited and at or before its expiration
/// second.
fn record_claimable(record: &DepositRecord, now: u64) -> bool {
	is_valid_transition(record.status, DepositStatus::Claimed) && record.expiration >= now
}

/// Engine managing escrow records keyed by (giver, asset, transfer id).
///
/// Each mutating operation reads the clock once, applies the record
/// transition under the records lock, and only then touches the ledger.
pub struct EscrowEngine {
	/// Balance ledger holding and moving escrowed value.
	ledger: Arc<LedgerService>,
	/// Registry consulted for active claim signers.
	registry: Arc<SignerRegistry>,
	/// EIP-712 domain for giver authorizations.
	domain: SigningDomain,
	/// Time source, read exactly once per operation.
	clock: Arc<dyn Clock>,
	/// Every deposit key ever touched, with its current record.
	records: Mutex<HashMap<DepositKey, DepositRecord>>,
	/// Exclusive-operation flag backing [`OperationGuard`].
	in_flight: AtomicBool,
	/// Bus receiving an event for every applied transition.
	event_bus: EventBus,
}

impl EscrowEngine {
	pub fn new(
		ledger: Arc<LedgerService>,
		registry: Arc<SignerRegistry>,
		domain: SigningDomain,
		clock: Arc<dyn Clock>,
		event_bus: EventBus,
	) -> Self {
		Self {
			ledger,
			registry,
			domain,
			clock,
			records: Mutex::new(HashMap::new()),
			in_flight: AtomicBool::new(false),
			event_bus,
		}
	}

	/// Locks `amount` of `asset` under `(caller, asset, transfer_id)`.
	///
	/// `value` is the native value attached to the call. A native deposit
	/// must attach exactly `amount`; a token deposit must attach nothing
	/// and is pulled from the caller's token balance instead.
	#[instrument(skip_all, fields(transfer_id = %truncate_id(&transfer_id.to_string())))]
	pub async fn deposit(
		&self,
		caller: Address,
		asset: Address,
		transfer_id: TransferId,
		amount: U256,
		expiration: u64,
		value: U256,
	) -> Result<(), EscrowError> {
		let _guard = OperationGuard::acquire(&self.in_flight)?;
		let key = DepositKey::new(caller, asset, transfer_id);

		{
			let mut records = self.records.lock().await;
			let status = records.get(&key).map(|r| r.status).unwrap_or_default();
			if !is_valid_transition(status, DepositStatus::Deposited) {
				return Err(EscrowError::AlreadyDeposited { key });
			}
			if is_native_asset(&asset) {
				if value != amount {
					return Err(EscrowError::AmountMismatch {
						attached: value,
						amount,
					});
				}
			} else if !value.is_zero() {
				return Err(EscrowError::AssetMismatch {
					asset,
					attached: value,
				});
			}
			records.insert(
				key,
				DepositRecord {
					asset,
					amount,
					expiration,
					status: DepositStatus::Deposited,
				},
			);
		}

		// Record flips before funds move; a failed pull removes it again.
		if let Err(err) = self.ledger.collect(asset, caller, amount).await {
			self.records.lock().await.remove(&key);
			return Err(err.into());
		}

		self.event_bus
			.publish(TellerEvent::Escrow(EscrowEvent::Deposited {
				giver: caller,
				asset,
				transfer_id,
				amount,
				expiration,
			}))
			.ok();
		tracing::info!(giver = %caller, amount = %amount, "Deposit locked");
		Ok(())
	}

	/// Claims a deposited record, releasing its value to `recipient`.
	///
	/// The signature must come from an active registry signer, over the
	/// claim fingerprint of `(giver, asset, transfer_id, recipient)`.
	/// Claimability is established before the signature is examined.
	#[instrument(skip_all, fields(transfer_id = %truncate_id(&transfer_id.to_string())))]
	pub async fn claim(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		recipient: Address,
		signer_signature: &[u8],
	) -> Result<(), EscrowError> {
		let _guard = OperationGuard::acquire(&self.in_flight)?;
		let key = DepositKey::new(giver, asset, transfer_id);
		let now = self.clock.now();

		let (amount, authorizer) = {
			let mut records = self.records.lock().await;
			let record = match records.get_mut(&key) {
				Some(record) if record_claimable(record, now) => record,
				_ => return Err(EscrowError::NotClaimable { key }),
			};
			let authorizer = self
				.authorize_signer_claim(giver, asset, transfer_id, recipient, signer_signature)
				.await?;
			record.status = DepositStatus::Claimed;
			(record.amount, authorizer)
		};

		if let Err(err) = self.release(asset, amount, recipient).await {
			self.reopen(key).await;
			return Err(err);
		}

		self.publish_claimed(giver, asset, transfer_id, amount, recipient, authorizer);
		tracing::info!(recipient = %recipient, authorizer = %authorizer, "Claim released");
		Ok(())
	}

	/// Claims a deposited record with the giver's own typed-data claim
	/// authorization instead of a registry signer's signature. The giver
	/// appears as the authorizer in the resulting event.
	#[instrument(skip_all, fields(transfer_id = %truncate_id(&transfer_id.to_string())))]
	pub async fn claim_with_direct_auth(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		recipient: Address,
		giver_signature: &[u8],
	) -> Result<(), EscrowError> {
		let _guard = OperationGuard::acquire(&self.in_flight)?;
		let key = DepositKey::new(giver, asset, transfer_id);
		let now = self.clock.now();

		let amount = {
			let mut records = self.records.lock().await;
			let record = match records.get_mut(&key) {
				Some(record) if record_claimable(record, now) => record,
				_ => return Err(EscrowError::NotClaimable { key }),
			};
			self.verify_claim_authorization(
				giver,
				asset,
				transfer_id,
				recipient,
				giver_signature,
			)?;
			record.status = DepositStatus::Claimed;
			record.amount
		};

		if let Err(err) = self.release(asset, amount, recipient).await {
			self.reopen(key).await;
			return Err(err);
		}

		self.publish_claimed(giver, asset, transfer_id, amount, recipient, giver);
		tracing::info!(recipient = %recipient, "Direct-authorized claim released");
		Ok(())
	}

	/// Atomically composes a giver-authorized deposit with a signer
	/// claim.
	///
	/// Funds are pulled from the giver's token balance no matter who
	/// submits the call. The native asset is rejected before either
	/// signature is examined: only pull-based token transfers can be
	/// authorized this way. Any failure after the pull returns the funds
	/// and removes the record, leaving the key unused.
	#[allow(clippy::too_many_arguments)]
	#[instrument(skip_all, fields(transfer_id = %truncate_id(&transfer_id.to_string())))]
	pub async fn claim_with_deposit_sig(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		recipient: Address,
		amount: U256,
		expiration: u64,
		giver_signature: &[u8],
		signer_signature: &[u8],
	) -> Result<(), EscrowError> {
		let _guard = OperationGuard::acquire(&self.in_flight)?;
		if is_native_asset(&asset) {
			return Err(EscrowError::Erc20Only);
		}
		self.verify_deposit_authorization(
			giver,
			asset,
			transfer_id,
			amount,
			expiration,
			giver_signature,
		)?;

		let key = DepositKey::new(giver, asset, transfer_id);
		let now = self.clock.now();

		{
			let mut records = self.records.lock().await;
			let status = records.get(&key).map(|r| r.status).unwrap_or_default();
			if !is_valid_transition(status, DepositStatus::Deposited) {
				return Err(EscrowError::AlreadyDeposited { key });
			}
			records.insert(
				key,
				DepositRecord {
					asset,
					amount,
					expiration,
					status: DepositStatus::Deposited,
				},
			);
		}
		if let Err(err) = self.ledger.collect(asset, giver, amount).await {
			self.records.lock().await.remove(&key);
			return Err(err.into());
		}

		let authorizer = match self
			.claim_step(key, giver, asset, transfer_id, recipient, now, signer_signature)
			.await
		{
			Ok(authorizer) => authorizer,
			Err(err) => {
				self.unwind_pulled_deposit(key, giver, asset, amount).await;
				return Err(err);
			},
		};

		if let Err(err) = self.release(asset, amount, recipient).await {
			self.unwind_pulled_deposit(key, giver, asset, amount).await;
			return Err(err);
		}

		self.event_bus
			.publish(TellerEvent::Escrow(EscrowEvent::Deposited {
				giver,
				asset,
				transfer_id,
				amount,
				expiration,
			}))
			.ok();
		self.publish_claimed(giver, asset, transfer_id, amount, recipient, authorizer);
		tracing::info!(giver = %giver, recipient = %recipient, "Deposit pulled and claimed");
		Ok(())
	}

	/// Cancels the record under `(caller, asset, transfer_id)`.
	///
	/// A fresh key is retired permanently with a zeroed Cancelled record;
	/// a live deposit is refunded to the caller; a settled record is
	/// acknowledged without change. All three outcomes emit a Cancelled
	/// event.
	#[instrument(skip_all, fields(transfer_id = %truncate_id(&transfer_id.to_string())))]
	pub async fn cancel(
		&self,
		caller: Address,
		asset: Address,
		transfer_id: TransferId,
	) -> Result<(), EscrowError> {
		let _guard = OperationGuard::acquire(&self.in_flight)?;
		let key = DepositKey::new(caller, asset, transfer_id);

		let refund = {
			let mut records = self.records.lock().await;
			match records.get_mut(&key) {
				None => {
					records.insert(key, DepositRecord::burned(asset));
					None
				},
				Some(record)
					if is_valid_transition(record.status, DepositStatus::Cancelled) =>
				{
					let amount = record.amount;
					record.status = DepositStatus::Cancelled;
					Some(amount)
				},
				Some(record) => {
					tracing::debug!(status = %record.status, "Cancel on settled record");
					None
				},
			}
		};

		if let Some(amount) = refund {
			if let Err(err) = self.release(asset, amount, caller).await {
				self.reopen(key).await;
				return Err(err);
			}
		}

		self.event_bus
			.publish(TellerEvent::Escrow(EscrowEvent::Cancelled {
				giver: caller,
				asset,
				transfer_id,
			}))
			.ok();
		tracing::info!(giver = %caller, "Cancelled record");
		Ok(())
	}

	/// Refunds an expired deposit to its giver. Anyone may call this once
	/// the record is strictly past its expiration second.
	#[instrument(skip_all, fields(transfer_id = %truncate_id(&transfer_id.to_string())))]
	pub async fn refund(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
	) -> Result<(), EscrowError> {
		let _guard = OperationGuard::acquire(&self.in_flight)?;
		let key = DepositKey::new(giver, asset, transfer_id);
		let now = self.clock.now();

		let amount = {
			let mut records = self.records.lock().await;
			let record = match records.get_mut(&key) {
				Some(record)
					if is_valid_transition(record.status, DepositStatus::Expired)
						&& record.expiration < now =>
				{
					record
				},
				_ => return Err(EscrowError::NotExpired { key }),
			};
			record.status = DepositStatus::Expired;
			record.amount
		};

		if let Err(err) = self.release(asset, amount, giver).await {
			self.reopen(key).await;
			return Err(err);
		}

		self.event_bus
			.publish(TellerEvent::Escrow(EscrowEvent::Refunded {
				giver,
				asset,
				transfer_id,
			}))
			.ok();
		tracing::info!(giver = %giver, "Refunded expired deposit");
		Ok(())
	}

	/// Reports whether the record under `(giver, asset, transfer_id)` can
	/// be claimed right now. A record stays claimable through its
	/// expiration second and stops the second after.
	pub async fn is_claimable(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
	) -> bool {
		let key = DepositKey::new(giver, asset, transfer_id);
		let now = self.clock.now();
		self.records
			.lock()
			.await
			.get(&key)
			.is_some_and(|record| record_claimable(record, now))
	}

	/// Returns a copy of the record under `(giver, asset, transfer_id)`,
	/// if the key has ever been touched.
	pub async fn record(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
	) -> Option<DepositRecord> {
		let key = DepositKey::new(giver, asset, transfer_id);
		self.records.lock().await.get(&key).copied()
	}

	/// Returns the lifecycle status of the key, NotDepositedYet for keys
	/// never touched.
	pub async fn status(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
	) -> DepositStatus {
		let key = DepositKey::new(giver, asset, transfer_id);
		self.records
			.lock()
			.await
			.get(&key)
			.map(|r| r.status)
			.unwrap_or_default()
	}

	/// Verifies a signer claim signature and returns the recovered
	/// signer.
	async fn authorize_signer_claim(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		recipient: Address,
		signature: &[u8],
	) -> Result<Address, EscrowError> {
		let digest = auth::signer_claim_digest(giver, asset, transfer_id, recipient);
		let recovered = auth::recover_signer(&digest, signature);
		if !self.registry.is_active(recovered).await {
			return Err(EscrowError::InvalidSignerSignature { recovered });
		}
		Ok(recovered)
	}

	/// Verifies a giver's typed-data claim authorization.
	fn verify_claim_authorization(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		recipient: Address,
		signature: &[u8],
	) -> Result<(), EscrowError> {
		let digest = self
			.domain
			.claim_authorization_digest(asset, transfer_id, recipient);
		let recovered = auth::recover_signer(&digest, signature);
		if recovered == Address::ZERO || recovered != giver {
			return Err(EscrowError::InvalidGiverSignature { recovered, giver });
		}
		Ok(())
	}

	/// Verifies a giver's typed-data deposit authorization.
	fn verify_deposit_authorization(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		amount: U256,
		expiration: u64,
		signature: &[u8],
	) -> Result<(), EscrowError> {
		let digest =
			self.domain
				.deposit_authorization_digest(asset, transfer_id, amount, expiration);
		let recovered = auth::recover_signer(&digest, signature);
		if recovered == Address::ZERO || recovered != giver {
			return Err(EscrowError::InvalidGiverSignature { recovered, giver });
		}
		Ok(())
	}

	/// Claimability check, signer verification, and the Claimed flip for
	/// the composed operation.
	#[allow(clippy::too_many_arguments)]
	async fn claim_step(
		&self,
		key: DepositKey,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		recipient: Address,
		now: u64,
		signer_signature: &[u8],
	) -> Result<Address, EscrowError> {
		let mut records = self.records.lock().await;
		let record = match records.get_mut(&key) {
			Some(record) if record_claimable(record, now) => record,
			_ => return Err(EscrowError::NotClaimable { key }),
		};
		let authorizer = self
			.authorize_signer_claim(giver, asset, transfer_id, recipient, signer_signature)
			.await?;
		record.status = DepositStatus::Claimed;
		Ok(authorizer)
	}

	/// Releases escrowed value to `to`, picking the native send or token
	/// transfer path by asset.
	async fn release(&self, asset: Address, amount: U256, to: Address) -> Result<(), EscrowError> {
		if is_native_asset(&asset) {
			self.ledger.send_native(to, amount).await.map_err(|err| {
				tracing::debug!(recipient = %to, error = %err, "Native send rejected");
				EscrowError::SendFailure { amount, to }
			})
		} else {
			Ok(self.ledger.release(asset, amount, to).await?)
		}
	}

	/// Puts a record back to Deposited after a failed outbound transfer.
	async fn reopen(&self, key: DepositKey) {
		if let Some(record) = self.records.lock().await.get_mut(&key) {
			record.status = DepositStatus::Deposited;
		}
	}

	/// Removes a freshly pulled deposit and returns its funds to the
	/// giver.
	async fn unwind_pulled_deposit(
		&self,
		key: DepositKey,
		giver: Address,
		asset: Address,
		amount: U256,
	) {
		self.records.lock().await.remove(&key);
		if let Err(err) = self.ledger.release(asset, amount, giver).await {
			tracing::error!(giver = %giver, error = %err, "Failed to return pulled deposit");
		}
	}

	fn publish_claimed(
		&self,
		giver: Address,
		asset: Address,
		transfer_id: TransferId,
		amount: U256,
		recipient: Address,
		authorizer: Address,
	) {
		self.event_bus
			.publish(TellerEvent::Escrow(EscrowEvent::Claimed {
				giver,
				asset,
				transfer_id,
				amount,
				recipient,
				authorizer,
			}))
			.ok();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use alloy_primitives::B256;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;
	use teller_ledger::{implementations::memory::MemoryLedger, LedgerInterface};
	use teller_types::{ConfigSchema, NATIVE_ASSET};
	use tokio::sync::broadcast::error::TryRecvError;

	const START: u64 = 1_700_000_000;
	const DAY: u64 = 86_400;

	struct Harness {
		engine: Arc<EscrowEngine>,
		ledger: Arc<LedgerService>,
		clock: Arc<ManualClock>,
		bus: EventBus,
		signer: PrivateKeySigner,
		giver: PrivateKeySigner,
		stranger: PrivateKeySigner,
		token: Address,
		custody: Address,
		domain: SigningDomain,
		recipient: Address,
	}

	async fn harness() -> Harness {
		harness_with_blocked(&[]).await
	}

	/// Builds an engine over a memory ledger seeded with giver balances.
	/// `blocked` recipients reject outbound transfers.
	async fn harness_with_blocked(blocked: &[Address]) -> Harness {
		let custody = Address::repeat_byte(0xcc);
		let signer = PrivateKeySigner::random();
		let giver = PrivateKeySigner::random();
		let stranger = PrivateKeySigner::random();
		let token = Address::repeat_byte(0x70);

		let memory = MemoryLedger::new(custody);
		memory
			.credit(NATIVE_ASSET, giver.address(), U256::from(10_000))
			.await;
		memory.credit(token, giver.address(), U256::from(10_000)).await;
		memory.approve(token, giver.address(), custody, U256::MAX).await;
		memory.credit(token, stranger.address(), U256::from(50)).await;
		memory
			.approve(token, stranger.address(), custody, U256::MAX)
			.await;
		for recipient in blocked {
			memory.block_recipient(*recipient).await;
		}
		let ledger = Arc::new(LedgerService::new(Box::new(memory), custody));

		let bus = EventBus::new(64);
		let registry = Arc::new(
			SignerRegistry::new(Address::repeat_byte(0x01), &[signer.address()], bus.clone())
				.unwrap(),
		);
		let clock = Arc::new(ManualClock::new(START));
		let domain = SigningDomain::new("Teller", "1", 31337, custody);
		let engine = Arc::new(EscrowEngine::new(
			ledger.clone(),
			registry,
			domain.clone(),
			clock.clone(),
			bus.clone(),
		));

		Harness {
			engine,
			ledger,
			clock,
			bus,
			signer,
			giver,
			stranger,
			token,
			custody,
			domain,
			recipient: Address::repeat_byte(0xee),
		}
	}

	fn tid(byte: u8) -> TransferId {
		B256::repeat_byte(byte)
	}

	fn sign(signer: &PrivateKeySigner, digest: B256) -> Vec<u8> {
		signer.sign_hash_sync(&digest).unwrap().as_bytes().to_vec()
	}

	fn signer_claim_sig(h: &Harness, asset: Address, id: TransferId) -> Vec<u8> {
		sign(
			&h.signer,
			auth::signer_claim_digest(h.giver.address(), asset, id, h.recipient),
		)
	}

	async fn deposit_native(h: &Harness, id: TransferId, amount: u64, expiration: u64) {
		h.engine
			.deposit(
				h.giver.address(),
				NATIVE_ASSET,
				id,
				U256::from(amount),
				expiration,
				U256::from(amount),
			)
			.await
			.unwrap();
	}

	async fn deposit_token(h: &Harness, id: TransferId, amount: u64, expiration: u64) {
		h.engine
			.deposit(
				h.giver.address(),
				h.token,
				id,
				U256::from(amount),
				expiration,
				U256::ZERO,
			)
			.await
			.unwrap();
	}

	async fn balance(h: &Harness, asset: Address, holder: Address) -> U256 {
		h.ledger.balance_of(asset, holder).await.unwrap()
	}

	#[tokio::test]
	async fn test_deposit_then_claim_releases_native() {
		let h = harness().await;
		let id = tid(0x11);
		let mut events = h.bus.subscribe();

		deposit_native(&h, id, 100, START + DAY).await;
		assert_eq!(balance(&h, NATIVE_ASSET, h.custody).await, U256::from(100));
		assert!(h.engine.is_claimable(h.giver.address(), NATIVE_ASSET, id).await);

		let sig = signer_claim_sig(&h, NATIVE_ASSET, id);
		h.engine
			.claim(h.giver.address(), NATIVE_ASSET, id, h.recipient, &sig)
			.await
			.unwrap();

		assert_eq!(balance(&h, NATIVE_ASSET, h.recipient).await, U256::from(100));
		assert_eq!(balance(&h, NATIVE_ASSET, h.custody).await, U256::ZERO);
		assert_eq!(
			h.engine.status(h.giver.address(), NATIVE_ASSET, id).await,
			DepositStatus::Claimed
		);

		match events.recv().await.unwrap() {
			TellerEvent::Escrow(EscrowEvent::Deposited { giver, amount, .. }) => {
				assert_eq!(giver, h.giver.address());
				assert_eq!(amount, U256::from(100));
			},
			other => panic!("unexpected event: {:?}", other),
		}
		match events.recv().await.unwrap() {
			TellerEvent::Escrow(EscrowEvent::Claimed {
				recipient,
				authorizer,
				..
			}) => {
				assert_eq!(recipient, h.recipient);
				assert_eq!(authorizer, h.signer.address());
			},
			other => panic!("unexpected event: {:?}", other),
		}

		// Second claim finds the record settled
		let result = h
			.engine
			.claim(h.giver.address(), NATIVE_ASSET, id, h.recipient, &sig)
			.await;
		assert!(matches!(result, Err(EscrowError::NotClaimable { .. })));
	}

	#[tokio::test]
	async fn test_deposit_rejects_reused_key() {
		let h = harness().await;
		let id = tid(0x12);
		deposit_native(&h, id, 100, START + DAY).await;

		let result = h
			.engine
			.deposit(
				h.giver.address(),
				NATIVE_ASSET,
				id,
				U256::from(100),
				START + DAY,
				U256::from(100),
			)
			.await;
		assert!(matches!(result, Err(EscrowError::AlreadyDeposited { .. })));
	}

	#[tokio::test]
	async fn test_native_deposit_requires_exact_value() {
		let h = harness().await;
		let id = tid(0x13);

		let result = h
			.engine
			.deposit(
				h.giver.address(),
				NATIVE_ASSET,
				id,
				U256::from(100),
				START + DAY,
				U256::from(99),
			)
			.await;
		match result {
			Err(EscrowError::AmountMismatch { attached, amount }) => {
				assert_eq!(attached, U256::from(99));
				assert_eq!(amount, U256::from(100));
			},
			other => panic!("unexpected result: {:?}", other),
		}
		assert_eq!(
			h.engine.status(h.giver.address(), NATIVE_ASSET, id).await,
			DepositStatus::NotDepositedYet
		);
	}

	#[tokio::test]
	async fn test_token_deposit_rejects_attached_value() {
		let h = harness().await;
		let id = tid(0x14);

		let result = h
			.engine
			.deposit(
				h.giver.address(),
				h.token,
				id,
				U256::from(100),
				START + DAY,
				U256::from(1),
			)
			.await;
		assert!(matches!(result, Err(EscrowError::AssetMismatch { .. })));
		assert_eq!(
			h.engine.status(h.giver.address(), h.token, id).await,
			DepositStatus::NotDepositedYet
		);
	}

	#[tokio::test]
	async fn test_failed_pull_leaves_key_unused() {
		let h = harness().await;
		let id = tid(0x15);

		// Stranger holds 50 tokens; pulling 100 fails and clears the key
		let result = h
			.engine
			.deposit(
				h.stranger.address(),
				h.token,
				id,
				U256::from(100),
				START + DAY,
				U256::ZERO,
			)
			.await;
		assert!(matches!(
			result,
			Err(EscrowError::Ledger(LedgerError::InsufficientBalance { .. }))
		));
		assert_eq!(
			h.engine.status(h.stranger.address(), h.token, id).await,
			DepositStatus::NotDepositedYet
		);

		// The key is still usable for an affordable deposit
		h.engine
			.deposit(
				h.stranger.address(),
				h.token,
				id,
				U256::from(50),
				START + DAY,
				U256::ZERO,
			)
			.await
			.unwrap();
		assert_eq!(
			h.engine.status(h.stranger.address(), h.token, id).await,
			DepositStatus::Deposited
		);
	}

	#[tokio::test]
	async fn test_claim_requires_active_signer() {
		let h = harness().await;
		let id = tid(0x16);
		deposit_native(&h, id, 100, START + DAY).await;

		let sig = sign(
			&h.stranger,
			auth::signer_claim_digest(h.giver.address(), NATIVE_ASSET, id, h.recipient),
		);
		let result = h
			.engine
			.claim(h.giver.address(), NATIVE_ASSET, id, h.recipient, &sig)
			.await;
		match result {
			Err(EscrowError::InvalidSignerSignature { recovered }) => {
				assert_eq!(recovered, h.stranger.address());
			},
			other => panic!("unexpected result: {:?}", other),
		}
		assert_eq!(
			h.engine.status(h.giver.address(), NATIVE_ASSET, id).await,
			DepositStatus::Deposited
		);
		assert_eq!(balance(&h, NATIVE_ASSET, h.custody).await, U256::from(100));
	}

	#[tokio::test]
	async fn test_claim_reports_zero_recovery_for_garbage_signature() {
		let h = harness().await;
		let id = tid(0x17);
		deposit_native(&h, id, 100, START + DAY).await;

		let result = h
			.engine
			.claim(h.giver.address(), NATIVE_ASSET, id, h.recipient, &[0u8; 65])
			.await;
		match result {
			Err(EscrowError::InvalidSignerSignature { recovered }) => {
				assert_eq!(recovered, Address::ZERO);
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_claim_checks_claimability_before_signature() {
		let h = harness().await;
		let id = tid(0x18);

		// No deposit and a garbage signature: the record check wins
		let result = h
			.engine
			.claim(h.giver.address(), NATIVE_ASSET, id, h.recipient, &[0u8; 3])
			.await;
		assert!(matches!(result, Err(EscrowError::NotClaimable { .. })));
	}

	#[tokio::test]
	async fn test_claim_honors_inclusive_expiration_boundary() {
		let h = harness().await;
		let id = tid(0x19);
		deposit_native(&h, id, 100, START + DAY).await;

		// At exactly the expiration second the record is still claimable
		h.clock.set(START + DAY);
		assert!(h.engine.is_claimable(h.giver.address(), NATIVE_ASSET, id).await);
		let sig = signer_claim_sig(&h, NATIVE_ASSET, id);
		h.engine
			.claim(h.giver.address(), NATIVE_ASSET, id, h.recipient, &sig)
			.await
			.unwrap();

		// One second later a fresh deposit is past its window
		let late = tid(0x1a);
		deposit_native(&h, late, 100, START + DAY).await;
		h.clock.set(START + DAY + 1);
		assert!(!h.engine.is_claimable(h.giver.address(), NATIVE_ASSET, late).await);
		let sig = sign(
			&h.signer,
			auth::signer_claim_digest(h.giver.address(), NATIVE_ASSET, late, h.recipient),
		);
		let result = h
			.engine
			.claim(h.giver.address(), NATIVE_ASSET, late, h.recipient, &sig)
			.await;
		assert!(matches!(result, Err(EscrowError::NotClaimable { .. })));
	}

	#[tokio::test]
	async fn test_refund_requires_strict_expiry() {
		let h = harness().await;
		let id = tid(0x1b);
		deposit_token(&h, id, 100, START + DAY).await;
		let giver = h.giver.address();

		// Unknown key
		let result = h.engine.refund(giver, h.token, tid(0xfe)).await;
		assert!(matches!(result, Err(EscrowError::NotExpired { .. })));

		// Before expiration, and at the expiration second itself
		let result = h.engine.refund(giver, h.token, id).await;
		assert!(matches!(result, Err(EscrowError::NotExpired { .. })));
		h.clock.set(START + DAY);
		let result = h.engine.refund(giver, h.token, id).await;
		assert!(matches!(result, Err(EscrowError::NotExpired { .. })));

		// Strictly past expiration anyone may trigger the refund
		h.clock.set(START + DAY + 1);
		h.engine.refund(giver, h.token, id).await.unwrap();
		assert_eq!(balance(&h, h.token, giver).await, U256::from(10_000));
		assert_eq!(
			h.engine.status(giver, h.token, id).await,
			DepositStatus::Expired
		);

		// A second refund finds nothing to release
		let result = h.engine.refund(giver, h.token, id).await;
		assert!(matches!(result, Err(EscrowError::NotExpired { .. })));
	}

	#[tokio::test]
	async fn test_cancel_burns_unused_key() {
		let h = harness().await;
		let id = tid(0x1c);
		let giver = h.giver.address();
		let mut events = h.bus.subscribe();

		h.engine.cancel(giver, h.token, id).await.unwrap();

		let record = h.engine.record(giver, h.token, id).await.unwrap();
		assert_eq!(record.status, DepositStatus::Cancelled);
		assert_eq!(record.amount, U256::ZERO);
		assert!(matches!(
			events.recv().await.unwrap(),
			TellerEvent::Escrow(EscrowEvent::Cancelled { .. })
		));

		// The burned key can never be deposited under
		let result = h
			.engine
			.deposit(giver, h.token, id, U256::from(1), START + DAY, U256::ZERO)
			.await;
		assert!(matches!(result, Err(EscrowError::AlreadyDeposited { .. })));
	}

	#[tokio::test]
	async fn test_cancel_refunds_live_deposit() {
		let h = harness().await;
		let id = tid(0x1d);
		let giver = h.giver.address();
		deposit_token(&h, id, 250, START + DAY).await;
		assert_eq!(balance(&h, h.token, giver).await, U256::from(9_750));

		h.engine.cancel(giver, h.token, id).await.unwrap();

		assert_eq!(balance(&h, h.token, giver).await, U256::from(10_000));
		assert_eq!(
			h.engine.status(giver, h.token, id).await,
			DepositStatus::Cancelled
		);
	}

	#[tokio::test]
	async fn test_cancel_acknowledges_settled_record() {
		let h = harness().await;
		let id = tid(0x1e);
		let giver = h.giver.address();
		deposit_native(&h, id, 100, START + DAY).await;
		let sig = signer_claim_sig(&h, NATIVE_ASSET, id);
		h.engine
			.claim(giver, NATIVE_ASSET, id, h.recipient, &sig)
			.await
			.unwrap();

		let mut events = h.bus.subscribe();
		let recipient_before = balance(&h, NATIVE_ASSET, h.recipient).await;

		h.engine.cancel(giver, NATIVE_ASSET, id).await.unwrap();

		// Status and balances untouched, but the event still fires
		assert_eq!(
			h.engine.status(giver, NATIVE_ASSET, id).await,
			DepositStatus::Claimed
		);
		assert_eq!(balance(&h, NATIVE_ASSET, h.recipient).await, recipient_before);
		assert!(matches!(
			events.recv().await.unwrap(),
			TellerEvent::Escrow(EscrowEvent::Cancelled { .. })
		));
	}

	#[tokio::test]
	async fn test_is_claimable_tracks_status_and_time() {
		let h = harness().await;
		let id = tid(0x1f);
		let giver = h.giver.address();

		assert!(!h.engine.is_claimable(giver, NATIVE_ASSET, id).await);
		deposit_native(&h, id, 100, START + DAY).await;
		assert!(h.engine.is_claimable(giver, NATIVE_ASSET, id).await);

		h.clock.set(START + DAY + 1);
		assert!(!h.engine.is_claimable(giver, NATIVE_ASSET, id).await);

		h.clock.set(START);
		let sig = signer_claim_sig(&h, NATIVE_ASSET, id);
		h.engine
			.claim(giver, NATIVE_ASSET, id, h.recipient, &sig)
			.await
			.unwrap();
		assert!(!h.engine.is_claimable(giver, NATIVE_ASSET, id).await);
	}

	#[tokio::test]
	async fn test_direct_auth_claim_releases_to_recipient() {
		let h = harness().await;
		let id = tid(0x21);
		let giver = h.giver.address();
		deposit_token(&h, id, 300, START + DAY).await;
		let mut events = h.bus.subscribe();

		let digest = h.domain.claim_authorization_digest(h.token, id, h.recipient);
		let sig = sign(&h.giver, digest);
		h.engine
			.claim_with_direct_auth(giver, h.token, id, h.recipient, &sig)
			.await
			.unwrap();

		assert_eq!(balance(&h, h.token, h.recipient).await, U256::from(300));
		match events.recv().await.unwrap() {
			TellerEvent::Escrow(EscrowEvent::Claimed { authorizer, .. }) => {
				assert_eq!(authorizer, giver);
			},
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_direct_auth_rejects_foreign_signature() {
		let h = harness().await;
		let id = tid(0x22);
		let giver = h.giver.address();
		deposit_token(&h, id, 300, START + DAY).await;

		let digest = h.domain.claim_authorization_digest(h.token, id, h.recipient);
		let sig = sign(&h.stranger, digest);
		let result = h
			.engine
			.claim_with_direct_auth(giver, h.token, id, h.recipient, &sig)
			.await;
		match result {
			Err(EscrowError::InvalidGiverSignature { recovered, giver: g }) => {
				assert_eq!(recovered, h.stranger.address());
				assert_eq!(g, giver);
			},
			other => panic!("unexpected result: {:?}", other),
		}
		assert_eq!(
			h.engine.status(giver, h.token, id).await,
			DepositStatus::Deposited
		);
	}

	#[tokio::test]
	async fn test_direct_auth_requires_live_deposit() {
		let h = harness().await;
		let id = tid(0x23);

		let result = h
			.engine
			.claim_with_direct_auth(h.giver.address(), h.token, id, h.recipient, &[0u8; 65])
			.await;
		assert!(matches!(result, Err(EscrowError::NotClaimable { .. })));
	}

	fn composed_signatures(
		h: &Harness,
		id: TransferId,
		amount: u64,
		expiration: u64,
	) -> (Vec<u8>, Vec<u8>) {
		let deposit_digest =
			h.domain
				.deposit_authorization_digest(h.token, id, U256::from(amount), expiration);
		let giver_sig = sign(&h.giver, deposit_digest);
		let signer_sig = signer_claim_sig(h, h.token, id);
		(giver_sig, signer_sig)
	}

	#[tokio::test]
	async fn test_composed_claim_pulls_and_releases() {
		let h = harness().await;
		let id = tid(0x31);
		let giver = h.giver.address();
		let mut events = h.bus.subscribe();
		let (giver_sig, signer_sig) = composed_signatures(&h, id, 400, START + DAY);

		h.engine
			.claim_with_deposit_sig(
				giver,
				h.token,
				id,
				h.recipient,
				U256::from(400),
				START + DAY,
				&giver_sig,
				&signer_sig,
			)
			.await
			.unwrap();

		assert_eq!(balance(&h, h.token, giver).await, U256::from(9_600));
		assert_eq!(balance(&h, h.token, h.recipient).await, U256::from(400));
		assert_eq!(
			h.engine.status(giver, h.token, id).await,
			DepositStatus::Claimed
		);

		// Deposited first, Claimed second, both for the same key
		assert!(matches!(
			events.recv().await.unwrap(),
			TellerEvent::Escrow(EscrowEvent::Deposited { .. })
		));
		match events.recv().await.unwrap() {
			TellerEvent::Escrow(EscrowEvent::Claimed { authorizer, .. }) => {
				assert_eq!(authorizer, h.signer.address());
			},
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_composed_claim_is_token_only() {
		let h = harness().await;
		let id = tid(0x32);

		// Garbage signatures: the asset check comes first
		let result = h
			.engine
			.claim_with_deposit_sig(
				h.giver.address(),
				NATIVE_ASSET,
				id,
				h.recipient,
				U256::from(100),
				START + DAY,
				&[0u8; 65],
				&[0u8; 65],
			)
			.await;
		assert!(matches!(result, Err(EscrowError::Erc20Only)));
	}

	#[tokio::test]
	async fn test_composed_claim_rejects_bad_giver_authorization() {
		let h = harness().await;
		let id = tid(0x33);
		let giver = h.giver.address();

		// Signed by the wrong key
		let deposit_digest =
			h.domain
				.deposit_authorization_digest(h.token, id, U256::from(100), START + DAY);
		let bad_sig = sign(&h.stranger, deposit_digest);
		let signer_sig = signer_claim_sig(&h, h.token, id);
		let result = h
			.engine
			.claim_with_deposit_sig(
				giver,
				h.token,
				id,
				h.recipient,
				U256::from(100),
				START + DAY,
				&bad_sig,
				&signer_sig,
			)
			.await;
		assert!(matches!(
			result,
			Err(EscrowError::InvalidGiverSignature { .. })
		));

		// Signed by the giver, but for a different deployment
		let foreign = SigningDomain::new("Teller", "1", 31337, Address::repeat_byte(0xdd));
		let foreign_sig = sign(
			&h.giver,
			foreign.deposit_authorization_digest(h.token, id, U256::from(100), START + DAY),
		);
		let result = h
			.engine
			.claim_with_deposit_sig(
				giver,
				h.token,
				id,
				h.recipient,
				U256::from(100),
				START + DAY,
				&foreign_sig,
				&signer_sig,
			)
			.await;
		assert!(matches!(
			result,
			Err(EscrowError::InvalidGiverSignature { .. })
		));

		// Nothing was pulled or recorded
		assert_eq!(balance(&h, h.token, giver).await, U256::from(10_000));
		assert_eq!(
			h.engine.status(giver, h.token, id).await,
			DepositStatus::NotDepositedYet
		);
	}

	#[tokio::test]
	async fn test_composed_claim_unwinds_on_bad_signer() {
		let h = harness().await;
		let id = tid(0x34);
		let giver = h.giver.address();

		let deposit_digest =
			h.domain
				.deposit_authorization_digest(h.token, id, U256::from(100), START + DAY);
		let giver_sig = sign(&h.giver, deposit_digest);
		let result = h
			.engine
			.claim_with_deposit_sig(
				giver,
				h.token,
				id,
				h.recipient,
				U256::from(100),
				START + DAY,
				&giver_sig,
				&[0u8; 65],
			)
			.await;
		assert!(matches!(
			result,
			Err(EscrowError::InvalidSignerSignature { .. })
		));

		// The pulled deposit was returned and the key is unused again
		assert_eq!(balance(&h, h.token, giver).await, U256::from(10_000));
		assert_eq!(balance(&h, h.token, h.custody).await, U256::ZERO);
		assert_eq!(
			h.engine.status(giver, h.token, id).await,
			DepositStatus::NotDepositedYet
		);
	}

	#[tokio::test]
	async fn test_composed_claim_rejects_reused_key() {
		let h = harness().await;
		let id = tid(0x35);
		let giver = h.giver.address();
		deposit_token(&h, id, 100, START + DAY).await;

		let (giver_sig, signer_sig) = composed_signatures(&h, id, 100, START + DAY);
		let result = h
			.engine
			.claim_with_deposit_sig(
				giver,
				h.token,
				id,
				h.recipient,
				U256::from(100),
				START + DAY,
				&giver_sig,
				&signer_sig,
			)
			.await;
		assert!(matches!(result, Err(EscrowError::AlreadyDeposited { .. })));
	}

	#[tokio::test]
	async fn test_composed_claim_rejects_expired_authorization() {
		let h = harness().await;
		let id = tid(0x36);
		let giver = h.giver.address();
		let (giver_sig, signer_sig) = composed_signatures(&h, id, 100, START - 1);

		let result = h
			.engine
			.claim_with_deposit_sig(
				giver,
				h.token,
				id,
				h.recipient,
				U256::from(100),
				START - 1,
				&giver_sig,
				&signer_sig,
			)
			.await;
		assert!(matches!(result, Err(EscrowError::NotClaimable { .. })));
		assert_eq!(balance(&h, h.token, giver).await, U256::from(10_000));
		assert_eq!(
			h.engine.status(giver, h.token, id).await,
			DepositStatus::NotDepositedYet
		);
	}

	#[tokio::test]
	async fn test_send_failure_restores_record() {
		let blocked = Address::repeat_byte(0xbb);
		let h = harness_with_blocked(&[blocked]).await;
		let id = tid(0x37);
		let giver = h.giver.address();
		deposit_native(&h, id, 100, START + DAY).await;

		let sig = sign(
			&h.signer,
			auth::signer_claim_digest(giver, NATIVE_ASSET, id, blocked),
		);
		let result = h.engine.claim(giver, NATIVE_ASSET, id, blocked, &sig).await;
		match result {
			Err(EscrowError::SendFailure { amount, to }) => {
				assert_eq!(amount, U256::from(100));
				assert_eq!(to, blocked);
			},
			other => panic!("unexpected result: {:?}", other),
		}

		// Record reopened; a claim to a working recipient still succeeds
		assert_eq!(
			h.engine.status(giver, NATIVE_ASSET, id).await,
			DepositStatus::Deposited
		);
		let sig = signer_claim_sig(&h, NATIVE_ASSET, id);
		h.engine
			.claim(giver, NATIVE_ASSET, id, h.recipient, &sig)
			.await
			.unwrap();
		assert_eq!(balance(&h, NATIVE_ASSET, h.recipient).await, U256::from(100));
	}

	/// Ledger wrapper that calls back into the engine during an outbound
	/// native send, recording the error that reentrant call observed.
	struct ReentrantLedger {
		inner: MemoryLedger,
		engine: Arc<std::sync::Mutex<Option<Arc<EscrowEngine>>>>,
		observed: Arc<std::sync::Mutex<Option<EscrowError>>>,
		giver: Address,
		transfer_id: TransferId,
	}

	#[async_trait::async_trait]
	impl LedgerInterface for ReentrantLedger {
		async fn balance_of(&self, asset: Address, holder: Address) -> Result<U256, LedgerError> {
			self.inner.balance_of(asset, holder).await
		}

		async fn transfer_in(
			&self,
			asset: Address,
			from: Address,
			to: Address,
			amount: U256,
		) -> Result<(), LedgerError> {
			self.inner.transfer_in(asset, from, to, amount).await
		}

		async fn transfer_out(
			&self,
			asset: Address,
			amount: U256,
			to: Address,
		) -> Result<(), LedgerError> {
			self.inner.transfer_out(asset, amount, to).await
		}

		async fn send_native(&self, to: Address, amount: U256) -> Result<(), LedgerError> {
			let engine = self.engine.lock().unwrap().clone();
			if let Some(engine) = engine {
				if let Err(err) = engine.cancel(self.giver, NATIVE_ASSET, self.transfer_id).await
				{
					*self.observed.lock().unwrap() = Some(err);
				}
			}
			self.inner.send_native(to, amount).await
		}

		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			self.inner.config_schema()
		}
	}

	#[tokio::test]
	async fn test_operations_are_mutually_exclusive() {
		let custody = Address::repeat_byte(0xcc);
		let signer = PrivateKeySigner::random();
		let giver = PrivateKeySigner::random();
		let recipient = Address::repeat_byte(0xee);
		let id = tid(0x38);

		let engine_slot = Arc::new(std::sync::Mutex::new(None));
		let observed = Arc::new(std::sync::Mutex::new(None));

		let memory = MemoryLedger::new(custody);
		memory
			.credit(NATIVE_ASSET, giver.address(), U256::from(100))
			.await;
		let wrapper = ReentrantLedger {
			inner: memory,
			engine: engine_slot.clone(),
			observed: observed.clone(),
			giver: giver.address(),
			transfer_id: id,
		};
		let ledger = Arc::new(LedgerService::new(Box::new(wrapper), custody));
		let bus = EventBus::new(64);
		let registry = Arc::new(
			SignerRegistry::new(Address::repeat_byte(0x01), &[signer.address()], bus.clone())
				.unwrap(),
		);
		let clock = Arc::new(ManualClock::new(START));
		let engine = Arc::new(EscrowEngine::new(
			ledger,
			registry,
			SigningDomain::new("Teller", "1", 31337, custody),
			clock,
			bus,
		));
		*engine_slot.lock().unwrap() = Some(engine.clone());

		engine
			.deposit(
				giver.address(),
				NATIVE_ASSET,
				id,
				U256::from(100),
				START + DAY,
				U256::from(100),
			)
			.await
			.unwrap();

		let sig = sign(
			&signer,
			auth::signer_claim_digest(giver.address(), NATIVE_ASSET, id, recipient),
		);
		engine
			.claim(giver.address(), NATIVE_ASSET, id, recipient, &sig)
			.await
			.unwrap();

		// The reentrant cancel was rejected and the claim settled
		assert!(matches!(
			observed.lock().unwrap().take(),
			Some(EscrowError::ReentrancyBlocked)
		));
		assert_eq!(
			engine.status(giver.address(), NATIVE_ASSET, id).await,
			DepositStatus::Claimed
		);
	}

	#[tokio::test]
	async fn test_failed_operations_emit_nothing() {
		let h = harness().await;
		let id = tid(0x39);
		let mut events = h.bus.subscribe();

		let result = h
			.engine
			.claim(h.giver.address(), NATIVE_ASSET, id, h.recipient, &[0u8; 65])
			.await;
		assert!(matches!(result, Err(EscrowError::NotClaimable { .. })));
		assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
	}
}
