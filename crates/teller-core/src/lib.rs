//! Core escrow engine for the teller system.
//!
//! This module provides the main orchestration logic for the teller, wiring
//! the balance ledger, the signer registry, and the escrow engine together
//! from configuration. It includes the factory pattern for plugging in
//! different ledger backends.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use thiserror::Error;

use teller_config::Config;
use teller_ledger::LedgerService;
use teller_registry::SignerRegistry;
use teller_types::EventBus;

pub mod auth;
pub mod clock;
pub mod engine;
pub mod state;

pub use auth::SigningDomain;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EscrowEngine, EscrowError};

/// Errors that can occur while assembling or running a teller.
#[derive(Debug, Error)]
pub enum TellerError {
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Error from one of the teller services.
	#[error("Service error: {0}")]
	Service(String),
}

/// Type alias for ledger backend factory functions.
type LedgerFactory = Box<
	dyn Fn(
			&toml::Value,
			Address,
		) -> Result<Box<dyn teller_ledger::LedgerInterface>, teller_ledger::LedgerError>
		+ Send,
>;

/// Builder for constructing a Teller with pluggable implementations.
///
/// The TellerBuilder uses the factory pattern so different ledger backends
/// can be plugged in based on configuration, without the core depending on
/// any particular one.
pub struct TellerBuilder {
	config: Config,
	ledger_factories: HashMap<String, LedgerFactory>,
	clock: Option<Arc<dyn Clock>>,
}

impl TellerBuilder {
	/// Creates a new TellerBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			ledger_factories: HashMap::new(),
			clock: None,
		}
	}

	/// Adds a factory function for creating ledger backends.
	///
	/// The name parameter should match the implementation name in the
	/// configuration.
	pub fn with_ledger_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(
				&toml::Value,
				Address,
			)
				-> Result<Box<dyn teller_ledger::LedgerInterface>, teller_ledger::LedgerError>
			+ Send
			+ 'static,
	{
		self.ledger_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	/// Overrides the time source. Defaults to the system clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	/// Builds the Teller using the configured factories.
	///
	/// This method:
	/// 1. Creates the primary ledger backend and validates its configuration
	/// 2. Seeds the signer registry with the configured controller and signers
	/// 3. Wires the escrow engine to the ledger, registry, and event bus
	pub fn build(self) -> Result<Teller, TellerError> {
		let custody = self.config.domain.address;
		let primary = self.config.ledger.primary.clone();

		// Create the ledger backend
		let section = self
			.config
			.ledger
			.implementations
			.get(&primary)
			.ok_or_else(|| {
				TellerError::Config(format!("Missing configuration for ledger '{}'", primary))
			})?;
		let factory = self.ledger_factories.get(&primary).ok_or_else(|| {
			TellerError::Config(format!("Ledger factory '{}' not provided", primary))
		})?;
		let backend = factory(section, custody).map_err(|e| {
			tracing::error!(
				component = "ledger",
				implementation = %primary,
				error = %e,
				"Failed to create ledger backend"
			);
			TellerError::Config(format!(
				"Failed to create ledger backend '{}': {}",
				primary, e
			))
		})?;
		// Validate the configuration using the backend's schema
		backend.config_schema().validate(section).map_err(|e| {
			tracing::error!(
				component = "ledger",
				implementation = %primary,
				error = %e,
				"Invalid configuration for ledger backend"
			);
			TellerError::Config(format!(
				"Invalid configuration for ledger backend '{}': {}",
				primary, e
			))
		})?;
		let ledger = Arc::new(LedgerService::new(backend, custody));
		tracing::info!(component = "ledger", implementation = %primary, "Loaded");

		// Seed the signer registry
		let event_bus = EventBus::new(self.config.events.capacity);
		let registry = Arc::new(
			SignerRegistry::new(
				self.config.controller.address,
				&self.config.signers.initial,
				event_bus.clone(),
			)
			.map_err(|e| {
				TellerError::Config(format!("Failed to seed signer registry: {}", e))
			})?,
		);
		tracing::info!(
			component = "registry",
			controller = %self.config.controller.address,
			signers = self.config.signers.initial.len(),
			"Loaded"
		);

		// Wire the engine
		let domain = SigningDomain::new(
			&self.config.domain.name,
			&self.config.domain.version,
			self.config.domain.chain_id,
			custody,
		);
		let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
		let engine = Arc::new(EscrowEngine::new(
			ledger,
			registry.clone(),
			domain,
			clock,
			event_bus.clone(),
		));
		tracing::info!(component = "engine", custody = %custody, "Loaded");

		Ok(Teller {
			config: self.config,
			engine,
			registry,
			event_bus,
		})
	}
}

/// Assembled teller instance.
///
/// Holds the escrow engine, the signer registry, and the event bus they
/// both publish to. The service layer exposes these over HTTP.
pub struct Teller {
	/// Teller configuration.
	config: Config,
	/// Escrow engine holding deposit records.
	engine: Arc<EscrowEngine>,
	/// Registry of active claim signers.
	registry: Arc<SignerRegistry>,
	/// Event bus for state-change notifications.
	event_bus: EventBus,
}

impl Teller {
	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn engine(&self) -> &Arc<EscrowEngine> {
		&self.engine
	}

	pub fn registry(&self) -> &Arc<SignerRegistry> {
		&self.registry
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}
}
