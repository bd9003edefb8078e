//! Configuration module for the teller escrow system.
//!
//! This module provides structures and utilities for managing teller configuration.
//! It supports loading configuration from TOML files and provides validation to ensure
//! all required configuration values are properly set.

use alloy_primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the teller.
///
/// This structure contains all configuration sections required for the teller
/// to operate: instance identity, the signing domain, the controller and
/// initial signer set, the balance ledger backend, and the API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the teller instance.
	pub teller: TellerConfig,
	/// Signing domain the escrow authorizations are bound to.
	pub domain: DomainConfig,
	/// Controller identity for the signer registry.
	pub controller: ControllerConfig,
	/// Initial signer set, all activated at startup.
	#[serde(default)]
	pub signers: SignersConfig,
	/// Configuration for the balance ledger backend.
	pub ledger: LedgerConfig,
	/// Configuration for the event bus.
	#[serde(default)]
	pub events: EventsConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the teller instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TellerConfig {
	/// Unique identifier for this teller instance.
	pub id: String,
}

/// Signing domain configuration.
///
/// Authorization signatures are domain separated over (name, version,
/// chain_id, address), so two deployments never accept each other's
/// signatures.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
	/// Domain name bound into structured signatures.
	#[serde(default = "default_domain_name")]
	pub name: String,
	/// Domain version bound into structured signatures.
	#[serde(default = "default_domain_version")]
	pub version: String,
	/// Chain ID the deployment is bound to.
	pub chain_id: u64,
	/// Custody address standing in for the verifying contract.
	pub address: Address,
}

/// Returns the default signing domain name.
fn default_domain_name() -> String {
	"Teller".to_string()
}

/// Returns the default signing domain version.
fn default_domain_version() -> String {
	"1".to_string()
}

/// Controller identity for the signer registry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
	/// Identity allowed to run signer batch updates.
	pub address: Address,
}

/// Initial signer set configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignersConfig {
	/// Signers activated at startup, in listing order.
	#[serde(default)]
	pub initial: Vec<Address>,
}

/// Configuration for the balance ledger backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of ledger implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the event bus.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventsConfig {
	/// Capacity of the broadcast channel backing the event bus.
	#[serde(default = "default_event_capacity")]
	pub capacity: usize,
}

impl Default for EventsConfig {
	fn default() -> Self {
		Self {
			capacity: default_event_capacity(),
		}
	}
}

/// Returns the default event bus capacity.
fn default_event_capacity() -> usize {
	1000
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Returns the default API timeout in seconds.
fn default_api_timeout() -> u64 {
	30
}

/// Returns the default maximum request size in bytes.
fn default_max_request_size() -> usize {
	1024 * 1024 // 1MB
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with environment variable resolution.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method performs validation across all configuration sections:
	/// - Ensures teller ID is not empty
	/// - Validates the signing domain is fully specified
	/// - Checks the controller and initial signers are non-null identities
	/// - Validates the ledger backend selection
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate teller config
		if self.teller.id.is_empty() {
			return Err(ConfigError::Validation("Teller ID cannot be empty".into()));
		}

		// Validate domain config
		if self.domain.name.is_empty() {
			return Err(ConfigError::Validation(
				"Domain name cannot be empty".into(),
			));
		}
		if self.domain.version.is_empty() {
			return Err(ConfigError::Validation(
				"Domain version cannot be empty".into(),
			));
		}
		if self.domain.chain_id == 0 {
			return Err(ConfigError::Validation(
				"Domain chain_id must be greater than 0".into(),
			));
		}
		if self.domain.address == Address::ZERO {
			return Err(ConfigError::Validation(
				"Domain address cannot be the zero address".into(),
			));
		}

		// Validate controller config
		if self.controller.address == Address::ZERO {
			return Err(ConfigError::Validation(
				"Controller address cannot be the zero address".into(),
			));
		}

		// Validate initial signer set
		for signer in &self.signers.initial {
			if *signer == Address::ZERO {
				return Err(ConfigError::Validation(
					"Initial signer set cannot contain the zero address".into(),
				));
			}
		}

		// Validate ledger config
		if self.ledger.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one ledger implementation must be configured".into(),
			));
		}
		if self.ledger.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Ledger primary implementation cannot be empty".into(),
			));
		}
		if !self.ledger.implementations.contains_key(&self.ledger.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary ledger '{}' not found in implementations",
				self.ledger.primary
			)));
		}

		// Validate event bus config
		if self.events.capacity == 0 {
			return Err(ConfigError::Validation(
				"Event bus capacity must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the standard
/// string parsing interface. Environment variables are resolved and the
/// configuration is automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn base_config() -> String {
		r#"
[teller]
id = "test-teller"

[domain]
chain_id = 1
address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

[controller]
address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"

[signers]
initial = ["0x70997970C51812dc3A010C7d01b50e0d17dc79C8"]

[ledger]
primary = "memory"
[ledger.implementations.memory]
"#
		.to_string()
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_HOST", "localhost");
		std::env::set_var("TEST_PORT", "5432");

		let input = "host = \"${TEST_HOST}:${TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("TEST_HOST");
		std::env::remove_var("TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_VAR"));
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_TELLER_ID", "env-teller");

		let config_str = base_config().replace("test-teller", "${TEST_TELLER_ID}");
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.teller.id, "env-teller");

		std::env::remove_var("TEST_TELLER_ID");
	}

	#[test]
	fn test_parses_addresses_and_defaults() {
		let config: Config = base_config().parse().unwrap();
		assert_eq!(config.domain.name, "Teller");
		assert_eq!(config.domain.version, "1");
		assert_eq!(config.events.capacity, 1000);
		assert_eq!(config.signers.initial.len(), 1);
		assert_ne!(config.controller.address, Address::ZERO);
		assert!(config.api.is_none());
	}

	#[test]
	fn test_api_section_defaults() {
		let config_str = format!("{}\n[api]\nenabled = true\n", base_config());
		let config: Config = config_str.parse().unwrap();
		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 3000);
		assert_eq!(api.timeout_seconds, 30);
	}

	#[test]
	fn test_zero_controller_rejected() {
		let config_str = base_config().replace(
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
			"0x0000000000000000000000000000000000000000",
		);
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Controller address"));
	}

	#[test]
	fn test_zero_signer_rejected() {
		let config_str = base_config().replace(
			"0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
			"0x0000000000000000000000000000000000000000",
		);
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("zero address"));
	}

	#[test]
	fn test_unknown_primary_ledger_rejected() {
		let config_str = base_config().replace("primary = \"memory\"", "primary = \"redis\"");
		let result = Config::from_str(&config_str);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary ledger 'redis' not found"));
	}

	#[test]
	fn test_invalid_address_rejected() {
		let config_str = base_config().replace(
			"0x5FbDB2315678afecb367f032d93F642f64180aa3",
			"not-an-address",
		);
		let result = Config::from_str(&config_str);
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(base_config().as_bytes()).unwrap();

		let config = Config::from_file(file.path().to_str().unwrap())
			.await
			.unwrap();
		assert_eq!(config.teller.id, "test-teller");
	}

	#[tokio::test]
	async fn test_from_missing_file() {
		let result = Config::from_file("/nonexistent/teller.toml").await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
