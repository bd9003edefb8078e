//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait pluggable backends implement to
//! register themselves with their configuration name and factory function.

/// Base trait for implementation registries.
///
/// Each implementation module (currently the balance-ledger backends) must
/// provide a Registry struct implementing this trait, declaring the name
/// used in configuration files and a factory for building instances.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example
	/// "memory" for `ledger.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
