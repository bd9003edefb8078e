//! Main entry point for the teller service.
//!
//! This binary wires the escrow engine, the signer registry, and the
//! configured ledger backend together, then serves the HTTP API until the
//! process is interrupted. Every event published on the teller's bus is
//! mirrored into the log.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use teller_config::Config;
use teller_core::{Teller, TellerBuilder, TellerError};
use teller_types::{truncate_id, EscrowEvent, RegistryEvent, TellerEvent};
use tokio::sync::broadcast::error::RecvError;

mod apis;
mod server;

/// Command-line arguments for the teller service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the teller service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the teller with all registered ledger implementations
/// 5. Serves the API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started teller");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.teller.id);

	// Build the teller with every registered ledger implementation
	let teller = Arc::new(build_teller(config)?);

	let api_config = teller.config().api.clone().filter(|api| api.enabled);

	match api_config {
		Some(api_config) => {
			let api_teller = Arc::clone(&teller);

			// Serve the API and mirror bus events concurrently
			let event_task = log_events(Arc::clone(&teller));
			let api_task = server::start_server(api_config, api_teller);

			tokio::select! {
				_ = event_task => {
					tracing::info!("Event stream closed");
				}
				result = api_task => {
					tracing::info!("API server finished");
					result?;
				}
			}
		},
		None => {
			tracing::info!("API server disabled, streaming events only");
			log_events(teller).await;
		},
	}

	tracing::info!("Stopped teller");
	Ok(())
}

/// Builds a teller from configuration, registering every available ledger
/// implementation with the builder.
fn build_teller(config: Config) -> Result<Teller, TellerError> {
	let mut builder = TellerBuilder::new(config);
	for (name, factory) in teller_ledger::get_all_implementations() {
		builder = builder.with_ledger_factory(name, factory);
	}
	builder.build()
}

/// Mirrors every event published on the teller's bus into the log.
///
/// The engine and the registry already log their operations at info, so
/// the bus copies log at debug.
async fn log_events(teller: Arc<Teller>) {
	let mut events = teller.event_bus().subscribe();
	loop {
		match events.recv().await {
			Ok(TellerEvent::Registry(event)) => log_registry_event(event),
			Ok(TellerEvent::Escrow(event)) => log_escrow_event(event),
			Err(RecvError::Lagged(missed)) => {
				tracing::warn!(missed, "Event stream lagged behind the bus");
			},
			Err(RecvError::Closed) => break,
		}
	}
}

fn log_registry_event(event: RegistryEvent) {
	match event {
		RegistryEvent::SignerUpdated { signer, active } => {
			tracing::debug!(signer = %signer, active, "Signer updated");
		},
		RegistryEvent::ControllerTransferStarted { current, pending } => {
			tracing::debug!(current = %current, pending = %pending, "Controller handover proposed");
		},
		RegistryEvent::ControllerTransferred {
			previous,
			new_controller,
		} => {
			tracing::debug!(
				previous = %previous,
				new_controller = %new_controller,
				"Controller handover accepted"
			);
		},
	}
}

fn log_escrow_event(event: EscrowEvent) {
	match event {
		EscrowEvent::Deposited {
			giver,
			asset,
			transfer_id,
			amount,
			..
		} => {
			tracing::debug!(
				giver = %giver,
				asset = %asset,
				transfer_id = %truncate_id(&transfer_id.to_string()),
				amount = %amount,
				"Deposited"
			);
		},
		EscrowEvent::Claimed {
			giver,
			transfer_id,
			amount,
			recipient,
			authorizer,
			..
		} => {
			tracing::debug!(
				giver = %giver,
				transfer_id = %truncate_id(&transfer_id.to_string()),
				amount = %amount,
				recipient = %recipient,
				authorizer = %authorizer,
				"Claimed"
			);
		},
		EscrowEvent::Cancelled {
			giver, transfer_id, ..
		} => {
			tracing::debug!(
				giver = %giver,
				transfer_id = %truncate_id(&transfer_id.to_string()),
				"Cancelled"
			);
		},
		EscrowEvent::Refunded {
			giver, transfer_id, ..
		} => {
			tracing::debug!(
				giver = %giver,
				transfer_id = %truncate_id(&transfer_id.to_string()),
				"Refunded"
			);
		},
	}
}
