//! Time source abstraction for the escrow engine.
//!
//! Every operation reads the clock exactly once and evaluates all
//! expiration checks against that single value. Tests substitute a
//! manually driven clock to pin boundary behavior.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current UNIX timestamp in seconds.
pub trait Clock: Send + Sync {
	/// Returns the current time as seconds since the UNIX epoch.
	fn now(&self) -> u64;
}

/// Wall-clock time source used in production.
///
/// A host clock reading before the UNIX epoch clamps to zero.
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> u64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or(0)
	}
}

/// Manually driven clock for deterministic tests.
pub struct ManualClock {
	seconds: AtomicU64,
}

impl ManualClock {
	pub fn new(seconds: u64) -> Self {
		Self {
			seconds: AtomicU64::new(seconds),
		}
	}

	pub fn set(&self, seconds: u64) {
		self.seconds.store(seconds, Ordering::SeqCst);
	}

	pub fn advance(&self, seconds: u64) {
		self.seconds.fetch_add(seconds, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> u64 {
		self.seconds.load(Ordering::SeqCst)
	}
}
