//! Event bus for broadcasting state-change notifications.
//!
//! The registry and the claim engine publish every state transition here;
//! the service's logging task and any number of other consumers subscribe
//! independently.

use crate::TellerEvent;
use tokio::sync::broadcast;

/// Broadcast bus carrying [`TellerEvent`]s to all current subscribers.
///
/// Publishing never blocks. Subscribers that fall behind the channel
/// capacity miss the oldest events, and publishing with no subscribers at
/// all returns an error callers are free to ignore.
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<TellerEvent>,
}

impl EventBus {
	/// Creates a new event bus with the given channel capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns the number of subscribers the event reached.
	pub fn publish(
		&self,
		event: TellerEvent,
	) -> Result<usize, broadcast::error::SendError<TellerEvent>> {
		self.sender.send(event)
	}

	/// Creates a new subscription receiving events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<TellerEvent> {
		self.sender.subscribe()
	}
}
