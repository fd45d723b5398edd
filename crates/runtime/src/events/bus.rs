//! Topic-based event bus implementation.

use std::sync::Arc;

use account_core::User;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing, one per cell output.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Legal opt-in notice to display.
    OptInPrompt,
    /// Switch state to render.
    SwitchState,
    /// Failed save, human-readable.
    SaveError,
    /// Authoritative current user.
    CurrentUser,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::OptInPrompt,
        Topic::SwitchState,
        Topic::SaveError,
        Topic::CurrentUser,
    ];

    const fn index(self) -> usize {
        match self {
            Topic::OptInPrompt => 0,
            Topic::SwitchState => 1,
            Topic::SaveError => 2,
            Topic::CurrentUser => 3,
        }
    }
}

/// Outputs of a newsletter cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Display name of the newsletter that needs an opt-in notice.
    OptInPrompt(String),
    /// Subscription state of the controlled topic; `None` when unknown.
    SwitchState(Option<bool>),
    /// Message explaining why a save failed.
    SaveError(String),
    CurrentUser(User),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::OptInPrompt(_) => Topic::OptInPrompt,
            Event::SwitchState(_) => Topic::SwitchState,
            Event::SaveError(_) => Topic::SaveError,
            Event::CurrentUser(_) => Topic::CurrentUser,
        }
    }
}

/// Topic-based event bus
///
/// Channels for every topic are created up front, so subscribing never fails.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<[broadcast::Sender<Event>; 4]>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(std::array::from_fn(|_| broadcast::channel(capacity).0)),
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        &self.channels[topic.index()]
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
