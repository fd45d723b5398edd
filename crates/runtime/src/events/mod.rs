//! Topic-based event bus for cell outputs.
//!
//! Every output of the newsletter cell is published to its own topic, so a
//! presentation layer can subscribe only to what it renders.

mod bus;

pub use bus::{Event, EventBus, Topic};
