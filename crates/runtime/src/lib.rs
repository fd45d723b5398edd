//! Runtime for the newsletter settings cell.
//!
//! A [`NewsletterCell`] owns a single background worker that holds the
//! authoritative current-user state for one settings row. Presentation layers
//! drive it through a cloneable [`NewsletterCellHandle`] and observe it through
//! the topic-based [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`cell`] hosts the owner and builder
//! - [`api`] exposes the handle and error types clients interact with
//! - [`events`] provides the topic-based event bus for the cell outputs
//! - [`env`] and [`config`] carry the injected session and tunables
//! - `workers` keeps the toggle worker internal to the crate
pub mod api;
pub mod cell;
pub mod config;
pub mod env;
pub mod events;

mod workers;

pub use api::{CellError, NewsletterCellHandle, Result};
pub use cell::{NewsletterCell, NewsletterCellBuilder};
pub use config::{CellConfig, DEFAULT_OPT_IN_COUNTRY_CODE, DEFAULT_SAVE_ERROR_MESSAGE};
pub use env::SessionEnv;
pub use events::{Event, EventBus, Topic};
pub use workers::{CellPhase, CellSnapshot};
