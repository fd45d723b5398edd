//! Cross-frontend primitives for presenting the settings screen.
//!
//! Houses the notice log, event handling, and view-model types that the
//! terminal client and future graphical clients can reuse.
pub mod config;
pub mod event;
pub mod message;
pub mod view_model;

pub use config::{FrontendConfig, MessageConfig, NoticeVisibility};
pub use event::{EventConsumer, EventImpact, SettingsEventConsumer};
pub use message::{MessageEntry, MessageLevel, MessageLog};
pub use view_model::{NewsletterRow, PopularProjectsHeader, SettingsViewModel};
