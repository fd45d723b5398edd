//! Account domain model for the settings screen.
//!
//! Holds the user record, the per-topic newsletter subscription flags, and the
//! toggle type used to derive an updated user locally before it is persisted.
pub mod newsletter;
pub mod toggle;
pub mod user;

pub use newsletter::Newsletter;
pub use toggle::{SubscriptionToggle, ToggleTarget};
pub use user::{NewsletterSubscriptions, User, UserId};
