//! Account API abstraction for the settings client.
//!
//! The settings runtime never talks to the network directly; it consumes the
//! narrow [`ApiService`] contract defined here.
//!
//! # Layout
//!
//! ```text
//! ApiService (trait)
//!   ├── fetch_user_self   -> Result<User, ApiError>
//!   └── update_user_self  -> Result<User, ApiError>
//!
//! InMemoryApiService (reference implementation, fault + latency injection)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use client_api_core::ApiService;
//!
//! async fn opt_in(api: &dyn ApiService) -> Result<(), ApiError> {
//!     let user = api.fetch_user_self().await?;
//!     api.update_user_self(user.with_newsletter(Newsletter::Weekly, true)).await?;
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod traits;

pub use memory::InMemoryApiService;
pub use traits::{ApiError, ApiService, ErrorEnvelope};
