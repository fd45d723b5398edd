//! Public cell API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the worker and event plumbing can stay internal.

pub mod errors;
pub mod handle;

pub use errors::{CellError, Result};
pub use handle::NewsletterCellHandle;
