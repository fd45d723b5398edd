//! Worker tasks that back a newsletter cell.
//!
//! The toggle worker owns all cell state; remote calls run as short-lived
//! tasks that report back into its inbox.

mod toggle;

pub use toggle::{CellPhase, CellSnapshot, Command, ToggleWorker};
