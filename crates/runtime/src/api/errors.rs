//! Error types surfaced by the cell API.
//!
//! Only plumbing failures live here. Remote update failures are not errors
//! from the caller's point of view: they are reported as
//! [`Event::SaveError`](crate::events::Event::SaveError) and rolled back.
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, CellError>;

#[derive(Debug, Error)]
pub enum CellError {
    #[error("toggle worker command channel closed")]
    CommandChannelClosed,

    #[error("toggle worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("toggle worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("newsletter cell requires a session environment before building")]
    MissingEnvironment,
}
