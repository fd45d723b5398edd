//! Newsletter cell owner and builder.
//!
//! The cell owns the toggle worker, wires up the command channel and the event
//! bus, and hands out cloneable handles to presentation code.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{CellError, NewsletterCellHandle, Result};
use crate::config::CellConfig;
use crate::env::SessionEnv;
use crate::events::EventBus;
use crate::workers::{Command, ToggleWorker};

/// One newsletter row of the settings screen.
///
/// Create one per screen appearance; nothing it holds outlives it.
pub struct NewsletterCell {
    handle: NewsletterCellHandle,
    worker_handle: JoinHandle<()>,
}

impl NewsletterCell {
    /// Create a new cell builder
    pub fn builder() -> NewsletterCellBuilder {
        NewsletterCellBuilder::new()
    }

    /// Get a cloneable handle to this cell
    pub fn handle(&self) -> NewsletterCellHandle {
        self.handle.clone()
    }

    /// Tear the cell down.
    ///
    /// The worker exits once every outstanding [`NewsletterCellHandle`] clone
    /// is dropped; pending remote calls are aborted.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle.await.map_err(CellError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`NewsletterCell`].
pub struct NewsletterCellBuilder {
    config: CellConfig,
    env: Option<SessionEnv>,
}

impl NewsletterCellBuilder {
    fn new() -> Self {
        Self {
            config: CellConfig::default(),
            env: None,
        }
    }

    /// Override cell configuration
    pub fn config(mut self, config: CellConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required session environment
    pub fn env(mut self, env: SessionEnv) -> Self {
        self.env = Some(env);
        self
    }

    /// Build the cell and spawn its worker. Must run inside a tokio runtime.
    pub async fn build(self) -> Result<NewsletterCell> {
        let env = self.env.ok_or(CellError::MissingEnvironment)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = NewsletterCellHandle::new(command_tx, event_bus.clone());

        let worker = ToggleWorker::new(env, self.config, command_rx, event_bus);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        info!("newsletter cell started");

        Ok(NewsletterCell {
            handle,
            worker_handle,
        })
    }
}
