//! Cloneable façade for driving a newsletter cell.
//!
//! [`NewsletterCellHandle`] hides channel plumbing: inputs are forwarded to the
//! toggle worker in call order, outputs are read from the event bus.
use account_core::{Newsletter, SubscriptionToggle};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{CellError, Result};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{CellSnapshot, Command};

/// Client-facing handle to a running cell.
#[derive(Clone)]
pub struct NewsletterCellHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl NewsletterCellHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| CellError::CommandChannelClosed)
    }

    /// The view is ready; starts the initial user fetch. Later calls are ignored.
    pub async fn on_ready(&self) -> Result<()> {
        self.send(Command::Ready).await
    }

    /// Declare which newsletter this cell controls.
    pub async fn set_topic(&self, topic: Newsletter) -> Result<()> {
        self.send(Command::SetTopic(topic)).await
    }

    /// The individual newsletter switch was flipped.
    pub async fn on_topic_toggled(&self, is_on: bool) -> Result<()> {
        self.send(Command::TopicToggled { is_on }).await
    }

    /// The "all newsletters" switch was flipped.
    pub async fn on_all_toggled(&self, is_on: bool) -> Result<()> {
        self.send(Command::Toggle(SubscriptionToggle::all(is_on)))
            .await
    }

    /// Read-only view of the worker state after all previously sent inputs
    /// have been processed.
    pub async fn snapshot(&self) -> Result<CellSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::QueryState { reply: reply_tx }).await?;

        reply_rx.await.map_err(CellError::ReplyChannelClosed)
    }

    /// Subscribe to one output.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use settings_runtime::{Event, Topic};
    ///
    /// let mut errors = handle.subscribe(Topic::SaveError);
    /// while let Ok(Event::SaveError(message)) = errors.recv().await {
    ///     show_alert(&message);
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }
}
