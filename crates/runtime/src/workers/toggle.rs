//! Toggle worker that owns the authoritative current user of a cell.
//!
//! Receives commands from [`NewsletterCellHandle`](crate::NewsletterCellHandle),
//! applies toggles optimistically, submits them through the injected
//! [`ApiService`](client_api_core::ApiService), and publishes every output to
//! the [`EventBus`].
//!
//! Only the most recent submission may commit: each update carries a version
//! number and completions for older versions are dropped. The previous task is
//! also aborted, but a completion can already be queued when that happens.

use std::sync::Arc;

use account_core::{Newsletter, SubscriptionToggle, User};
use client_api_core::ApiError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CellConfig;
use crate::env::SessionEnv;
use crate::events::{Event, EventBus};

/// Commands that can be sent to the toggle worker
pub enum Command {
    /// View is ready; fetch the user once.
    Ready,
    /// Set or replace the controlled newsletter.
    SetTopic(Newsletter),
    /// Individual switch flipped; the topic is resolved by the worker.
    TopicToggled { is_on: bool },
    /// Apply a toggle that does not depend on the controlled topic.
    Toggle(SubscriptionToggle),
    /// Query the current cell state (read-only).
    QueryState { reply: oneshot::Sender<CellSnapshot> },
}

/// Results of remote calls, fed back into the worker loop.
enum Completion {
    Fetched(Result<User, ApiError>),
    Updated {
        version: u64,
        result: Result<User, ApiError>,
    },
}

/// Where the cell is in its lifecycle.
///
/// `Idle → Fetching → Fetched → (Submitting → Committed | RolledBack)*`.
/// Deriving the updated user happens synchronously between `Fetched` (or a
/// settled state) and `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPhase {
    Idle,
    Fetching,
    Fetched,
    Submitting { version: u64 },
    Committed,
    RolledBack,
}

/// Read-only view of the worker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSnapshot {
    pub topic: Option<Newsletter>,
    pub current_user: Option<User>,
    pub switch_state: Option<bool>,
    pub phase: CellPhase,
    /// Version of the most recent submission; 0 before the first toggle.
    pub latest_version: u64,
}

/// Background task that processes cell inputs and remote completions.
pub struct ToggleWorker {
    env: SessionEnv,
    config: CellConfig,
    command_rx: mpsc::Receiver<Command>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    event_bus: EventBus,

    topic: Option<Newsletter>,
    current_user: Option<User>,
    /// Value to restore if the latest submission fails. One level only.
    rollback_user: Option<User>,
    phase: CellPhase,
    ready: bool,
    latest_version: u64,

    fetch_task: Option<JoinHandle<()>>,
    update_task: Option<JoinHandle<()>>,
}

impl ToggleWorker {
    pub fn new(
        env: SessionEnv,
        config: CellConfig,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        debug!(?env, "ToggleWorker initialized");

        Self {
            env,
            config,
            command_rx,
            completion_tx,
            completion_rx,
            event_bus,
            topic: None,
            current_user: None,
            rollback_user: None,
            phase: CellPhase::Idle,
            ready: false,
            latest_version: 0,
            fetch_task: None,
            update_task: None,
        }
    }

    /// Main worker loop. Exits once every handle has been dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(done) = self.completion_rx.recv() => {
                    self.handle_completion(done);
                }
            }
        }

        self.teardown();
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Ready => self.handle_ready(),
            Command::SetTopic(topic) => {
                debug!(%topic, "topic set");
                self.topic = Some(topic);
                self.publish_switch_state();
            }
            Command::TopicToggled { is_on } => self.handle_topic_toggled(is_on),
            Command::Toggle(toggle) => self.apply_toggle(toggle),
            Command::QueryState { reply } => {
                if reply.send(self.snapshot()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Fetched(result) => self.handle_fetched(result),
            Completion::Updated { version, result } => self.handle_updated(version, result),
        }
    }

    fn handle_ready(&mut self) {
        if self.ready {
            debug!("ready signal already received; ignoring");
            return;
        }
        self.ready = true;

        if let Some(cached) = self.env.current_user.clone() {
            debug!(user = ?cached.id, "showing session user while fetching");
            self.set_current_user(cached);
        }

        let api = Arc::clone(&self.env.api);
        let completion_tx = self.completion_tx.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let result = api.fetch_user_self().await;
            if completion_tx.send(Completion::Fetched(result)).is_err() {
                debug!("toggle worker stopped before fetch completed");
            }
        }));
        self.phase = CellPhase::Fetching;
    }

    fn handle_fetched(&mut self, result: Result<User, ApiError>) {
        self.fetch_task = None;

        // Once a toggle has been derived the local record is newer than
        // anything the initial fetch can return.
        if self.latest_version > 0 {
            debug!(ok = result.is_ok(), "initial fetch settled after a toggle; ignoring");
            return;
        }

        match result {
            Ok(user) => {
                info!(user = ?user.id, "fetched current user");
                self.set_current_user(user);
                self.phase = CellPhase::Fetched;
            }
            Err(error) => {
                let cached = self.current_user.is_some();
                warn!(%error, cached, "initial user fetch failed");
                self.phase = if cached {
                    CellPhase::Fetched
                } else {
                    CellPhase::Idle
                };
            }
        }
    }

    fn handle_topic_toggled(&mut self, is_on: bool) {
        let Some(topic) = self.topic else {
            warn!(is_on, "newsletter switch toggled before a topic was set; ignoring");
            return;
        };

        if is_on && self.env.is_in_region(&self.config.opt_in_country_code) {
            self.event_bus
                .publish(Event::OptInPrompt(topic.displayable_name().to_owned()));
        }

        self.apply_toggle(SubscriptionToggle::topic(topic, is_on));
    }

    /// Derive the updated user locally, publish it, and submit it.
    fn apply_toggle(&mut self, toggle: SubscriptionToggle) {
        let Some(base) = self.current_user.clone() else {
            debug!(?toggle, "no user available yet; ignoring toggle");
            return;
        };

        let derived = toggle.apply(&base);
        self.rollback_user = Some(base);
        self.set_current_user(derived.clone());
        self.submit(derived);
    }

    fn submit(&mut self, user: User) {
        self.latest_version += 1;
        let version = self.latest_version;

        if let Some(task) = self.update_task.take() {
            debug!(version, "superseding in-flight update");
            task.abort();
        }

        let api = Arc::clone(&self.env.api);
        let completion_tx = self.completion_tx.clone();
        let delay = self.config.api_delay;
        self.update_task = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let result = api.update_user_self(user).await;
            if completion_tx
                .send(Completion::Updated { version, result })
                .is_err()
            {
                debug!(version, "toggle worker stopped before update completed");
            }
        }));
        self.phase = CellPhase::Submitting { version };
    }

    fn handle_updated(&mut self, version: u64, result: Result<User, ApiError>) {
        if version != self.latest_version {
            debug!(
                version,
                latest = self.latest_version,
                "discarding result of superseded update"
            );
            return;
        }
        self.update_task = None;

        match result {
            Ok(user) => {
                debug!(version, "update committed");
                self.rollback_user = None;
                self.set_current_user(user);
                self.phase = CellPhase::Committed;
            }
            Err(error) => {
                warn!(%error, version, "update failed; rolling back");
                let message = error
                    .first_message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| self.config.fallback_error_message.clone());
                self.event_bus.publish(Event::SaveError(message));

                if let Some(previous) = self.rollback_user.take() {
                    self.set_current_user(previous);
                }
                self.phase = CellPhase::RolledBack;
            }
        }
    }

    fn set_current_user(&mut self, user: User) {
        self.event_bus.publish(Event::CurrentUser(user.clone()));
        self.current_user = Some(user);
        self.publish_switch_state();
    }

    fn publish_switch_state(&self) {
        if let Some(state) = self.switch_state() {
            self.event_bus.publish(Event::SwitchState(state));
        }
    }

    /// `Some` once both topic and user are known; the inner value is the flag.
    fn switch_state(&self) -> Option<Option<bool>> {
        let topic = self.topic?;
        let user = self.current_user.as_ref()?;
        Some(user.is_subscribed(topic))
    }

    fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            topic: self.topic,
            current_user: self.current_user.clone(),
            switch_state: self.switch_state().flatten(),
            phase: self.phase,
            latest_version: self.latest_version,
        }
    }

    fn teardown(&mut self) {
        for task in [self.fetch_task.take(), self.update_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
        info!(phase = ?self.phase, "toggle worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_core::NewsletterSubscriptions;
    use client_api_core::InMemoryApiService;
    use tokio::sync::broadcast;

    use crate::events::Topic;

    fn subscriber() -> User {
        User::new(1, "Ada").with_subscriptions(NewsletterSubscriptions::all(false))
    }

    fn worker(country: &str) -> (ToggleWorker, mpsc::Sender<Command>, EventBus) {
        let api = Arc::new(InMemoryApiService::new(subscriber()));
        let env = SessionEnv::new(api).with_country_code(country);
        let (command_tx, command_rx) = mpsc::channel(8);
        let bus = EventBus::new();
        let worker = ToggleWorker::new(env, CellConfig::default(), command_rx, bus.clone());
        (worker, command_tx, bus)
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn weekly(user: &Option<User>) -> Option<bool> {
        user.as_ref().and_then(|u| u.is_subscribed(Newsletter::Weekly))
    }

    #[tokio::test]
    async fn stale_completion_does_not_overwrite_current_user() {
        let (mut worker, _tx, _bus) = worker("US");
        worker.handle_command(Command::SetTopic(Newsletter::Weekly));
        worker.handle_completion(Completion::Fetched(Ok(subscriber())));

        worker.handle_command(Command::TopicToggled { is_on: true });
        worker.handle_command(Command::TopicToggled { is_on: false });
        assert_eq!(worker.latest_version, 2);

        // First call resolves late with the "on" record.
        let late = subscriber().with_newsletter(Newsletter::Weekly, true);
        worker.handle_completion(Completion::Updated {
            version: 1,
            result: Ok(late),
        });
        assert_eq!(weekly(&worker.current_user), Some(false));
        assert_eq!(worker.phase, CellPhase::Submitting { version: 2 });

        worker.handle_completion(Completion::Updated {
            version: 2,
            result: Ok(subscriber()),
        });
        assert_eq!(worker.phase, CellPhase::Committed);
        assert_eq!(worker.snapshot().switch_state, Some(false));
    }

    #[tokio::test]
    async fn failure_restores_value_before_latest_toggle() {
        let (mut worker, _tx, bus) = worker("US");
        worker.handle_command(Command::SetTopic(Newsletter::Weekly));
        worker.handle_completion(Completion::Fetched(Ok(subscriber())));
        worker.handle_command(Command::TopicToggled { is_on: true });
        let before_second = worker.current_user.clone();
        worker.handle_command(Command::Toggle(SubscriptionToggle::all(false)));

        let mut errors = bus.subscribe(Topic::SaveError);
        worker.handle_completion(Completion::Updated {
            version: 2,
            result: Err(ApiError::message("server error")),
        });

        assert_eq!(worker.current_user, before_second);
        assert_eq!(worker.phase, CellPhase::RolledBack);
        assert_eq!(drain(&mut errors), vec![Event::SaveError("server error".into())]);
    }

    #[tokio::test]
    async fn fetch_after_toggle_is_ignored() {
        let (mut worker, _tx, _bus) = worker("US");
        worker.env.current_user = Some(subscriber());
        worker.handle_command(Command::Ready);
        worker.handle_command(Command::Toggle(SubscriptionToggle::all(true)));

        worker.handle_completion(Completion::Fetched(Ok(subscriber())));

        assert_eq!(
            worker.current_user.as_ref().map(|u| u.newsletters),
            Some(NewsletterSubscriptions::all(true))
        );
    }

    #[tokio::test]
    async fn toggle_without_topic_or_user_is_ignored() {
        let (mut worker, _tx, bus) = worker("DE");
        let mut prompts = bus.subscribe(Topic::OptInPrompt);

        worker.handle_command(Command::TopicToggled { is_on: true });
        assert!(drain(&mut prompts).is_empty());

        worker.handle_command(Command::SetTopic(Newsletter::Arts));
        worker.handle_command(Command::TopicToggled { is_on: true });

        // Prompt policy does not depend on the user being loaded.
        assert_eq!(
            drain(&mut prompts),
            vec![Event::OptInPrompt("Kickstarter Arts".into())]
        );
        assert_eq!(worker.latest_version, 0);
        assert!(worker.current_user.is_none());
    }

    #[tokio::test]
    async fn switch_state_follows_topic_changes() {
        let (mut worker, _tx, bus) = worker("US");
        let mut switch = bus.subscribe(Topic::SwitchState);
        let user = subscriber().with_newsletter(Newsletter::Games, true);

        worker.handle_completion(Completion::Fetched(Ok(user)));
        assert!(drain(&mut switch).is_empty());

        worker.handle_command(Command::SetTopic(Newsletter::Games));
        worker.handle_command(Command::SetTopic(Newsletter::Promo));

        assert_eq!(
            drain(&mut switch),
            vec![Event::SwitchState(Some(true)), Event::SwitchState(Some(false))]
        );
    }
}
