//! In-memory [`ApiService`] used by the terminal client and by tests.
//!
//! Stores one server-side user and lets callers script failures and latency
//! for upcoming calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use account_core::User;
use async_trait::async_trait;
use tracing::debug;

use crate::traits::{ApiError, ApiService};

#[derive(Default)]
struct ServerState {
    user: Option<User>,
    latency: Duration,
    fetch_failures: VecDeque<ApiError>,
    update_failures: VecDeque<ApiError>,
    update_delays: VecDeque<Duration>,
    fetch_calls: usize,
    updates: Vec<User>,
}

/// Cloneable in-memory account server. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryApiService {
    state: Arc<Mutex<ServerState>>,
}

impl InMemoryApiService {
    /// Server with `user` signed in.
    pub fn new(user: User) -> Self {
        Self::with_user(Some(user))
    }

    /// Server with nobody signed in; every call fails with [`ApiError::NotSignedIn`].
    pub fn signed_out() -> Self {
        Self::with_user(None)
    }

    fn with_user(user: Option<User>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState {
                user,
                ..ServerState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Base latency applied to every call.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Fail the next `fetch_user_self` call with `error`.
    pub fn fail_next_fetch(&self, error: ApiError) {
        self.lock().fetch_failures.push_back(error);
    }

    /// Fail the next `update_user_self` call with `error`.
    pub fn fail_next_update(&self, error: ApiError) {
        self.lock().update_failures.push_back(error);
    }

    /// Add `delay` on top of the base latency for the next `update_user_self` call.
    pub fn delay_next_update(&self, delay: Duration) {
        self.lock().update_delays.push_back(delay);
    }

    /// The user as currently stored server-side.
    pub fn stored_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    /// Every record submitted through `update_user_self`, in call order.
    pub fn updates(&self) -> Vec<User> {
        self.lock().updates.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_calls
    }
}

#[async_trait]
impl ApiService for InMemoryApiService {
    async fn fetch_user_self(&self) -> Result<User, ApiError> {
        let (latency, outcome) = {
            let mut state = self.lock();
            state.fetch_calls += 1;
            let outcome = match state.fetch_failures.pop_front() {
                Some(error) => Err(error),
                None => state.user.clone().ok_or(ApiError::NotSignedIn),
            };
            (state.latency, outcome)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        debug!(ok = outcome.is_ok(), "fetch_user_self");
        outcome
    }

    async fn update_user_self(&self, user: User) -> Result<User, ApiError> {
        // Failures and delays are claimed at call time so concurrent calls
        // consume scripted behaviour in submission order.
        let (delay, failure) = {
            let mut state = self.lock();
            state.updates.push(user.clone());
            let delay = state.latency + state.update_delays.pop_front().unwrap_or_default();
            (delay, state.update_failures.pop_front())
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if let Some(error) = failure {
            debug!(%error, "update_user_self failed");
            return Err(error);
        }
        match state.user.as_ref() {
            Some(current) if current.id == user.id => {
                state.user = Some(user.clone());
                debug!(user = ?user.id, "update_user_self stored");
                Ok(user)
            }
            Some(_) => Err(ApiError::message("User does not match signed-in account.")),
            None => Err(ApiError::NotSignedIn),
        }
    }
}
