//! Session environment injected into a cell.
use std::sync::Arc;

use account_core::User;
use client_api_core::ApiService;

/// Everything a cell reads from the surrounding app session.
///
/// Passed to [`NewsletterCellBuilder::env`](crate::NewsletterCellBuilder::env)
/// instead of being looked up globally.
#[derive(Clone)]
pub struct SessionEnv {
    pub api: Arc<dyn ApiService>,
    /// User cached by the session, if any. Shown until the fetch completes and
    /// kept when the fetch fails.
    pub current_user: Option<User>,
    /// Region of the signed-in session, e.g. `"DE"`.
    pub country_code: Option<String>,
}

impl SessionEnv {
    pub fn new(api: Arc<dyn ApiService>) -> Self {
        Self {
            api,
            current_user: None,
            country_code: None,
        }
    }

    pub fn with_current_user(mut self, user: Option<User>) -> Self {
        self.current_user = user;
        self
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    /// Whether the session's region is exactly `code`.
    pub fn is_in_region(&self, code: &str) -> bool {
        self.country_code.as_deref() == Some(code)
    }
}

impl std::fmt::Debug for SessionEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEnv")
            .field("current_user", &self.current_user.as_ref().map(|u| u.id))
            .field("country_code", &self.country_code)
            .finish_non_exhaustive()
    }
}
