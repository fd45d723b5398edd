//! API contract and error types.

use account_core::User;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Types
// ============================================================================

/// Error body returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable messages, most relevant first. May be empty.
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub http_code: Option<u16>,
}

impl ErrorEnvelope {
    pub fn new(messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            error_messages: messages.into_iter().map(Into::into).collect(),
            http_code: None,
        }
    }

    pub fn with_http_code(mut self, code: u16) -> Self {
        self.http_code = Some(code);
        self
    }
}

/// Failures surfaced by an [`ApiService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("server rejected request (http {code:?}): {messages:?}", code = .0.http_code, messages = .0.error_messages)]
    Server(ErrorEnvelope),

    #[error("network error: {0}")]
    Network(String),

    #[error("no user is signed in")]
    NotSignedIn,
}

impl ApiError {
    /// Convenience for a server error carrying a single message.
    pub fn message(message: impl Into<String>) -> Self {
        ApiError::Server(ErrorEnvelope::new([message]))
    }

    /// Human-readable messages carried by the error; empty for transport failures.
    pub fn messages(&self) -> &[String] {
        match self {
            ApiError::Server(envelope) => &envelope.error_messages,
            ApiError::Network(_) | ApiError::NotSignedIn => &[],
        }
    }

    pub fn first_message(&self) -> Option<&str> {
        self.messages().first().map(String::as_str)
    }
}

// ============================================================================
// Service Trait
// ============================================================================

/// Remote account operations used by the settings screen.
#[async_trait]
pub trait ApiService: Send + Sync {
    /// Fetch the signed-in user's current record.
    async fn fetch_user_self(&self) -> Result<User, ApiError>;

    /// Persist `user` and return the record as stored by the server.
    async fn update_user_self(&self, user: User) -> Result<User, ApiError>;
}
