//! Terminal client configuration.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use account_core::{Newsletter, NewsletterSubscriptions, User};
use anyhow::{Context, Result};
use client_frontend_core::FrontendConfig;
use settings_runtime::CellConfig;

/// Configuration required to run the terminal settings client.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub cell: CellConfig,
    pub frontend: FrontendConfig,
    pub session_id: Option<String>,
    pub country_code: Option<String>,
    /// JSON file with the user the in-memory server starts with.
    pub seed_user_path: Option<PathBuf>,
    pub topic: Newsletter,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            cell: CellConfig::default(),
            frontend: FrontendConfig::default(),
            session_id: None,
            country_code: None,
            seed_user_path: None,
            topic: Newsletter::Weekly,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables (plus those read by [`CellConfig::from_env`] and
    /// [`FrontendConfig::from_env`]):
    /// - `SETTINGS_SESSION_ID` - Log session identifier (default: timestamp)
    /// - `SETTINGS_COUNTRY_CODE` - Session region, e.g. `DE`
    /// - `SETTINGS_SEED_USER` - Path to a JSON user record
    /// - `SETTINGS_TOPIC` - Newsletter controlled at start (default: weekly)
    pub fn from_env() -> Self {
        let mut config = Self {
            cell: CellConfig::from_env(),
            frontend: FrontendConfig::from_env(),
            ..Self::default()
        };

        config.session_id = env::var("SETTINGS_SESSION_ID").ok();
        config.country_code = env::var("SETTINGS_COUNTRY_CODE").ok();
        config.seed_user_path = env::var("SETTINGS_SEED_USER").ok().map(PathBuf::from);

        if let Ok(topic) = env::var("SETTINGS_TOPIC") {
            match Newsletter::from_str(topic.trim()) {
                Ok(topic) => config.topic = topic,
                Err(_) => tracing::warn!(%topic, "unknown SETTINGS_TOPIC; using default"),
            }
        }

        config
    }

    /// The user the in-memory server is seeded with.
    pub fn load_seed_user(&self) -> Result<User> {
        let Some(path) = &self.seed_user_path else {
            return Ok(default_user());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed user {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing seed user {}", path.display()))
    }
}

fn default_user() -> User {
    User::new(1, "Backer").with_subscriptions(NewsletterSubscriptions::all(false))
}
