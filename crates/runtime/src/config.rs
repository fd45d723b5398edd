//! Cell configuration structures and loaders.
use std::env;
use std::time::Duration;

/// Region that requires an explicit opt-in notice when subscribing.
pub const DEFAULT_OPT_IN_COUNTRY_CODE: &str = "DE";

/// Shown when a save fails and the server gave no message.
pub const DEFAULT_SAVE_ERROR_MESSAGE: &str = "Unable to save.";

/// Tunables for a newsletter cell and its worker.
#[derive(Debug, Clone)]
pub struct CellConfig {
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    /// Delay applied before every remote update call.
    pub api_delay: Duration,
    /// Country code for which turning a newsletter on shows the opt-in notice.
    pub opt_in_country_code: String,
    pub fallback_error_message: String,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 16,
            event_buffer_size: 64,
            api_delay: Duration::ZERO,
            opt_in_country_code: DEFAULT_OPT_IN_COUNTRY_CODE.to_owned(),
            fallback_error_message: DEFAULT_SAVE_ERROR_MESSAGE.to_owned(),
        }
    }
}

impl CellConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `NEWSLETTER_COMMAND_BUFFER` - Worker inbox size (default: 16)
    /// - `NEWSLETTER_EVENT_BUFFER` - Per-topic event buffer (default: 64)
    /// - `NEWSLETTER_API_DELAY_MS` - Delay before each update call (default: 0)
    /// - `NEWSLETTER_OPT_IN_COUNTRY` - Opt-in region code (default: DE)
    /// - `NEWSLETTER_SAVE_ERROR_MESSAGE` - Fallback save error text
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = read_env::<usize>("NEWSLETTER_COMMAND_BUFFER") {
            config.command_buffer_size = size.max(1);
        }
        if let Some(size) = read_env::<usize>("NEWSLETTER_EVENT_BUFFER") {
            config.event_buffer_size = size.max(1);
        }
        if let Some(millis) = read_env::<u64>("NEWSLETTER_API_DELAY_MS") {
            config.api_delay = Duration::from_millis(millis);
        }
        if let Some(code) = read_env::<String>("NEWSLETTER_OPT_IN_COUNTRY") {
            config.opt_in_country_code = code.trim().to_ascii_uppercase();
        }
        if let Some(message) = read_env::<String>("NEWSLETTER_SAVE_ERROR_MESSAGE")
            && !message.trim().is_empty()
        {
            config.fallback_error_message = message;
        }

        config
    }

    pub fn with_api_delay(mut self, delay: Duration) -> Self {
        self.api_delay = delay;
        self
    }

    pub fn with_opt_in_country_code(mut self, code: impl Into<String>) -> Self {
        self.opt_in_country_code = code.into();
        self
    }

    pub fn with_fallback_error_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_error_message = message.into();
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok().and_then(|value| value.parse().ok())
}
