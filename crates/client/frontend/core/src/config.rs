//! Frontend configuration structures and loaders.
//!
//! UI-specific settings shared across frontend implementations.

use std::env;

use settings_runtime::Event;

/// Frontend-specific configuration.
#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
}

impl FrontendConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SETTINGS_MESSAGE_CAPACITY` - Notice log capacity (default: 32)
    /// - `SHOW_OPT_IN_PROMPTS` - Log opt-in notices (default: true)
    /// - `SHOW_SAVE_ERRORS` - Log save failures (default: true)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("SETTINGS_MESSAGE_CAPACITY") {
            config.messages.capacity = capacity.max(1);
        }
        if let Some(show) = read_env_bool("SHOW_OPT_IN_PROMPTS") {
            config.messages.visibility.show_opt_in_prompts = show;
        }
        if let Some(show) = read_env_bool("SHOW_SAVE_ERRORS") {
            config.messages.visibility.show_save_errors = show;
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
    pub visibility: NoticeVisibility,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            visibility: NoticeVisibility::default(),
        }
    }
}

/// Controls which cell outputs produce entries in the notice log.
#[derive(Clone, Debug)]
pub struct NoticeVisibility {
    pub show_opt_in_prompts: bool,
    pub show_save_errors: bool,
}

impl Default for NoticeVisibility {
    fn default() -> Self {
        Self {
            show_opt_in_prompts: true,
            show_save_errors: true,
        }
    }
}

impl NoticeVisibility {
    /// Returns true if `event` should be written to the notice log.
    pub fn should_show(&self, event: &Event) -> bool {
        match event {
            Event::OptInPrompt(_) => self.show_opt_in_prompts,
            Event::SaveError(_) => self.show_save_errors,
            // Rendered in place, never logged.
            Event::SwitchState(_) | Event::CurrentUser(_) => false,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
