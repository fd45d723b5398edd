//! Utilities for reacting to cell events inside UI layers.
use settings_runtime::Event;

use crate::config::FrontendConfig;
use crate::message::{MessageEntry, MessageLevel, MessageLog};
use crate::view_model::SettingsViewModel;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact;
    fn message_log(&self) -> &MessageLog;
    fn message_log_mut(&mut self) -> &mut MessageLog;
    fn take_message_log(self) -> MessageLog
    where
        Self: Sized;
}

/// Folds cell events into a [`SettingsViewModel`] and a notice log.
#[derive(Clone, Debug)]
pub struct SettingsEventConsumer {
    view_model: SettingsViewModel,
    messages: MessageLog,
    config: FrontendConfig,
}

impl SettingsEventConsumer {
    pub fn new(view_model: SettingsViewModel, config: FrontendConfig) -> Self {
        Self {
            view_model,
            messages: MessageLog::new(config.messages.capacity),
            config,
        }
    }

    pub fn view_model(&self) -> &SettingsViewModel {
        &self.view_model
    }

    pub fn view_model_mut(&mut self) -> &mut SettingsViewModel {
        &mut self.view_model
    }

    fn notice_for(event: &Event) -> Option<MessageEntry> {
        match event {
            Event::OptInPrompt(name) => Some(MessageEntry::new(
                format!("Check your inbox to confirm your subscription to {name}."),
                MessageLevel::Info,
            )),
            Event::SaveError(message) => Some(MessageEntry::new(message.clone(), MessageLevel::Error)),
            Event::SwitchState(_) | Event::CurrentUser(_) => None,
        }
    }
}

impl EventConsumer for SettingsEventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        let mut impact = if self.view_model.apply(event) {
            EventImpact::redraw()
        } else {
            EventImpact::none()
        };

        if self.config.messages.visibility.should_show(event)
            && let Some(entry) = Self::notice_for(event)
        {
            tracing::debug!(level = ?entry.level, "notice: {}", entry.text);
            self.messages.push(entry);
            impact = impact.combine(EventImpact::redraw());
        }

        impact
    }

    fn message_log(&self) -> &MessageLog {
        &self.messages
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.messages
    }

    fn take_message_log(self) -> MessageLog {
        self.messages
    }
}
