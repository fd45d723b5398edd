//! Plain-text rendering of the settings view model.
use std::fmt::{self, Write};

use client_frontend_core::{MessageLevel, MessageLog, SettingsViewModel};

const NOTICE_LIMIT: usize = 3;

fn switch_label(state: Option<bool>) -> &'static str {
    match state {
        Some(true) => "[on ]",
        Some(false) => "[off]",
        None => "[ ? ]",
    }
}

pub fn render(view_model: &SettingsViewModel, messages: &MessageLog) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_screen(&mut out, view_model, messages);
    out
}

fn write_screen(out: &mut impl Write, view_model: &SettingsViewModel, messages: &MessageLog) -> fmt::Result {
    writeln!(out, "== {} ==", view_model.header.title)?;
    match (&view_model.user_name, view_model.user_id) {
        (Some(name), Some(id)) => writeln!(out, "signed in as {name} (#{})", id.0)?,
        _ => writeln!(out, "loading account...")?,
    }

    for row in &view_model.rows {
        let marker = if row.is_controlled { ">" } else { " " };
        writeln!(out, "{marker} {} {}", switch_label(row.is_on), row.title)?;
    }

    if let Some(topic) = view_model.controlled_topic {
        writeln!(
            out,
            "switch: {} {}",
            topic.displayable_name(),
            switch_label(view_model.switch_is_on)
        )?;
    }

    // Oldest of the recent notices first.
    let recent: Vec<_> = messages.recent(NOTICE_LIMIT).collect();
    for entry in recent.into_iter().rev() {
        let prefix = match entry.level {
            MessageLevel::Info => "note",
            MessageLevel::Error => "error",
        };
        writeln!(out, "{prefix}: {}", entry.text)?;
    }

    Ok(())
}
