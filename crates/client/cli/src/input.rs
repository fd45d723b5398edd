//! Line-oriented input for the terminal client.
//!
//! Keeps the text-to-command mapping in one place so the app loop only deals
//! with [`InputCommand`]s.

use std::str::FromStr;
use std::time::Duration;

use account_core::Newsletter;

pub const HELP: &str = "\
commands:
  on | off             flip the controlled newsletter
  all on | all off     flip every newsletter
  topic <name>         control another newsletter (arts, games, happening, invent, promo, weekly)
  fail [message]       make the next save fail
  slow <ms>            delay the next save
  show                 redraw the screen
  help                 this text
  quit                 exit";

/// High-level outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Toggle(bool),
    ToggleAll(bool),
    SetTopic(Newsletter),
    /// Script a failure for the next save; `None` means no server message.
    FailNextSave(Option<String>),
    SlowNextSave(Duration),
    Show,
    Help,
    Quit,
    /// Unrecognized input, kept for the error notice.
    Unknown(String),
    /// Blank line.
    None,
}

pub fn parse_line(line: &str) -> InputCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match (head.to_ascii_lowercase().as_str(), rest) {
        ("", _) => InputCommand::None,
        ("on", "") => InputCommand::Toggle(true),
        ("off", "") => InputCommand::Toggle(false),
        ("all", arg) => match parse_switch(arg) {
            Some(on) => InputCommand::ToggleAll(on),
            None => InputCommand::Unknown(line.to_owned()),
        },
        ("topic", arg) => match Newsletter::from_str(arg) {
            Ok(topic) => InputCommand::SetTopic(topic),
            Err(_) => InputCommand::Unknown(line.to_owned()),
        },
        ("fail", "") => InputCommand::FailNextSave(None),
        ("fail", message) => InputCommand::FailNextSave(Some(message.to_owned())),
        ("slow", arg) => match arg.parse::<u64>() {
            Ok(millis) => InputCommand::SlowNextSave(Duration::from_millis(millis)),
            Err(_) => InputCommand::Unknown(line.to_owned()),
        },
        ("show", "") => InputCommand::Show,
        ("help" | "?", "") => InputCommand::Help,
        ("quit" | "exit" | "q", "") => InputCommand::Quit,
        _ => InputCommand::Unknown(line.to_owned()),
    }
}

fn parse_switch(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toggles() {
        assert_eq!(parse_line("on"), InputCommand::Toggle(true));
        assert_eq!(parse_line("  OFF "), InputCommand::Toggle(false));
        assert_eq!(parse_line("all on"), InputCommand::ToggleAll(true));
        assert_eq!(parse_line("all 0"), InputCommand::ToggleAll(false));
    }

    #[test]
    fn parses_topic_and_scripting() {
        assert_eq!(
            parse_line("topic Games"),
            InputCommand::SetTopic(Newsletter::Games)
        );
        assert_eq!(parse_line("fail"), InputCommand::FailNextSave(None));
        assert_eq!(
            parse_line("fail server  error"),
            InputCommand::FailNextSave(Some("server  error".into()))
        );
        assert_eq!(
            parse_line("slow 250"),
            InputCommand::SlowNextSave(Duration::from_millis(250))
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_line(""), InputCommand::None);
        assert!(matches!(parse_line("topic monthly"), InputCommand::Unknown(_)));
        assert!(matches!(parse_line("all maybe"), InputCommand::Unknown(_)));
        assert!(matches!(parse_line("on please"), InputCommand::Unknown(_)));
        assert!(matches!(parse_line("slow fast"), InputCommand::Unknown(_)));
    }
}
