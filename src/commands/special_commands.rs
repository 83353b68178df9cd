//! Special commands parser for the interactive chat
//!
//! Lines starting with `/` (plus the bare words `exit` and `quit`) are
//! handled locally instead of being sent to the chatbot. Command words are
//! case-insensitive; arguments keep their original text.

use crate::preferences::PreferencesPatch;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it cannot use
    #[error("Invalid argument for {command}: {message}")]
    InvalidArgument { command: String, message: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands available during a chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show all special commands
    Help,

    /// Show the current preferences
    ShowPrefs,

    /// Change one preference
    ///
    /// `/set <field> <value>`, e.g. `/set transportation 대중교통`.
    SetPreference(PreferencesPatch),

    /// Search recommendations for a location without leaving the chat
    Recommend(String),

    /// Show the congestion map, optionally with one area's detail
    Map(Option<String>),

    /// Clear the screen; the conversation is kept
    Clear,

    /// Leave the session
    Exit,

    /// Not a special command; the input is a chat message
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognized `/` command,
/// `CommandError::MissingArgument` when a required argument is absent, and
/// `CommandError::InvalidArgument` for an unknown preference field or value.
///
/// # Examples
///
/// ```
/// use culture_guide::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/recommend 강남역").unwrap();
/// assert_eq!(cmd, SpecialCommand::Recommend("강남역".to_string()));
///
/// let cmd = parse_special_command("홍대 전시회 알려줘").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/prefs" | "/preferences" => Ok(SpecialCommand::ShowPrefs),
        "/set" => parse_set(rest),
        "/recommend" | "/rec" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/recommend".to_string(),
                    usage: "/recommend <location>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Recommend(rest.to_string()))
            }
        }
        "/map" => Ok(SpecialCommand::Map(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        "/clear" => Ok(SpecialCommand::Clear),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn parse_set(args: &str) -> Result<SpecialCommand, CommandError> {
    let missing = || CommandError::MissingArgument {
        command: "/set".to_string(),
        usage: "/set <gender|age_group|has_children|transportation> <value>".to_string(),
    };

    let (field, value) = args.split_once(char::is_whitespace).ok_or_else(missing)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(missing());
    }

    PreferencesPatch::from_field(field, value)
        .map(SpecialCommand::SetPreference)
        .map_err(|e| CommandError::InvalidArgument {
            command: "/set".to_string(),
            message: e.to_string(),
        })
}

/// Print help text for the chat session
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

PREFERENCES:
  /prefs                         - Show the current preferences
  /set gender <남성|여성>
  /set age_group <10대|20대|30대|40대|50대|60대 이상>
  /set has_children <예|아니오>
  /set transportation <도보|자동차|대중교통|자전거>
                                 - English values also work (female, 30s, yes, transit)

EXPLORE:
  /recommend <location>          - Personalized recommendation for a location
  /map [area]                    - Congestion map, or one area's detail

SESSION:
  /clear                         - Clear the screen (the conversation is kept)
  /help                          - Show this help message
  exit, quit, /exit              - Leave the chat

INPUT:
  End a line with \ to continue the message on the next line.
  Anything else is sent to the chatbot. Mention a place name for local tips,
  e.g. "강남역 주변 문화 행사 추천해줘".
"#
    );
}
