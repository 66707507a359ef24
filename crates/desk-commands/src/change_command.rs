use thiserror::Error;

use crate::markdown::unwrap_mailto_markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ChangeAction` values.
pub enum ChangeAction {
    Add,
    Remove,
}

impl ChangeAction {
    /// Accepts exactly `add` or `remove` after normalization.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a batch of raw lines should be read.
pub enum BatchMode {
    /// Each line carries its own `add`/`remove` keyword followed by the
    /// identity (freeform ticket comments).
    Explicit,
    /// Each line is just an identity; the action is fixed for the whole
    /// batch by a separate ticket field (structured field batches).
    Implicit(ChangeAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Action keyword as detected on one line.
pub enum ActionToken {
    Recognized(ChangeAction),
    /// A keyword was present but is not `add` or `remove`. Reported per
    /// line; not a structural failure.
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One parsed change request line.
pub struct ParsedLine {
    pub action: ActionToken,
    pub target: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Structural failure: the line does not match the expected two-token
/// shape. The batch must stop here; a malformed line signals the user
/// does not understand the required syntax.
pub enum ParseError {
    #[error("couldn't find a command at the start of '{line}'")]
    MissingCommand { line: String },
}

/// Derives the action keyword from a line: every non-alphabetic
/// character becomes a space, then the first remaining token is
/// lowercased. `*add* jane@example.org` therefore yields `add`.
pub fn action_keyword(line: &str) -> Option<String> {
    let mapped: String = line
        .chars()
        .map(|ch| if ch.is_alphabetic() { ch } else { ' ' })
        .collect();
    mapped
        .split_whitespace()
        .next()
        .map(|token| token.to_lowercase())
}

/// Parses one non-blank line. Blank lines never reach the parser; the
/// batch iteration treats them as an intentional terminator.
pub fn parse_line(line: &str, mode: BatchMode) -> Result<ParsedLine, ParseError> {
    match mode {
        BatchMode::Implicit(action) => {
            let lowered = line.trim().to_lowercase();
            let target = unwrap_mailto_markdown(&lowered).to_string();
            Ok(ParsedLine {
                action: ActionToken::Recognized(action),
                target,
            })
        }
        BatchMode::Explicit => {
            let Some(raw_target) = line.split_whitespace().nth(1) else {
                return Err(ParseError::MissingCommand {
                    line: line.to_string(),
                });
            };
            let Some(keyword) = action_keyword(line) else {
                return Err(ParseError::MissingCommand {
                    line: line.to_string(),
                });
            };
            let lowered = raw_target.to_lowercase();
            let target = unwrap_mailto_markdown(&lowered).to_string();
            let action = match ChangeAction::parse(&keyword) {
                Some(action) => ActionToken::Recognized(action),
                None => ActionToken::Unrecognized(keyword),
            };
            Ok(ParsedLine { action, target })
        }
    }
}
