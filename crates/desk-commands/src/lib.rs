//! Pure parsing of free-text change requests.
//!
//! Turns one loosely-formatted line of human input into an add/remove
//! command, unwraps mailto markdown that copy/paste smuggles in, and
//! splits multi-line ticket field values into individual responses.

pub mod change_command;
pub mod markdown;
pub mod split;

pub use change_command::{
    action_keyword, parse_line, ActionToken, BatchMode, ChangeAction, ParseError, ParsedLine,
};
pub use markdown::unwrap_mailto_markdown;
pub use split::{split_comment_lines, split_field_lines};
