use std::sync::OnceLock;

use regex::Regex;

static FIELD_SPLIT: OnceLock<Regex> = OnceLock::new();

/// Splits a multi-line ticket field value into individual responses.
///
/// Field text uses `\r\n` line endings and sometimes comma separation;
/// agent edits can introduce non-breaking spaces, so those split too.
/// Empty pieces are kept: the batch loop treats the first blank entry as
/// its terminator.
pub fn split_field_lines(response: &str) -> Vec<String> {
    let splitter = FIELD_SPLIT
        .get_or_init(|| Regex::new("[\r\n, \u{a0}]+").expect("field splitter regex"));
    splitter.split(response).map(str::to_string).collect()
}

/// Splits a comment body into lines. Comments arrive with plain `\n`
/// endings; any stray `\r` is trimmed off per line.
pub fn split_comment_lines(body: &str) -> Vec<String> {
    body.split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}
