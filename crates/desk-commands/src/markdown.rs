const MAILTO: &str = "mailto:";

/// Unwraps an address that arrived as ticket markdown.
///
/// Pasted addresses often turn into `[display|mailto:address]` and users
/// find that hard to avoid, so the exact shape is reduced to `address`.
/// Anything else passes through unchanged.
pub fn unwrap_mailto_markdown(raw: &str) -> &str {
    if !raw.starts_with('[') || !raw.ends_with(']') || !raw.contains('|') {
        return raw;
    }
    let mut parts = raw.split('|');
    let (Some(_display), Some(tail), None) = (parts.next(), parts.next(), parts.next()) else {
        return raw;
    };
    if tail.len() <= MAILTO.len() + 1 || !tail.starts_with(MAILTO) {
        return raw;
    }
    // Strip the mailto: prefix and the closing bracket.
    &tail[MAILTO.len()..tail.len() - 1]
}
