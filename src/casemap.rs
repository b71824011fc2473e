//! IRC case-mapping functions.
//!
//! Channel and nickname lookups in the session state are keyed by the
//! folded form produced here, while the original spelling is kept for
//! display. The `rfc1459` mapping is used: ASCII lowercase plus
//! `[` → `{`, `]` → `}`, `\` → `|` and `~` → `^`.

#[inline]
fn fold_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => c.to_ascii_lowercase(),
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
///
/// ```
/// use slirc_client::casemap::irc_to_lower;
///
/// assert_eq!(irc_to_lower("#Rust[Dev]"), "#rust{dev}");
/// ```
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().map(fold_char).eq(b.chars().map(fold_char))
}
