//! Validation of outgoing protocol elements.
//!
//! Everything the client writes to the socket goes through these checks
//! first, so that user-supplied strings can never smuggle an extra protocol
//! line (CR/LF injection) or produce a malformed command.
//!
//! - Nicknames: RFC 2812 letters, digits, specials and hyphen
//! - Channel names: must start with `#`; no space, comma, BEL or controls
//! - Usernames: no spaces, `@` or controls
//! - Free text: no NUL, CR or LF

/// Control characters that are never valid inside a protocol element.
///
/// These characters terminate or delimit IRC protocol lines.
pub const PROTOCOL_CONTROL_CHARS: &[char] = &[
    '\x00', // NUL - terminates strings
    '\x0D', // CR - line delimiter
    '\x0A', // LF - line delimiter
];

/// Characters that are invalid in channel names per RFC 2812.
const INVALID_CHAN_CHARS: &[char] = &[' ', ',', '\x07', '\x00'];

/// The only channel prefix this client joins.
pub const CHANNEL_PREFIX: char = '#';

/// Default nickname length cap.
pub const MAX_NICK_LEN: usize = 50;

/// Default channel name length cap.
pub const MAX_CHANNEL_LEN: usize = 50;

/// Reason a protocol element was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The input was empty.
    Empty,
    /// The input was too long.
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },
    /// Invalid character found at position.
    InvalidChar {
        /// The invalid character.
        ch: char,
        /// Position in the string.
        position: usize,
    },
    /// Missing required prefix.
    MissingPrefix,
    /// Invalid first character.
    InvalidFirstChar {
        /// The invalid character.
        ch: char,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "input is empty"),
            ValidationError::TooLong { max, actual } => {
                write!(f, "input too long: {} characters (max {})", actual, max)
            }
            ValidationError::InvalidChar { ch, position } => {
                write!(f, "invalid character {:?} at position {}", ch, position)
            }
            ValidationError::MissingPrefix => write!(f, "missing required prefix"),
            ValidationError::InvalidFirstChar { ch } => {
                write!(f, "invalid first character: {:?}", ch)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check if a character is a protocol control character (NUL, CR, LF).
///
/// ```
/// use slirc_client::validation::is_protocol_control_char;
///
/// assert!(is_protocol_control_char('\r'));
/// assert!(!is_protocol_control_char('\x02')); // bold is formatting, not protocol
/// ```
#[inline]
pub fn is_protocol_control_char(c: char) -> bool {
    PROTOCOL_CONTROL_CHARS.contains(&c)
}

/// Find the first protocol control character in free text.
///
/// Returns the character and its character position.
pub fn find_protocol_control_char(s: &str) -> Option<(usize, char)> {
    s.chars().enumerate().find(|(_, c)| is_protocol_control_char(*c))
}

/// Validate an IRC nickname (RFC 2812 rules).
///
/// ```
/// use slirc_client::validation::validate_nickname;
///
/// assert!(validate_nickname("Nick_123").is_ok());
/// assert!(validate_nickname("[away]").is_ok());
/// assert!(validate_nickname("123nick").is_err());
/// assert!(validate_nickname("nick name").is_err());
/// ```
pub fn validate_nickname(nick: &str) -> Result<(), ValidationError> {
    let mut chars = nick.chars();
    let Some(first) = chars.next() else {
        return Err(ValidationError::Empty);
    };

    let len = nick.chars().count();
    if len > MAX_NICK_LEN {
        return Err(ValidationError::TooLong {
            max: MAX_NICK_LEN,
            actual: len,
        });
    }

    if !is_valid_nick_first_char(first) {
        return Err(ValidationError::InvalidFirstChar { ch: first });
    }

    for (i, c) in chars.enumerate() {
        if !is_valid_nick_char(c) {
            return Err(ValidationError::InvalidChar {
                ch: c,
                position: i + 1,
            });
        }
    }

    Ok(())
}

/// First char must be a letter or special char.
#[inline]
pub fn is_valid_nick_first_char(c: char) -> bool {
    c.is_ascii_alphabetic() || is_nick_special_char(c)
}

/// Subsequent chars may also be digits or a hyphen.
#[inline]
pub fn is_valid_nick_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_nick_special_char(c) || c == '-'
}

/// Special chars per RFC 2812: `[ ] \ ` _ ^ { | }`.
#[inline]
pub fn is_nick_special_char(c: char) -> bool {
    let code = c as u32;
    (0x5B..=0x60).contains(&code) || (0x7B..=0x7D).contains(&code)
}

/// Validate a channel name.
///
/// ```
/// use slirc_client::validation::validate_channel_name;
///
/// assert!(validate_channel_name("#general").is_ok());
/// assert!(validate_channel_name("general").is_err()); // missing prefix
/// assert!(validate_channel_name("&local").is_err()); // only # channels
/// assert!(validate_channel_name("#a,#b").is_err());
/// ```
pub fn validate_channel_name(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ValidationError::Empty);
    };

    if first != CHANNEL_PREFIX {
        return Err(ValidationError::MissingPrefix);
    }

    let len = name.chars().count();
    if len > MAX_CHANNEL_LEN {
        return Err(ValidationError::TooLong {
            max: MAX_CHANNEL_LEN,
            actual: len,
        });
    }
    if len == 1 {
        return Err(ValidationError::Empty);
    }

    for (i, c) in chars.enumerate() {
        if INVALID_CHAN_CHARS.contains(&c) || c.is_control() {
            return Err(ValidationError::InvalidChar {
                ch: c,
                position: i + 1,
            });
        }
    }

    Ok(())
}

/// Convenience wrapper around [`validate_channel_name`].
#[inline]
pub fn is_valid_channel_name(name: &str) -> bool {
    validate_channel_name(name).is_ok()
}

/// Convenience wrapper around [`validate_nickname`].
#[inline]
pub fn is_valid_nickname(nick: &str) -> bool {
    validate_nickname(nick).is_ok()
}

/// Whether `user` can be sent as the username field of USER.
///
/// ```
/// use slirc_client::validation::is_valid_username;
///
/// assert!(is_valid_username("alice"));
/// assert!(!is_valid_username("Alice Liddell"));
/// assert!(!is_valid_username("a@b"));
/// ```
pub fn is_valid_username(user: &str) -> bool {
    !user.is_empty() && !user.chars().any(|c| c == ' ' || c == '@' || c.is_control())
}

/// Validate free text (message bodies, quit reasons, user info).
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    match find_protocol_control_char(text) {
        Some((position, ch)) => Err(ValidationError::InvalidChar { ch, position }),
        None => Ok(()),
    }
}
