//! IRC message parsing and serialization.
//!
//! [`Message`] is the owned, parsed form of one protocol line: an optional
//! [`Prefix`](crate::Prefix), the command (or three-digit numeric) and its
//! ordered parameters.

mod nom_parser;
mod types;

pub use self::nom_parser::ParsedMessage;
pub use self::types::Message;
pub(crate) use self::types::needs_colon_prefix;
