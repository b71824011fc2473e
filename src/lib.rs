//! # slirc-client
//!
//! The core of a minimal single-server IRC client.
//!
//! ## Features
//!
//! - Line framing over arbitrary socket reads (CRLF or bare LF)
//! - nom-based message parsing into prefix, command and parameters
//! - Validated encoding of outgoing actions; nothing unsafe reaches the wire
//! - Sans-IO session state: registration, channels, members, logs
//! - A `/command` interpreter for typed input
//! - Optional Tokio integration: one task driving socket, input and UI
//!
//! ## Quick Start
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use slirc_client::{Command, Message};
//!
//! let raw = ":nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("Valid IRC message");
//!
//! assert_eq!(
//!     Command::classify(&message),
//!     Command::Privmsg { target: "#channel", text: "Hello!" }
//! );
//! ```
//!
//! ### Driving the Session by Hand
//!
//! ```rust
//! use slirc_client::{encode_action, interpret, ClientConfig, Dispatcher, Message};
//!
//! let config = ClientConfig::new("localhost", 6667, "alice").with_default_channel("#rust");
//! let mut dispatcher = Dispatcher::new(&config);
//! dispatcher.record_sent(&config.register_action());
//!
//! let welcome: Message = ":srv 001 alice :Welcome".parse().unwrap();
//! let dispatch = dispatcher.dispatch(&welcome);
//! // The default channel is joined as a follow-up.
//! let join = &dispatch.replies[0];
//! assert_eq!(encode_action(join).unwrap(), vec!["JOIN #rust\r\n".to_string()]);
//!
//! dispatcher.record_sent(join);
//! dispatcher.dispatch(&":alice!a@host JOIN #rust".parse().unwrap());
//!
//! let action = interpret("hello everyone", dispatcher.session()).unwrap();
//! assert_eq!(
//!     encode_action(&action).unwrap(),
//!     vec!["PRIVMSG #rust :hello everyone\r\n".to_string()]
//! );
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod action;
pub mod casemap;
pub mod command;
pub mod config;
pub mod encode;
pub mod error;
pub mod event;
pub mod input;
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;
pub mod state;
pub mod ui;
pub mod validation;

#[cfg(feature = "tokio")]
pub mod client;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::action::Action;
pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::command::Command;
pub use self::config::ClientConfig;
pub use self::encode::{encode_action, MAX_MESSAGE_LEN};
pub use self::error::{
    ClientError, ConfigError, ConnectionError, EncodeError, InputError, ParseError, ProtocolError,
};
pub use self::event::{Event, LeaveReason, View};
pub use self::input::interpret;
pub use self::line::{LineFramer, MAX_LINE_LEN};
pub use self::message::{Message, ParsedMessage};
pub use self::prefix::Prefix;
pub use self::response::Response;
pub use self::state::{
    ChannelSnapshot, ChannelState, Dispatch, Dispatcher, LineKind, LogLine, RegistrationState,
    Session, SessionSnapshot,
};
pub use self::ui::Ui;

#[cfg(feature = "tokio")]
pub use self::client::Client;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
#[cfg(feature = "tokio")]
pub use self::transport::Transport;
