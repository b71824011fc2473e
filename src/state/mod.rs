//! Sans-IO session state for one IRC connection.
//!
//! This module performs no I/O. The [`Dispatcher`] consumes parsed messages
//! and notifications of written actions, mutates the [`Session`] it owns, and
//! returns UI [`Event`](crate::event::Event)s plus any reply actions for the
//! caller to send.
//!
//! # Example
//!
//! ```
//! use slirc_client::{Action, ClientConfig, Dispatcher, Message};
//!
//! let config = ClientConfig::new("localhost", 6667, "alice");
//! let mut dispatcher = Dispatcher::new(&config);
//! dispatcher.record_sent(&config.register_action());
//! dispatcher.dispatch(&":srv 001 alice :Welcome".parse::<Message>().unwrap());
//!
//! dispatcher.record_sent(&Action::Join("#rust".into()));
//! dispatcher.dispatch(&":alice!a@host JOIN #rust".parse::<Message>().unwrap());
//! assert_eq!(dispatcher.session().active_channel(), Some("#rust"));
//! ```

mod dispatcher;
mod log;
mod session;

pub use self::dispatcher::{Dispatch, Dispatcher};
pub use self::log::{LineKind, LogLine, MessageLog, MAX_LOG_LINES};
pub use self::session::{
    Channel, ChannelSnapshot, ChannelState, Conversation, Identity, RegistrationState, Session,
    SessionSnapshot,
};
