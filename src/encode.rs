//! Command encoder: turns an [`Action`] into wire lines.
//!
//! Every element is validated before anything is produced, so a rejected
//! action never leaves a partial write behind. Each returned line carries its
//! CRLF terminator and fits in [`MAX_MESSAGE_LEN`] bytes.
//!
//! ```
//! use slirc_client::{encode_action, Action};
//!
//! let lines = encode_action(&Action::PrivMsg {
//!     target: "Bob".into(),
//!     text: "Hello".into(),
//! })
//! .unwrap();
//! assert_eq!(lines, vec!["PRIVMSG Bob :Hello\r\n".to_string()]);
//! ```

use crate::action::Action;
use crate::error::EncodeError;
use crate::message::needs_colon_prefix;
use crate::validation::{
    is_valid_username, validate_channel_name, validate_nickname, validate_text, CHANNEL_PREFIX,
    ValidationError,
};

/// Maximum length of an outgoing line, CRLF included (RFC 1459).
pub const MAX_MESSAGE_LEN: usize = 512;

/// Write a command with arguments. The last argument gets a `:` prefix if needed.
fn write_cmd(out: &mut String, cmd: &str, args: &[&str]) {
    out.push_str(cmd);

    let Some((trailing, middle)) = args.split_last() else {
        return;
    };
    for param in middle {
        out.push(' ');
        out.push_str(param);
    }
    out.push(' ');
    if needs_colon_prefix(trailing) {
        out.push(':');
    }
    out.push_str(trailing);
}

/// Write a command with a freeform (always colon-prefixed) trailing argument.
fn write_cmd_freeform(out: &mut String, cmd: &str, args: &[&str]) {
    out.push_str(cmd);

    let Some((last, middle)) = args.split_last() else {
        return;
    };
    for arg in middle {
        out.push(' ');
        out.push_str(arg);
    }
    out.push_str(" :");
    out.push_str(last);
}

/// Terminate a line and check the length limit.
fn finish(mut line: String) -> Result<String, EncodeError> {
    line.push_str("\r\n");
    if line.len() > MAX_MESSAGE_LEN {
        return Err(EncodeError::LineTooLong {
            actual: line.len(),
            limit: MAX_MESSAGE_LEN,
        });
    }
    Ok(line)
}

fn line(cmd: &str, args: &[&str]) -> Result<String, EncodeError> {
    let mut out = String::with_capacity(64);
    write_cmd(&mut out, cmd, args);
    finish(out)
}

fn freeform_line(cmd: &str, args: &[&str]) -> Result<String, EncodeError> {
    let mut out = String::with_capacity(64);
    write_cmd_freeform(&mut out, cmd, args);
    finish(out)
}

fn check_channel(name: &str) -> Result<(), EncodeError> {
    validate_channel_name(name).map_err(|cause| EncodeError::InvalidChannel {
        name: name.to_owned(),
        cause,
    })
}

fn check_nickname(nick: &str) -> Result<(), EncodeError> {
    validate_nickname(nick).map_err(|cause| EncodeError::InvalidNickname {
        nick: nick.to_owned(),
        cause,
    })
}

fn check_text(text: &str) -> Result<(), EncodeError> {
    match validate_text(text) {
        Ok(()) => Ok(()),
        Err(ValidationError::InvalidChar { ch, position }) => {
            Err(EncodeError::IllegalText { ch, position })
        }
        // validate_text only reports characters
        Err(_) => Err(EncodeError::EmptyText),
    }
}

fn check_target(target: &str) -> Result<(), EncodeError> {
    if target.starts_with(CHANNEL_PREFIX) {
        check_channel(target)
    } else if validate_nickname(target).is_ok() {
        Ok(())
    } else {
        Err(EncodeError::InvalidTarget(target.to_owned()))
    }
}

/// Encode one action into zero or more CRLF-terminated lines.
///
/// [`Action::Switch`] is local and encodes to nothing.
pub fn encode_action(action: &Action) -> Result<Vec<String>, EncodeError> {
    let lines = match action {
        Action::Register {
            nickname,
            user_info,
        } => {
            check_nickname(nickname)?;
            check_text(user_info)?;
            let username = if is_valid_username(user_info) {
                user_info.as_str()
            } else {
                nickname.as_str()
            };
            let realname = if user_info.is_empty() {
                nickname.as_str()
            } else {
                user_info.as_str()
            };
            vec![
                line("NICK", &[nickname])?,
                freeform_line("USER", &[username, "0", "*", realname])?,
            ]
        }
        Action::Nick(nickname) => {
            check_nickname(nickname)?;
            vec![line("NICK", &[nickname])?]
        }
        Action::Join(channel) => {
            check_channel(channel)?;
            vec![line("JOIN", &[channel])?]
        }
        Action::Part(channel) => {
            check_channel(channel)?;
            vec![line("PART", &[channel])?]
        }
        Action::PrivMsg { target, text } => {
            check_target(target)?;
            if text.is_empty() {
                return Err(EncodeError::EmptyText);
            }
            check_text(text)?;
            vec![freeform_line("PRIVMSG", &[target, text])?]
        }
        Action::Names(channel) => {
            check_channel(channel)?;
            vec![line("NAMES", &[channel])?]
        }
        Action::Pong(token) => {
            check_text(token)?;
            vec![freeform_line("PONG", &[token])?]
        }
        Action::Quit(reason) => match reason.as_deref() {
            Some(reason) if !reason.is_empty() => {
                check_text(reason)?;
                vec![freeform_line("QUIT", &[reason])?]
            }
            _ => vec![line("QUIT", &[])?],
        },
        Action::Switch(_) => Vec::new(),
    };
    Ok(lines)
}
