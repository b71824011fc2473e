//! Nom-based IRC message parser.
//!
//! This module provides zero-copy parsing of IRC messages using the nom
//! parser combinator library. [`ParsedMessage`] borrows from the input line;
//! [`Message`](super::Message) is built from it.

use nom::{
    bytes::complete::{take_till, take_till1, take_while, take_while1},
    character::complete::char,
    combinator::opt,
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::ParseError;

fn spaces(input: &str) -> IResult<&str, &str> {
    take_while(|c| c == ' ')(input)
}

/// IRCv3 message tags (after `@`, before the first space). Skipped.
fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_till(|c| c == ' '))(input)
}

/// Message prefix (after `:`, before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Command name or numeric.
fn parse_command(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric())(input)
}

/// Parse a complete IRC message into its components.
///
/// IRC message format:
/// ```text
/// [@tags] [:prefix] <command> [params...] [:trailing]
/// ```
///
/// Returns the unconsumed input; anything left means the command token was
/// followed by something other than a space.
pub fn parse_message(input: &str) -> IResult<&str, ParsedMessage<'_>> {
    let (input, _) = opt(terminated(parse_tags, spaces))(input)?;
    let (input, prefix) = opt(terminated(parse_prefix, spaces))(input)?;
    let (input, command) = parse_command(input)?;

    let mut params = Vec::new();
    let mut rest = input;

    loop {
        let (after, gap) = spaces(rest)?;
        if gap.is_empty() || after.is_empty() {
            rest = after;
            break;
        }
        if let Some(trailing) = after.strip_prefix(':') {
            params.push(trailing);
            rest = "";
            break;
        }
        let (next, param) = take_till1(|c| c == ' ')(after)?;
        params.push(param);
        rest = next;
    }

    Ok((
        rest,
        ParsedMessage {
            prefix,
            command,
            params,
        },
    ))
}

/// Byte offset of `part`, a subslice of `line`.
fn offset_in(line: &str, part: &str) -> usize {
    part.as_ptr() as usize - line.as_ptr() as usize
}

/// A parsed IRC message with borrowed string slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage<'a> {
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command name, as sent.
    pub command: &'a str,
    /// Command parameters, including trailing.
    pub params: Vec<&'a str>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse one line. A trailing CR/LF is ignored.
    pub fn parse(line: &'a str) -> Result<Self, ParseError> {
        let trimmed = line.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if trimmed.trim().is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        match parse_message(trimmed) {
            Ok(("", msg)) => Ok(msg),
            Ok((rest, _)) => Err(ParseError::InvalidCommand {
                line: line.to_owned(),
                position: offset_in(line, rest),
            }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                if e.input.trim().is_empty() {
                    Err(ParseError::MissingCommand {
                        line: line.to_owned(),
                    })
                } else {
                    Err(ParseError::InvalidCommand {
                        line: line.to_owned(),
                        position: offset_in(line, e.input),
                    })
                }
            }
            Err(nom::Err::Incomplete(_)) => Err(ParseError::MissingCommand {
                line: line.to_owned(),
            }),
        }
    }
}
