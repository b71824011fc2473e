//! Property-based tests for framing, parsing and encoding.
//!
//! Uses proptest to generate random IRC components and verify that:
//! 1. Framing does not depend on how the byte stream was chunked
//! 2. Parsed messages survive re-serialization
//! 3. Encoded actions parse back to the values they were built from
//! 4. The parser never panics

use std::collections::BTreeSet;

use proptest::prelude::*;
use slirc_client::{
    encode_action, irc_to_lower, Action, ClientConfig, Command, Dispatcher, LineFramer, Message,
    Prefix, MAX_MESSAGE_LEN,
};

// =============================================================================
// STRATEGIES
// =============================================================================

/// Valid IRC nickname per RFC 2812.
fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

fn username_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]+(\\.[a-z0-9]+)*").expect("valid regex")
}

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("#[a-zA-Z0-9_\\-]{1,40}").expect("valid regex")
}

/// Message text without CR, LF or NUL.
fn message_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{1,400}").expect("valid regex")
}

/// Printable ASCII text, short enough to fit in one line.
fn ascii_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{1,400}").expect("valid regex")
}

/// A middle parameter: no spaces, not starting with ':'.
fn middle_param_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9#*=!@.\\-][a-zA-Z0-9#*=!@.:\\-]{0,15}")
        .expect("valid regex")
}

fn prefix_strategy() -> impl Strategy<Value = Prefix> {
    prop_oneof![
        prop::string::string_regex("[a-z]+\\.[a-z]+\\.[a-z]+")
            .expect("valid regex")
            .prop_map(Prefix::ServerName),
        (
            nickname_strategy(),
            username_strategy(),
            hostname_strategy()
        )
            .prop_map(|(nick, user, host)| Prefix::Nickname(nick, user, host)),
    ]
}

fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "PRIVMSG", "NOTICE", "JOIN", "PART", "KICK", "QUIT", "NICK", "TOPIC", "PING",
        ])
        .prop_map(str::to_owned),
        (1u16..1000).prop_map(|n| format!("{:03}", n)),
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (
        prop::option::of(prefix_strategy()),
        command_strategy(),
        prop::collection::vec(middle_param_strategy(), 0..4),
        prop::option::of(message_text_strategy()),
    )
        .prop_map(|(prefix, command, mut params, trailing)| {
            params.extend(trailing);
            let msg = Message::new(&command, params);
            match prefix {
                Some(prefix) => msg.with_prefix(prefix),
                None => msg,
            }
        })
}

/// Lines as a server would send them, each with CRLF or bare LF.
fn stream_strategy() -> impl Strategy<Value = (Vec<String>, Vec<u8>)> {
    prop::collection::vec(
        (
            prop::string::string_regex("[^\r\n]{0,80}").expect("valid regex"),
            any::<bool>(),
        ),
        0..12,
    )
    .prop_map(|lines| {
        let mut bytes = Vec::new();
        let mut expected = Vec::new();
        for (line, crlf) in lines {
            bytes.extend_from_slice(line.as_bytes());
            bytes.extend_from_slice(if crlf { b"\r\n" } else { b"\n" });
            expected.push(line);
        }
        (expected, bytes)
    })
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn framing_is_independent_of_chunking(
        (expected, bytes) in stream_strategy(),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
        points.sort_unstable();

        let mut framer = LineFramer::new();
        let mut lines = Vec::new();
        let mut start = 0;
        for point in points.into_iter().chain(std::iter::once(bytes.len())) {
            lines.extend(framer.push(&bytes[start..point]));
            start = point;
        }

        prop_assert_eq!(&lines, &expected);
        prop_assert_eq!(framer.pending(), 0);

        let mut whole = LineFramer::new();
        prop_assert_eq!(whole.push(&bytes), expected);
    }

    #[test]
    fn parse_then_serialize_preserves_values(msg in message_strategy()) {
        let line = msg.to_string();
        let reparsed: Message = line.parse().expect("serialized message parses");
        prop_assert_eq!(&reparsed.command, &msg.command);
        prop_assert_eq!(&reparsed.params, &msg.params);
        prop_assert_eq!(reparsed, msg);
    }

    #[test]
    fn encoded_privmsg_parses_back(
        target in prop_oneof![channel_strategy(), nickname_strategy()],
        text in ascii_text_strategy(),
    ) {
        let action = Action::PrivMsg { target: target.clone(), text: text.clone() };
        let lines = encode_action(&action).expect("valid action encodes");
        prop_assert_eq!(lines.len(), 1);
        prop_assert!(lines[0].ends_with("\r\n"));
        prop_assert!(lines[0].len() <= MAX_MESSAGE_LEN);

        let msg: Message = lines[0].parse().expect("encoded line parses");
        prop_assert_eq!(
            Command::classify(&msg),
            Command::Privmsg { target: &target, text: &text }
        );
    }

    #[test]
    fn encoder_rejects_injected_line_breaks(
        before in "[a-z ]{0,20}",
        after in "[A-Z #]{0,20}",
        brk in prop::sample::select(vec!["\r", "\n", "\r\n", "\0"]),
    ) {
        let text = format!("{}{}{}", before, brk, after);
        let action = Action::PrivMsg { target: "#chan".into(), text };
        prop_assert!(encode_action(&action).is_err());
        let quit_text = format!("x{}QUIT", brk);
        prop_assert!(encode_action(&Action::Quit(Some(quit_text))).is_err());
    }

    #[test]
    fn names_reply_replaces_member_set(
        first in prop::collection::vec(nickname_strategy(), 0..10),
        second in prop::collection::vec(nickname_strategy(), 1..10),
    ) {
        let config = ClientConfig::new("localhost", 6667, "me");
        let mut d = Dispatcher::new(&config);
        d.record_sent(&config.register_action());
        d.dispatch(&":srv 001 me :hi".parse().unwrap());
        d.record_sent(&Action::Join("#c".into()));
        d.dispatch(&":me!u@h JOIN #c".parse().unwrap());

        for names in [&first, &second] {
            if names.is_empty() {
                continue;
            }
            let line = format!(":srv 353 me = #c :{}", names.join(" "));
            d.dispatch(&line.parse().unwrap());
            d.dispatch(&":srv 366 me #c :End of /NAMES list.".parse().unwrap());
        }

        let got: BTreeSet<String> = d
            .session()
            .channel("#c")
            .unwrap()
            .members()
            .map(irc_to_lower)
            .collect();
        let want: BTreeSet<String> = second.iter().map(|n| irc_to_lower(n)).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn parser_never_panics(input in "\\PC{0,600}") {
        let _ = input.parse::<Message>();
    }
}
