//! Fuzz target for IRC message parsing
//!
//! Parsing must never panic, and anything that parses must survive a
//! serialize/parse cycle and classification.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{Command, Message};
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.len() > 512 {
        return;
    }

    if let Ok(msg) = input.parse::<Message>() {
        let _ = Command::classify(&msg);
        let _ = msg.to_string().parse::<Message>();
    }
});
