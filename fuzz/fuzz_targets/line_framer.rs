//! Fuzz target for the line framer
//!
//! Splitting the same bytes at an arbitrary point must yield the same lines.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::LineFramer;

fuzz_target!(|data: &[u8]| {
    let Some((&split, data)) = data.split_first() else {
        return;
    };
    let split = split as usize % (data.len() + 1);

    let mut whole = LineFramer::new();
    let expected = whole.push(data);

    let mut chunked = LineFramer::new();
    let mut got = chunked.push(&data[..split]);
    got.extend(chunked.push(&data[split..]));

    assert_eq!(expected, got);
    assert_eq!(whole.pending(), chunked.pending());
});
