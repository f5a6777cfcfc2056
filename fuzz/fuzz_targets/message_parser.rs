//! Fuzz target for IRC line parsing
//!
//! Parsing, normalization and CTCP detection must never panic, and any line
//! that parses must survive a display round trip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_session::ctcp::Ctcp;
use slirc_session::Message;
use std::str;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    if input.len() > 512 {
        return;
    }

    if let Ok(msg) = Message::parse(input) {
        let msg = msg.normalized();
        if let Some(text) = msg.param(1) {
            let _ = Ctcp::parse(text);
        }
        let _ = Message::parse(&msg.to_string());
    }
});
