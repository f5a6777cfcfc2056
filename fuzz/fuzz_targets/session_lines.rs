//! Fuzz target for the session pipeline
//!
//! Feeds newline-separated input through a registered session. Nothing a
//! server sends may panic the router, the registration machine or the store.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_session::{ConfigBuilder, Session};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let Ok(config) = ConfigBuilder::new("bob").sasl("PLAIN", "secret").build() else {
        return;
    };

    let mut session = Session::new(config);
    session.start();
    for line in input.split('\n') {
        let _ = session.handle_line(line);
    }
    let _ = session.take_outbound();
    let _ = session.store().to_json();
});
