//! Fuzz target for edge dump lines.
//!
//! Goal: a malformed line is an error, never a panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_edge_line
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = nsguard_repo::fuzz::parse_edge_line(text);
    }
});
