//! Fuzz target for `nsguard.toml` parsing and rule model construction.
//!
//! Goal: parsing and building should **never panic** on any input. Malformed declarations,
//! bad patterns and ambiguous rule sets must all come back as `ConfigError`.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Limit input size to keep pairwise ambiguity checks fast
    if data.len() > 64 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = nsguard_settings::build_rule_model(text, None);
    }
});
