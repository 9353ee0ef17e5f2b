//! Fuzz target for namespace pattern parsing, matching and overlap.
//!
//! Goal: never panic, and a namespace matched by two patterns implies they overlap.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_pattern_match
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nsguard_domain::{Namespace, NamespacePattern};

#[derive(Arbitrary, Debug)]
struct PatternInput {
    first: String,
    second: String,
    namespaces: Vec<String>,
}

fuzz_target!(|input: PatternInput| {
    if input.first.len() > 256 || input.second.len() > 256 || input.namespaces.len() > 32 {
        return;
    }

    let (Ok(a), Ok(b)) = (
        NamespacePattern::parse(&input.first),
        NamespacePattern::parse(&input.second),
    ) else {
        return;
    };

    let overlap = a.overlaps(&b);
    let _ = a.specificity().cmp(&b.specificity());

    for ns in input.namespaces.iter().filter(|n| n.len() <= 512) {
        let ns = Namespace::new(ns);
        if a.matches(&ns) && b.matches(&ns) {
            assert!(overlap, "'{a}' and '{b}' both match '{ns}' but do not overlap");
        }
    }
});
