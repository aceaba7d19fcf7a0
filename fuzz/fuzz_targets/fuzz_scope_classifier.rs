//! Fuzz target for group scope classification.
//!
//! Classification must never panic and must be deterministic for any
//! display/principal name pair, including malformed bracket patterns.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_scope_classifier -- -max_total_time=600

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use memberscope_core::{ScopeClassifier, ScopeType};

#[derive(Arbitrary, Debug)]
struct GroupNames {
    organization: String,
    display_name: String,
    principal_name: String,
}

fuzz_target!(|input: GroupNames| {
    if input.principal_name.len() > 4096 || input.organization.len() > 256 {
        return;
    }

    let classifier = ScopeClassifier::new(input.organization.clone());
    let first = classifier.classify_names(&input.display_name, &input.principal_name);
    let second = classifier.classify_names(&input.display_name, &input.principal_name);
    assert_eq!(first, second);

    match first.scope_type {
        ScopeType::Organization => assert_eq!(first.scope_name, input.organization),
        ScopeType::Project => {
            assert!(input.principal_name.starts_with('['));
            assert!(!first.scope_name.is_empty());
            assert!(!first.scope_name.contains(']'));
        }
    }
});
