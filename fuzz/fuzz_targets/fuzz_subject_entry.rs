//! Fuzz target for identity filtering of listing entries.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_subject_entry -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use memberscope_core::{qualify, SubjectEntry};

fuzz_target!(|data: &[u8]| {
    let Ok(entries) = serde_json::from_slice::<Vec<SubjectEntry>>(data) else {
        return;
    };

    for entry in entries {
        if let Some(identity) = qualify(entry) {
            assert!(identity.principal_name.contains('@'));
            assert!(!identity.descriptor.trim().is_empty());
        }
    }
});
