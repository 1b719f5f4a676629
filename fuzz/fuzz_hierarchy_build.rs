//! Fuzz target for the hierarchy snapshot builder.
//!
//! Run with: cargo +nightly fuzz run fuzz_hierarchy_build
//!
//! Arbitrary JSON listings and search phrases must either be rejected with
//! an error or produce a snapshot; the builder must never panic.

#![no_main]

use canopy_core::{ClopenMap, Hierarchy, SearchFilter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let phrase = String::from_utf8_lossy(&rest[..split]);
    let Ok(listing) = std::str::from_utf8(&rest[split..]) else {
        return;
    };

    if let Ok(hierarchy) = Hierarchy::from_json(listing) {
        let clopen = ClopenMap::new();
        let _ = hierarchy.snapshot(&SearchFilter::new(&phrase), Some(&clopen));
    }
});
