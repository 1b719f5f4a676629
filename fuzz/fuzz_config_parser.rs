//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text to `EngineConfig::parse()`; any accepted config must
//! also describe a usable selection capacity.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(config) = canopy_config::EngineConfig::parse(s)
    {
        assert_eq!(
            config.selection.capacity().map(|c| c.get()),
            config.selection.max_selections
        );
    }
});
