#![deny(unsafe_code)]

//! Shared test utilities for the Canopy workspace.
//!
//! Provides reusable tree fixtures, config builders, a file-backed test host
//! and tracing helpers so that individual crate tests stay concise and
//! consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! canopy-test-utils = { workspace = true }
//! ```
//!
//! Inside `canopy-core` only the integration tests under `tests/` may use it;
//! unit tests compile a separate copy of the core crate.

pub mod config;
pub mod fixtures;
pub mod host;
pub mod tracing_setup;
