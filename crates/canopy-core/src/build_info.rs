//! Build metadata embedded by the build script.

/// Short git commit hash at build time, suffixed with `-dirty` for modified trees.
pub const GIT_HASH: &str = env!("CANOPY_GIT_HASH");

/// The cargo profile (`debug` or `release`).
pub const BUILD_PROFILE: &str = env!("CANOPY_BUILD_PROFILE");

/// The crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Long version line for `--version` output, e.g. `"0.1.0 (abc12345, debug)"`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CANOPY_GIT_HASH"),
    ", ",
    env!("CANOPY_BUILD_PROFILE"),
    ")"
);
