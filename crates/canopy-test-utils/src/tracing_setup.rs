//! Tracing initialisation helpers for tests.
//!
//! Call [`init_test_tracing`] at the top of any test that emits tracing events
//! and wants them captured by the test harness.
//!
//! The subscriber is initialised at most once per process, so it is safe to
//! call from every test function.

use tracing_subscriber::EnvFilter;

/// Initialise a tracing subscriber that writes to the test-harness writer
/// and respects the `RUST_LOG` environment variable, defaulting to `debug`
/// for the engine crates.
///
/// # Example
///
/// ```ignore
/// #[test]
/// fn my_test() {
///     canopy_test_utils::tracing_setup::init_test_tracing();
///     tracing::debug!("visible in captured test output");
/// }
/// ```
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("canopy_core=debug,canopy_config=debug")),
        )
        .with_test_writer()
        .try_init();
}
