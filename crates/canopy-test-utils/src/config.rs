//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`EngineConfig`] values
//! without repeating boilerplate across crate boundaries.

use canopy_config::{ClickMode, EngineConfig, OverflowPolicy};

/// Fluent builder for [`EngineConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .max_selections(2)
///     .click_mode(ClickMode::Modifier)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: EngineConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn max_selections(mut self, n: usize) -> Self {
        self.config.selection.max_selections = Some(n);
        self
    }

    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.config.selection.overflow = policy;
        self
    }

    pub fn click_mode(mut self, mode: ClickMode) -> Self {
        self.config.selection.click_mode = mode;
        self
    }

    pub fn persist_leaves(mut self, enabled: bool) -> Self {
        self.config.selection.persist_leaves = enabled;
        self
    }

    pub fn hierarchy_path(mut self, path: &str) -> Self {
        self.config.hierarchy.path = path.to_string();
        self
    }

    pub fn clopen_path(mut self, path: &str) -> Self {
        self.config.state.clopen_path = path.to_string();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
