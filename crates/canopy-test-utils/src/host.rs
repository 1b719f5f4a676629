//! Test host helpers.
//!
//! A [`TestHost`] plays the part of the application embedding the engine:
//! it owns a config file in a temporary directory, the clopen map and a log
//! of every report the engine sent.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use canopy_config::EngineConfig;
use canopy_core::{ClopenMap, Engine, EngineReport, Reporter};
use tempfile::TempDir;

/// Shared log of engine reports.
#[derive(Debug, Clone, Default)]
pub struct ReportLog {
    reports: Rc<RefCell<Vec<EngineReport>>>,
}

impl ReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter appending to this log.
    pub fn reporter(&self) -> impl Reporter + 'static {
        let reports = Rc::clone(&self.reports);
        move |report: EngineReport| reports.borrow_mut().push(report)
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<EngineReport> {
        self.reports.borrow().last().cloned()
    }

    /// Update counters of every report, in order.
    pub fn counters(&self) -> Vec<u64> {
        self.reports
            .borrow()
            .iter()
            .map(|r| r.update_counter)
            .collect()
    }
}

/// A test-scoped host with an owned temp directory for its config file.
///
/// The temp directory is deleted automatically when this value is dropped.
pub struct TestHost {
    pub engine: Engine,
    pub clopen: ClopenMap,
    pub reports: ReportLog,
    pub config: EngineConfig,
    pub config_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHost {
    /// Create a host whose engine is configured from the given TOML string.
    pub async fn with_toml(toml_content: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("canopy.toml");
        tokio::fs::write(&config_path, toml_content)
            .await
            .expect("failed to write test config");

        let config = EngineConfig::load(&config_path)
            .await
            .expect("failed to parse test config");

        let clopen = ClopenMap::new();
        let reports = ReportLog::new();
        let engine = Engine::from_config(&config)
            .with_clopen(clopen.clone())
            .with_reporter(reports.reporter());

        Self {
            engine,
            clopen,
            reports,
            config,
            config_path,
            _temp_dir: temp_dir,
        }
    }

    /// Create a host with the default configuration.
    pub async fn default_config() -> Self {
        Self::with_toml("").await
    }
}
