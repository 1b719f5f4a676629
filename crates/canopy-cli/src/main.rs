#![deny(unsafe_code)]

//! Canopy CLI: a reference host for the selection engine.
//!
//! Reads a hierarchy listing, keeps the clopen map in a JSON state file
//! between runs, and drives the engine either by printing the current tree
//! or by replaying a script of gestures.

mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use canopy_config::EngineConfig;
use canopy_core::build_info;
use canopy_core::view::{self, VisibleRow};
use canopy_core::{ClickEvent, ClopenMap, Engine, EngineReport, Hierarchy, SearchFilter};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::script::{Script, Step};

/// Bounded selection over category/field trees.
#[derive(Parser)]
#[command(
    name = "canopy",
    version,
    long_version = build_info::LONG_VERSION,
    about,
    long_about = None
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "canopy.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv). Overrides the configured level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tree as the engine would display it.
    Tree {
        /// Only keep fields matching this phrase.
        #[arg(short, long)]
        search: Option<String>,

        /// Print every row, including those inside closed categories.
        #[arg(long)]
        all: bool,
    },

    /// Replay a gesture script, printing each report as a JSON line.
    Run {
        /// Path to the TOML script.
        script: PathBuf,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(&config, cli.verbose))),
        )
        .init();

    match cli.command {
        Commands::Tree { search, all } => cmd_tree(&config, search.as_deref(), all).await?,
        Commands::Run { script } => cmd_run(&config, &script).await?,
        Commands::Config { show } => cmd_config(&config, &cli.config, show)?,
    }

    Ok(())
}

/// The level requested by `-v` flags, falling back to the config file.
fn log_filter(config: &EngineConfig, verbose: u8) -> &str {
    match verbose {
        0 => &config.logging.level,
        1 => "debug",
        _ => "trace",
    }
}

async fn cmd_tree(config: &EngineConfig, search: Option<&str>, all: bool) -> Result<()> {
    let hierarchy = load_hierarchy(config).await?;
    let clopen = load_clopen(config).await?;
    let filter = search.map(SearchFilter::new).unwrap_or_default();

    let mut engine = Engine::from_config(config).with_clopen(clopen.clone());
    engine.on_snapshot_replaced(hierarchy.snapshot(&filter, Some(&clopen))?);

    let rows = if all {
        view::all_rows(engine.tree(), engine.selection())
    } else {
        engine.visible_rows()
    };
    for row in &rows {
        println!("{}", render_row(row));
    }

    for entry in engine.selection().iter() {
        let field = hierarchy
            .row(entry.key())
            .and_then(|r| r.field_id.as_deref())
            .unwrap_or("-");
        println!("selected: {} (field {field})", entry.label());
    }
    Ok(())
}

async fn cmd_run(config: &EngineConfig, script_path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(script_path)
        .await
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script = Script::parse(&content)
        .with_context(|| format!("failed to parse script {}", script_path.display()))?;

    let hierarchy = load_hierarchy(config).await?;
    let clopen = load_clopen(config).await?;
    let mut engine = Engine::from_config(config)
        .with_clopen(clopen.clone())
        .with_reporter(print_report);
    engine.on_snapshot_replaced(hierarchy.snapshot(&SearchFilter::all(), Some(&clopen))?);

    info!(steps = script.steps.len(), "Replaying script");
    for step in script.steps {
        match step {
            Step::Click { id, modifiers } => match engine.find(&id) {
                Some(node) => {
                    engine.handle_node_click(node, &ClickEvent::with_modifiers(modifiers));
                }
                None => warn!(id = %id, "Click on unknown node skipped"),
            },
            Step::Expand { id } => match engine.find(&id) {
                Some(node) => {
                    engine.handle_expand(node);
                }
                None => warn!(id = %id, "Expand of unknown node skipped"),
            },
            Step::Collapse { id } => match engine.find(&id) {
                Some(node) => {
                    engine.handle_collapse(node);
                }
                None => warn!(id = %id, "Collapse of unknown node skipped"),
            },
            Step::Search { phrase } => {
                let filter = SearchFilter::new(&phrase);
                engine.on_snapshot_replaced(hierarchy.snapshot(&filter, Some(&clopen))?);
            }
            Step::Clear => {
                engine.clear_selection();
            }
        }
    }

    save_clopen(config, &clopen).await
}

fn cmd_config(config: &EngineConfig, config_path: &Path, show: bool) -> Result<()> {
    if show {
        let toml_str = toml::to_string_pretty(config).context("failed to render configuration")?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

fn print_report(report: EngineReport) {
    match serde_json::to_string(&report) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "Failed to serialise report"),
    }
}

/// One tree row: indentation, caret for categories, tick for selections.
fn render_row(row: &VisibleRow) -> String {
    let indent = "  ".repeat(row.depth);
    let marker = match (row.has_caret, row.is_expanded, row.is_selected) {
        (true, true, _) => "▾",
        (true, false, _) => "▸",
        (false, _, true) => "✓",
        (false, _, false) => "·",
    };
    format!("{indent}{marker} {} [{}]", row.label, row.id)
}

async fn load_config(path: &Path) -> Result<EngineConfig> {
    if path.exists() {
        EngineConfig::load(path)
            .await
            .with_context(|| format!("invalid configuration in {}", path.display()))
    } else {
        Ok(EngineConfig::default())
    }
}

async fn load_hierarchy(config: &EngineConfig) -> Result<Hierarchy> {
    let path = Path::new(&config.hierarchy.path);
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read hierarchy {}", path.display()))?;
    Hierarchy::from_json(&content)
        .with_context(|| format!("failed to parse hierarchy {}", path.display()))
}

/// The persisted clopen map, or an empty one on first run.
async fn load_clopen(config: &EngineConfig) -> Result<ClopenMap> {
    let path = Path::new(&config.state.clopen_path);
    if !path.exists() {
        info!(path = %path.display(), "No saved state, starting fresh");
        return Ok(ClopenMap::new());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read state {}", path.display()))?;
    ClopenMap::from_json(&content)
        .with_context(|| format!("failed to parse state {}", path.display()))
}

async fn save_clopen(config: &EngineConfig, clopen: &ClopenMap) -> Result<()> {
    let path = Path::new(&config.state.clopen_path);
    let json = clopen.to_json().context("failed to serialise state")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write state {}", path.display()))?;
    info!(path = %path.display(), entries = clopen.len(), "Saved state");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{NodeKey, Tree, TreeNode};
    use canopy_test_utils::config::TestConfigBuilder;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_log_filter_prefers_flags() {
        let config = TestConfigBuilder::new().log_level("warn").build();
        assert_eq!(log_filter(&config, 0), "warn");
        assert_eq!(log_filter(&config, 1), "debug");
        assert_eq!(log_filter(&config, 3), "trace");
    }

    #[test]
    fn test_render_rows() {
        let tree = Tree::from_nodes(vec![
            TreeNode::category("1", "Vitals", vec![TreeNode::leaf("2", "Pulse")]).expanded(),
        ])
        .unwrap();
        let mut engine = Engine::new(Default::default());
        engine.on_snapshot_replaced(tree);
        let pulse = engine.find(&NodeKey::from("2")).unwrap();
        engine.handle_node_click(pulse, &ClickEvent::plain());

        let lines: Vec<String> = engine.visible_rows().iter().map(render_row).collect();
        assert_eq!(lines, vec!["▾ Vitals [1]", "  ✓ Pulse [2]"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_clopen_state_roundtrip_on_disk() {
        let tmp = TempDir::new().unwrap();
        let state = tmp.path().join("state.json");
        let config = TestConfigBuilder::new()
            .clopen_path(state.to_str().unwrap())
            .build();

        let fresh = load_clopen(&config).await.unwrap();
        assert!(fresh.is_empty());

        fresh.set(&NodeKey::from("7"), true);
        save_clopen(&config, &fresh).await.unwrap();
        let loaded = load_clopen(&config).await.unwrap();
        assert_eq!(loaded.get(&NodeKey::from("7")), Some(true));
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).await.unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
