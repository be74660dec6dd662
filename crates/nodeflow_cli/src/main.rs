// SPDX-License-Identifier: MIT OR Apache-2.0
//! `nodeflow` - runs a reference editing session on the node graph engine
//!
//! Builds a small graph (two integer sources feeding a sum, viewed by a
//! fourth node), evaluates it, toggles the sum node off and on, copies and
//! pastes part of it, and prints the resulting editor snapshot as JSON.
//!
//! Usage: `nodeflow [CONFIG.ron]`
//!
//! Set `RUST_LOG` to adjust logging; engine debug output is on by default.

mod nodes;
mod scenario;

use nodeflow_engine::{ConfigError, EditorConfig};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Values fed into the two integer sources
const SOURCE_VALUES: (i64, i64) = (2, 3);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scenario(#[from] scenario::ScenarioError),

    #[error("Failed to export snapshot: {0}")]
    Export(#[from] serde_json::Error),
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nodeflow_engine=debug,nodeflow_cli=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting nodeflow v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(std::env::args_os().nth(1).map(PathBuf::from)) {
        tracing::error!("nodeflow failed: {e}");
        std::process::exit(1);
    }
}

fn run(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => EditorConfig::load(&path)?,
        None => EditorConfig::default(),
    };

    let (a, b) = SOURCE_VALUES;
    let outcome = scenario::run(&config, a, b)?;
    tracing::info!(
        "Session finished with {} node(s), published counts per step: {:?}",
        outcome.graph.node_count(),
        outcome.published_counts
    );
    for (node_id, value) in outcome.context.values() {
        tracing::debug!("{} = {:?}", node_id, value);
    }

    let info = scenario::snapshot(&outcome, &config);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
