//! # CLI Layer
//!
//! Parses arguments, sets up logging and the file store, then hands the
//! command to [`commands`]. Output formatting lives in [`render`] so it can be
//! tested without a terminal.
//!
//! Logging goes to stderr through `tracing-subscriber`. The filter comes from
//! `JOTTER_LOG` (e.g. `JOTTER_LOG=jotterapp=debug`), defaulting to `warn`;
//! `--verbose` forces `debug`.

mod commands;
mod render;
pub mod setup;
mod styles;

use anyhow::{Context, Result};
use commands::AppContext;
use jotterapp::config::{default_config_file, JotterConfig};
use jotterapp::store::fs::FileStore;
use setup::parse_cli;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub async fn run() -> Result<()> {
    let cli = parse_cli();
    init_tracing(cli.verbose);

    let config_file = default_config_file().filter(|path| path.exists());
    let config = JotterConfig::load_from(config_file.as_deref())
        .context("Failed to load configuration")?;
    let data_dir = match cli.dir {
        Some(dir) => dir,
        None => config.data_dir()?,
    };
    debug!(data_dir = %data_dir.display(), "opening file store");

    let ctx = AppContext {
        store: Arc::new(FileStore::open(data_dir.clone())),
        timings: config.timings(),
        config,
        data_dir,
        config_file,
    };
    commands::dispatch(&ctx, cli.command).await
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("JOTTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
