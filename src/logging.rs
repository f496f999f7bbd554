// File: ./src/logging.rs
//! Logger setup for binaries embedding the toolkit.
//!
//! Library code only talks to the `log` facade; nothing is printed until one
//! of these initialisers runs.
use crate::config::Config;
use crate::context::AppContext;
use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};
use std::fs::OpenOptions;

fn logger_config() -> simplelog::Config {
    ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build()
}

/// Logs to stderr. Fails if a logger is already installed.
pub fn init_terminal(level: LevelFilter) -> Result<()> {
    TermLogger::init(
        level,
        logger_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("A logger is already installed")
}

/// Appends to `handykit.log` in the context's cache directory.
pub fn init_file(ctx: &dyn AppContext, level: LevelFilter) -> Result<()> {
    let path = ctx.log_file_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;
    WriteLogger::init(level, logger_config(), file).context("A logger is already installed")
}

/// Picks the terminal or file logger according to the config.
pub fn init_from_config(ctx: &dyn AppContext, config: &Config) -> Result<()> {
    if config.log_to_file {
        init_file(ctx, config.level_filter())
    } else {
        init_terminal(config.level_filter())
    }
}
