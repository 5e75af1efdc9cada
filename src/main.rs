//! Assetline - a static site asset pipeline with live reload.

mod actor;
mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod image;
mod logger;
mod paths;
mod reload;
mod task;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::PipelineConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PipelineConfig::load(&cli)?;
    cli::pipeline::run(&cli.command(), config)
}
