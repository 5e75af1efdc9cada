//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Assetline static asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: assetline.toml)
    #[arg(short = 'C', long, global = true, default_value = "assetline.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Source directory (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Destination directory (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// Scenario to run (default: dev)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available scenarios
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build once, then watch sources and serve with live reload
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Clean and build all assets once
    #[command(visible_alias = "b")]
    Build,

    /// Remove the destination directory
    #[command(visible_alias = "c")]
    Clean,

    /// Sort declarations in SCSS sources in place
    #[command(name = "scss-sort", visible_alias = "lint")]
    ScssSort,
}

impl Cli {
    /// The scenario to run; no subcommand means `dev`.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Dev {
            interface: None,
            port: None,
        })
    }
}
