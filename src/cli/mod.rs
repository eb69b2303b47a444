//! CLI entry point for plantos-setup.

pub mod install;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::merge::DEFAULT_COMMAND;

/// Plantos setup CLI.
#[derive(Parser, Debug)]
#[command(
    name = "plantos-setup",
    version,
    about = "Authorize this machine with Plantos and wire the MCP server into Claude Desktop"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands. Running with no subcommand behaves like `install`.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize and write the Claude Desktop config
    Install(InstallArgs),
    /// Remove the Plantos entry from the Claude Desktop config
    Uninstall(ConfigArgs),
    /// Show whether Plantos is configured
    Status(ConfigArgs),
}

/// Arguments for `plantos-setup install`.
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Command Claude Desktop runs to start the MCP server
    #[arg(long, default_value = DEFAULT_COMMAND)]
    pub command: String,

    /// Extra argument passed to the launcher (repeatable)
    #[arg(long = "arg")]
    pub args: Vec<String>,

    /// Config file to update (defaults to the platform location)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Default for InstallArgs {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            args: Vec::new(),
            config: None,
        }
    }
}

/// Arguments for `plantos-setup uninstall` and `plantos-setup status`.
#[derive(Parser, Debug, Default)]
pub struct ConfigArgs {
    /// Config file to inspect (defaults to the platform location)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
