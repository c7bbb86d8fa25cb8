//! CLI module for cubecobra-infra
//!
//! This module provides the command-line interface, including argument
//! parsing and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::environments::EnvironmentsArgs;
use commands::plan::{OutputsArgs, PlanArgs};
use commands::synth::{GraphArgs, SynthArgs};

/// cubecobra-infra - CubeCobra infrastructure as a resource graph
///
/// Declares the CubeCobra deployment for a named environment and renders
/// it for an apply engine.
#[derive(Parser, Debug, Clone)]
#[command(name = "cubecobra-infra")]
#[command(version)]
#[command(about = "Declare CubeCobra infrastructure as a resource graph", long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write the graph document for an environment
    Synth(SynthArgs),

    /// Write a DOT rendering of the dependency graph
    Graph(GraphArgs),

    /// Show the creation order
    Plan(PlanArgs),

    /// Show the stack outputs
    Outputs(OutputsArgs),

    /// List configured environments
    Environments(EnvironmentsArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "cubecobra-infra",
            "synth",
            "--env",
            "production",
            "--version",
            "1.0.2",
        ])
        .unwrap();
        match cli.command {
            Commands::Synth(args) => {
                assert_eq!(args.stack.environment, "production");
                assert_eq!(args.stack.version, "1.0.2");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["cubecobra-infra", "-vvvv", "environments"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_version_label_is_required() {
        let result = Cli::try_parse_from(["cubecobra-infra", "plan", "--env", "production"]);
        assert!(result.is_err());
    }
}
