//! Subcommands module for cubecobra-infra CLI
//!
//! This module contains all the subcommand implementations.

pub mod environments;
pub mod plan;
pub mod synth;

use crate::cli::output::OutputFormatter;
use clap::Args;
use cubecobra_infra::config::{ConfigSet, Secrets};
use cubecobra_infra::error::{Error, Result};
use cubecobra_infra::stack::{Stack, StackParams};
use std::path::PathBuf;

/// Common context shared between commands
pub struct CommandContext {
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Output formatter
    pub output: OutputFormatter,
    /// Verbosity level
    pub verbosity: u8,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            output: OutputFormatter::new(!cli.no_color, cli.verbosity()),
            verbosity: cli.verbosity(),
        }
    }

    /// Load the configuration set.
    ///
    /// Unreadable or malformed files are reported as configuration errors.
    pub fn load_config(&self) -> Result<ConfigSet> {
        ConfigSet::load(self.config_path.as_ref()).map_err(|e| match e.downcast::<Error>() {
            Ok(err) => err,
            Err(e) => Error::Config(format!("{:#}", e)),
        })
    }

    /// Resolve and assemble the stack for an environment
    pub fn assemble(&self, args: &StackArgs) -> Result<Stack> {
        let config = self.load_config()?;
        // Secrets enter the program here and nowhere else
        let params = StackParams::resolve(
            &config,
            &args.environment,
            &args.version,
            Secrets::from_env(),
        )?;
        self.output.info(&format!(
            "Assembling {} for environment '{}'",
            params.stack_name, args.environment
        ));
        Stack::assemble(&params)
    }
}

/// Environment selection shared by stack commands
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Environment name from the configuration set
    #[arg(short = 'e', long = "env")]
    pub environment: String,

    /// Application version label to deploy
    #[arg(long)]
    pub version: String,
}
