//! cubecobra-infra - CubeCobra infrastructure as a resource graph
//!
//! This is the main entry point for the cubecobra-infra CLI.

mod cli;

use cli::commands::CommandContext;
use cli::{Cli, Commands};
use cubecobra_infra::error::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let mut ctx = CommandContext::new(&cli);

    if ctx.verbosity >= 2 {
        eprintln!("cubecobra-infra v{}", VERSION);
    }

    // Execute the appropriate command
    let result = match &cli.command {
        Commands::Synth(args) => args.execute(&mut ctx),
        Commands::Graph(args) => args.execute(&mut ctx),
        Commands::Plan(args) => args.execute(&mut ctx),
        Commands::Outputs(args) => args.execute(&mut ctx),
        Commands::Environments(args) => args.execute(&mut ctx),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            ctx.output.error(&format!("{:#}", e));
            exit_code(&e)
        }
    };

    std::process::exit(exit_code);
}

/// Exit status for a failed command, from the first library error in the chain
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(1, Error::exit_code)
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
