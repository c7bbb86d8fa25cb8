//! Environments command
//!
//! Lists the environments of the configuration set.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use cubecobra_infra::stack::default_stack_name;

/// Arguments for the environments command
#[derive(Parser, Debug, Clone)]
pub struct EnvironmentsArgs {
    /// Print names only
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl EnvironmentsArgs {
    /// Execute the environments command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let config = ctx.load_config()?;

        if config.environments.is_empty() {
            ctx.output.warning("No environments configured");
            return Ok(0);
        }

        if self.quiet {
            for name in config.names() {
                ctx.output.plan(name);
            }
            return Ok(0);
        }

        let rows: Vec<Vec<String>> = config
            .environments
            .iter()
            .map(|(name, env)| {
                vec![
                    name.clone(),
                    env.stack_name
                        .clone()
                        .unwrap_or_else(|| default_stack_name(name)),
                    env.domain.clone(),
                    format!("{}/{}", env.target.account, env.target.region),
                ]
            })
            .collect();

        ctx.output.section("Environments");
        ctx.output.table(&["Name", "Stack", "Domain", "Target"], &rows);
        Ok(0)
    }
}
