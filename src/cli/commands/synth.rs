//! Synth and graph commands
//!
//! Render an assembled stack to a file or stdout.

use super::{CommandContext, StackArgs};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Graph document format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// Arguments for the synth command
#[derive(Parser, Debug, Clone)]
pub struct SynthArgs {
    /// Environment and version
    #[command(flatten)]
    pub stack: StackArgs,

    /// Document format
    #[arg(long, short = 'f', value_enum, default_value_t = DocumentFormat::Json)]
    pub format: DocumentFormat,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

impl SynthArgs {
    /// Execute the synth command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let stack = ctx.assemble(&self.stack)?;
        let document = stack.document();
        let rendered = match self.format {
            DocumentFormat::Json => document.to_json()?,
            DocumentFormat::Yaml => document.to_yaml()?,
        };
        emit(ctx, self.out.as_deref(), &rendered)?;
        ctx.output.info(&format!(
            "Synthesized {} resources for {}",
            stack.graph().node_count(),
            stack.name()
        ));
        Ok(0)
    }
}

/// Arguments for the graph command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Environment and version
    #[command(flatten)]
    pub stack: StackArgs,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

impl GraphArgs {
    /// Execute the graph command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let stack = ctx.assemble(&self.stack)?;
        emit(ctx, self.out.as_deref(), &stack.graph().to_dot())?;
        Ok(0)
    }
}

fn emit(ctx: &CommandContext, out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ctx.output.info(&format!("Wrote {}", path.display()));
        }
        None => {
            ctx.output.plan(content.trim_end());
            ctx.output.flush();
        }
    }
    Ok(())
}
