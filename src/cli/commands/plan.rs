//! Plan and outputs commands
//!
//! Human-readable views of an assembled stack.

use super::{CommandContext, StackArgs};
use anyhow::Result;
use clap::Parser;
use cubecobra_infra::graph::AttrValue;

/// Arguments for the plan command
#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    /// Environment and version
    #[command(flatten)]
    pub stack: StackArgs,
}

impl PlanArgs {
    /// Execute the plan command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let stack = ctx.assemble(&self.stack)?;
        let graph = stack.graph();

        ctx.output.banner(&format!("PLAN: {}", stack.name()));
        ctx.output.plan(&format!(
            "Target: account {} in {}\n",
            stack.target().account,
            stack.target().region
        ));

        for (step, id) in graph.creation_order().iter().enumerate() {
            if let Some(node) = graph.node(id) {
                ctx.output.plan_entry(step + 1, node);
            }
        }

        ctx.output.plan(&format!(
            "\n{} resources, {} dependencies",
            graph.node_count(),
            graph.edge_count()
        ));
        Ok(0)
    }
}

/// Arguments for the outputs command
#[derive(Parser, Debug, Clone)]
pub struct OutputsArgs {
    /// Environment and version
    #[command(flatten)]
    pub stack: StackArgs,
}

fn render_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Str(s) => s.clone(),
        AttrValue::Ref { target } => target.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

impl OutputsArgs {
    /// Execute the outputs command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let stack = ctx.assemble(&self.stack)?;

        let rows: Vec<Vec<String>> = stack
            .graph()
            .outputs()
            .map(|o| vec![o.name.clone(), render_value(&o.value), o.description.clone()])
            .collect();

        ctx.output.section(&format!("Outputs of {}", stack.name()));
        ctx.output.table(&["Name", "Value", "Description"], &rows);
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubecobra_infra::graph::OutputRef;

    #[test]
    fn test_render_value() {
        assert_eq!(
            render_value(&OutputRef::new("ECR/EcrRepository", "RepositoryUri").into()),
            "${ECR/EcrRepository.RepositoryUri}"
        );
        assert_eq!(render_value(&AttrValue::from("plain")), "plain");
    }
}
