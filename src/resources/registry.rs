//! Container image registry.

use super::Construct;
use crate::error::Result;
use crate::graph::{
    GraphBuilder, NodeHandle, OutputRef, RemovalPolicy, ResourceKind, ResourceNode, Scope,
};

/// Image tag scheduled tasks run
pub const LATEST_TAG: &str = "latest";

/// Registry holding the application image. Always retained: images pushed
/// by CI outlive any single declaration.
#[derive(Debug, Clone, Default)]
pub struct RegistryProps {}

/// Handle to the registry
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    node: NodeHandle,
}

impl RegistryHandle {
    /// Registry node
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Repository URI, known after apply
    pub fn uri(&self) -> OutputRef {
        self.node.output("RepositoryUri")
    }

    /// Repository ARN, known after apply
    pub fn arn(&self) -> OutputRef {
        self.node.output("Arn")
    }
}

impl Construct for RegistryProps {
    type Handle = RegistryHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<RegistryHandle> {
        let node = builder.add_node(
            ResourceNode::new(scope.node_id("EcrRepository")?, ResourceKind::Registry)
                .with_removal_policy(RemovalPolicy::Retain),
        )?;
        Ok(RegistryHandle { node })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_retained() {
        let mut builder = GraphBuilder::new("Test");
        let registry = RegistryProps::default()
            .declare(&mut builder, &Scope::root().child("ECR").unwrap())
            .unwrap();
        assert_eq!(registry.node().id(), "ECR/EcrRepository");
        assert_eq!(registry.uri().attribute, "RepositoryUri");

        let graph = builder.finish().unwrap();
        assert_eq!(
            graph.node("ECR/EcrRepository").unwrap().removal_policy,
            RemovalPolicy::Retain
        );
    }
}
