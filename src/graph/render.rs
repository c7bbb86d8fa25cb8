//! Graph document rendering.
//!
//! The document is the artifact handed to the apply engine: every node with
//! its provider type, removal policy and properties, the outputs, and the
//! creation order.

use indexmap::IndexMap;
use serde::Serialize;

use super::{AttrValue, NodeOrigin, RemovalPolicy, ResourceGraph, ResourceKind};
use crate::config::DeploymentTarget;
use crate::error::{ErrorContext, Result};

/// Version of the document layout
pub const FORMAT_VERSION: u32 = 1;

/// One resource in the rendered document
#[derive(Debug, Clone, Serialize)]
pub struct RenderedResource {
    /// Resource kind
    pub kind: ResourceKind,
    /// Provider resource type
    #[serde(rename = "type")]
    pub provider_type: &'static str,
    /// Managed or imported
    pub origin: NodeOrigin,
    /// Behavior when removed from the declaration
    pub removal_policy: RemovalPolicy,
    /// Declared attributes
    pub properties: IndexMap<String, AttrValue>,
    /// Resource tags
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,
    /// Direct dependencies, sorted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// One output in the rendered document
#[derive(Debug, Clone, Serialize)]
pub struct RenderedOutput {
    /// Output value
    pub value: AttrValue,
    /// Description
    pub description: String,
}

/// Serializable form of a completed resource graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphDocument {
    /// Layout version
    pub format_version: u32,
    /// Stack name
    pub stack: String,
    /// Deployment target
    pub target: DeploymentTarget,
    /// Resources by identifier, in declaration order
    pub resources: IndexMap<String, RenderedResource>,
    /// Outputs by name
    pub outputs: IndexMap<String, RenderedOutput>,
    /// Creation order
    pub order: Vec<String>,
}

impl GraphDocument {
    /// Render a graph for a deployment target
    pub fn new(graph: &ResourceGraph, target: &DeploymentTarget) -> Self {
        let resources = graph
            .nodes()
            .map(|node| {
                let mut depends_on: Vec<String> = graph
                    .direct_dependencies(&node.id)
                    .into_iter()
                    .map(|e| e.to.clone())
                    .collect();
                depends_on.sort();
                (
                    node.id.clone(),
                    RenderedResource {
                        kind: node.kind,
                        provider_type: node.kind.provider_type(),
                        origin: node.origin,
                        removal_policy: node.removal_policy,
                        properties: node.attributes.clone(),
                        tags: node.tags.clone(),
                        depends_on,
                    },
                )
            })
            .collect();

        let outputs = graph
            .outputs()
            .map(|o| {
                (
                    o.name.clone(),
                    RenderedOutput {
                        value: o.value.clone(),
                        description: o.description.clone(),
                    },
                )
            })
            .collect();

        Self {
            format_version: FORMAT_VERSION,
            stack: graph.name().to_string(),
            target: target.clone(),
            resources,
            outputs,
            order: graph.creation_order().to_vec(),
        }
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .with_context(|| format!("Failed to render {} as JSON", self.stack))
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .with_context(|| format!("Failed to render {} as YAML", self.stack))
    }
}
