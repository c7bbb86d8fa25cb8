//! Declarative Resource Graph
//!
//! Resources are declared into a [`GraphBuilder`] which owns the node set
//! and every dependency edge. Once the declaration is complete,
//! [`GraphBuilder::finish`] verifies the graph and produces an immutable
//! [`ResourceGraph`] for the renderers (and, eventually, an apply engine).
//!
//! ## Edges
//!
//! An edge `(from, to)` means `to` must exist before `from` is created or
//! updated. Edges come from two places:
//!
//! - **Explicit**: declared by a constructor with [`ResourceNode::depends_on`]
//!   or with [`GraphBuilder::add_dependency`].
//! - **Reference**: implied whenever a node's attributes contain an
//!   [`OutputRef`] to another node.
//!
//! The builder refuses any edge that would close a cycle, so the edge set is
//! a DAG at every point of the declaration.

pub mod node;
pub mod render;
pub mod scope;

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

pub use node::{
    AttrValue, Attributes, NodeOrigin, OutputRef, RemovalPolicy, ResourceKind, ResourceNode,
};
pub use render::{GraphDocument, RenderedOutput, RenderedResource};
pub use scope::Scope;

/// How an edge came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Declared explicitly
    Explicit,
    /// Implied by an output reference
    Reference,
}

/// Ordering constraint: `to` settles before `from` is created or updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    /// Dependent node
    pub from: String,
    /// Dependency
    pub to: String,
    /// Origin of the edge
    pub kind: EdgeKind,
}

/// Named value exported for downstream automation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackOutput {
    /// Output name
    pub name: String,
    /// Output value, usually a reference resolved at apply time
    pub value: AttrValue,
    /// Human readable description
    pub description: String,
}

/// Handle to a declared node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    id: String,
    kind: ResourceKind,
}

impl NodeHandle {
    /// Node identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Node kind
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Reference to an output attribute of this node
    pub fn output(&self, attribute: &str) -> OutputRef {
        OutputRef::new(&self.id, attribute)
    }

    /// Reference to this node's primary identifier
    pub fn reference(&self) -> OutputRef {
        self.output(OutputRef::REF)
    }
}

/// Mutable graph under declaration.
///
/// Edges in the underlying petgraph point from dependency to dependent, so a
/// topological sort yields a valid creation order.
#[derive(Debug)]
pub struct GraphBuilder {
    /// Stack name
    name: String,
    /// The underlying graph
    graph: DiGraph<ResourceNode, DependencyEdge>,
    /// Map from node ID to node index
    node_indices: HashMap<String, NodeIndex>,
    /// Stack outputs in declaration order
    outputs: IndexMap<String, StackOutput>,
}

impl GraphBuilder {
    /// Create an empty builder for the named stack
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Stack name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a node.
    ///
    /// Fails without modifying the graph if the identifier is taken, if a
    /// stateful node is not retained, or if the node references or depends
    /// on an undeclared node.
    pub fn add_node(&mut self, node: ResourceNode) -> Result<NodeHandle> {
        if self.node_indices.contains_key(&node.id) {
            return Err(Error::DuplicateResource(node.id));
        }
        if node.kind.is_stateful() && node.removal_policy != RemovalPolicy::Retain {
            return Err(Error::RetainRequired {
                id: node.id,
                kind: node.kind.to_string(),
            });
        }

        let mut edges: Vec<(String, EdgeKind)> = Vec::new();
        for dep in &node.depends_on {
            edges.push((dep.clone(), EdgeKind::Explicit));
        }
        for r in node.refs() {
            edges.push((r.node.clone(), EdgeKind::Reference));
        }
        for (target, _) in &edges {
            if *target == node.id {
                return Err(Error::DependencyCycle(format!(
                    "'{}' depends on itself",
                    node.id
                )));
            }
            if !self.node_indices.contains_key(target) {
                return Err(Error::UnknownResource(target.clone()));
            }
        }

        let handle = NodeHandle {
            id: node.id.clone(),
            kind: node.kind,
        };
        debug!(id = %handle.id, kind = %handle.kind, "declared resource");

        let idx = self.graph.add_node(node);
        self.node_indices.insert(handle.id.clone(), idx);

        // A fresh node has no dependents, so none of these can close a cycle.
        for (target, kind) in edges {
            self.insert_edge(&handle.id, &target, kind);
        }

        Ok(handle)
    }

    /// Add an explicit dependency: `to` must settle before `from`
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<()> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;

        // `from` already settles before `to` if there is a path from -> to.
        if from_idx == to_idx || has_path_connecting(&self.graph, from_idx, to_idx, None) {
            return Err(Error::DependencyCycle(format!(
                "'{}' -> '{}' would close a cycle",
                from, to
            )));
        }

        self.insert_edge(from, to, EdgeKind::Explicit);
        Ok(())
    }

    /// Export a named output
    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
        description: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let value = value.into();
        if self.outputs.contains_key(&name) {
            return Err(Error::DuplicateOutput(name));
        }
        for r in value.refs() {
            if !self.node_indices.contains_key(&r.node) {
                return Err(Error::UnknownResource(r.node.clone()));
            }
        }
        self.outputs.insert(
            name.clone(),
            StackOutput {
                name,
                value,
                description: description.into(),
            },
        );
        Ok(())
    }

    /// Whether a node is declared
    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Number of declared nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Verify the declaration and freeze it
    pub fn finish(self) -> Result<ResourceGraph> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            let id = self
                .graph
                .node_weight(cycle.node_id())
                .map(|n| n.id.clone())
                .unwrap_or_default();
            Error::DependencyCycle(format!("cycle through '{}'", id))
        })?;
        let order = order
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).map(|n| n.id.clone()))
            .collect();

        debug!(
            stack = %self.name,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "resource graph complete"
        );

        Ok(ResourceGraph {
            name: self.name,
            graph: self.graph,
            node_indices: self.node_indices,
            outputs: self.outputs,
            order,
        })
    }

    fn index_of(&self, id: &str) -> Result<NodeIndex> {
        self.node_indices
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownResource(id.to_string()))
    }

    fn insert_edge(&mut self, from: &str, to: &str, kind: EdgeKind) {
        let (Some(&from_idx), Some(&to_idx)) =
            (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return;
        };
        if self.graph.find_edge(to_idx, from_idx).is_some() {
            return;
        }
        debug!(from, to, ?kind, "declared dependency");
        self.graph.add_edge(
            to_idx,
            from_idx,
            DependencyEdge {
                from: from.to_string(),
                to: to.to_string(),
                kind,
            },
        );
    }
}

/// Completed, immutable resource graph
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    name: String,
    graph: DiGraph<ResourceNode, DependencyEdge>,
    node_indices: HashMap<String, NodeIndex>,
    outputs: IndexMap<String, StackOutput>,
    order: Vec<String>,
}

impl ResourceGraph {
    /// Stack name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.node_indices
            .get(id)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    /// All nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.graph.node_weights()
    }

    /// Nodes of one kind, in declaration order
    pub fn nodes_of_kind(&self, kind: ResourceKind) -> Vec<&ResourceNode> {
        self.nodes().filter(|n| n.kind == kind).collect()
    }

    /// All dependency edges
    pub fn edges(&self) -> Vec<&DependencyEdge> {
        self.graph.edge_weights().collect()
    }

    /// Stack outputs in declaration order
    pub fn outputs(&self) -> impl Iterator<Item = &StackOutput> {
        self.outputs.values()
    }

    /// Get an output by name
    pub fn output(&self, name: &str) -> Option<&StackOutput> {
        self.outputs.get(name)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Creation order: every node appears after all of its dependencies
    pub fn creation_order(&self) -> &[String] {
        &self.order
    }

    /// Check the edge set for cycles
    pub fn is_acyclic(&self) -> bool {
        toposort(&self.graph, None).is_ok()
    }

    /// Direct dependencies of a node
    pub fn direct_dependencies(&self, id: &str) -> Vec<&DependencyEdge> {
        self.node_indices
            .get(id)
            .map(|idx| {
                self.graph
                    .edges_directed(*idx, Direction::Incoming)
                    .map(|e| e.weight())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `from` directly depends on `to`
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.node_indices.get(from), self.node_indices.get(to)) {
            (Some(f), Some(t)) => self.graph.find_edge(*t, *f).is_some(),
            _ => false,
        }
    }

    /// All nodes a node depends on (direct and transitive)
    pub fn dependencies(&self, id: &str) -> Vec<String> {
        self.walk(id, Direction::Incoming)
    }

    /// All nodes that depend on a node (direct and transitive)
    pub fn dependents(&self, id: &str) -> Vec<String> {
        self.walk(id, Direction::Outgoing)
    }

    fn walk(&self, id: &str, direction: Direction) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_indices.get(id) {
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors_directed(current, direction) {
                    if seen.insert(neighbor) {
                        if let Some(node) = self.graph.node_weight(neighbor) {
                            found.push(node.id.clone());
                        }
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        found
    }

    /// Generate a DOT format representation for visualization
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("digraph \"{}\" {{\n", self.name));
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box];\n\n");

        for node in self.nodes() {
            let style = match (node.origin, node.removal_policy) {
                (NodeOrigin::Imported, _) => ", style=dashed",
                (_, RemovalPolicy::Retain) => ", style=bold",
                _ => "",
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\"{}];\n",
                node.id, node.id, node.kind, style
            ));
        }

        output.push('\n');

        // Arrows point from dependency to dependent, in creation direction.
        for edge in self.graph.edge_references() {
            let dep = edge.weight();
            let style = match dep.kind {
                EdgeKind::Explicit => "solid",
                EdgeKind::Reference => "dashed",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}];\n",
                dep.to, dep.from, style
            ));
        }

        output.push_str("}\n");
        output
    }
}
