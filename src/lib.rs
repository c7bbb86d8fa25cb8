//! # cubecobra-infra - CubeCobra Infrastructure as a Resource Graph
//!
//! cubecobra-infra declares the cloud infrastructure behind the CubeCobra
//! web application (compute environment, DNS, certificates, data tables,
//! container registry and scheduled jobs) as a declarative resource graph.
//! The graph is rendered to a document that an external apply engine
//! provisions; nothing in this crate talks to the cloud.
//!
//! ## Core Concepts
//!
//! - **Resource nodes**: typed units of infrastructure with an attribute mapping
//! - **Dependency edges**: ordering constraints, explicit or implied by references
//! - **Constructs**: typed props that declare one or more nodes under a scope
//! - **Stacks**: one named environment declared end to end
//! - **Configuration set**: named environments loaded from TOML, YAML or JSON
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                              │
//! │                    (clap-based command parsing)                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Stack Assembly                              │
//! │        (parameter validation, environment variables, outputs)        │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┼─────────────────────────┐
//!          ▼                         ▼                         ▼
//! ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────────┐
//! │ Identity / DNS  │   │  Access / Storage   │   │  Compute / Jobs     │
//! │ (zone, cert,    │   │  (roles, buckets,   │   │  (environment,      │
//! │  alias record)  │   │   tables)           │   │   registry, tasks)  │
//! └─────────────────┘   └─────────────────────┘   └─────────────────────┘
//!          │                         │                         │
//!          └─────────────────────────┼─────────────────────────┘
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Resource Graph Builder                        │
//! │          (petgraph DAG, cycle checks, creation order)                │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Graph Document (JSON / YAML / DOT)                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use cubecobra_infra::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ConfigSet::from_file("cubecobra.toml")?;
//!     let params = StackParams::resolve(&config, "production", "1.0.2", Secrets::from_env())?;
//!
//!     let stack = Stack::assemble(&params)?;
//!     println!("{}", stack.document().to_json()?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Configuration
    pub use crate::config::{ConfigSet, DeploymentTarget, EnvironmentConfig, Secrets};

    // Error handling
    pub use crate::error::{Error, Result};

    // Resource graph
    pub use crate::graph::{
        GraphBuilder, GraphDocument, NodeHandle, OutputRef, ResourceGraph, ResourceKind,
        ResourceNode, Scope,
    };

    // Constructs
    pub use crate::resources::Construct;

    // Stacks
    pub use crate::stack::{EnvironmentVariables, Stack, StackParams};
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases.
///
/// Every error is raised while the graph is declared; see
/// [`Error::exit_code`](error::Error::exit_code) for the CLI mapping.
pub mod error;

/// The declarative resource graph: nodes, edges, scopes and rendering.
pub mod graph;

// ============================================================================
// Resources
// ============================================================================

/// Typed constructors for every resource kind.
pub mod resources;

/// Stack assembly for a named environment.
pub mod stack;

// ============================================================================
// Configuration
// ============================================================================

pub mod config;

// ============================================================================
// Version Information
// ============================================================================

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
