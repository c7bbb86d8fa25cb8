//! Resource constructors.
//!
//! Each constructor takes a typed props struct and an ownership [`Scope`],
//! validates its props, and appends its nodes to a [`GraphBuilder`]. The
//! returned handle exposes the node identifiers and the output references
//! that later constructors wire into their own attributes.
//!
//! ## Available Constructs
//!
//! - [`HostedZoneProps`] / [`CertificateProps`]: DNS zone lookup and TLS certificate
//! - [`AliasRecordProps`]: apex alias record pointing at the compute environment
//! - [`InstanceRoleProps`]: instance role and instance profile
//! - [`GitHubOidcProps`]: OIDC provider and federated CI role
//! - [`BucketRefProps`]: references to existing buckets
//! - [`TablesProps`]: data tables with secondary indexes
//! - [`RegistryProps`]: container image registry
//! - [`WebEnvironmentProps`]: application, version and compute environment
//! - [`ClusterProps`] / [`ScheduledJobProps`]: scheduled container jobs
//!
//! Constructors never touch the cloud. Calling one twice in the same scope
//! fails with [`Error::DuplicateResource`](crate::error::Error::DuplicateResource).

pub mod certificate;
pub mod compute;
pub mod dns;
pub mod iam;
pub mod registry;
pub mod scheduled;
pub mod storage;
pub mod table;

use crate::error::Result;
use crate::graph::{GraphBuilder, Scope};

pub use certificate::{CertificateHandle, CertificateProps, HostedZoneProps};
pub use compute::{WebEnvironmentHandle, WebEnvironmentProps};
pub use dns::{load_balancer_zone_id, AliasRecordProps};
pub use iam::{GitHubOidcHandle, GitHubOidcProps, InstanceRoleHandle, InstanceRoleProps};
pub use registry::{RegistryHandle, RegistryProps};
pub use scheduled::{
    job_output_name, validate_job, ClusterProps, RateUnit, Schedule, ScheduledJobHandle,
    ScheduledJobProps,
};
pub use storage::{BucketHandle, BucketRefProps};
pub use table::{default_tables, IndexDefinition, TableDefinition, TablesProps};

/// A typed set of props that knows how to declare its resources
pub trait Construct {
    /// Handle returned to the caller
    type Handle;

    /// Validate the props and declare the construct's nodes
    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<Self::Handle>;
}

/// Reject a blank required field
pub(crate) fn require(resource: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(crate::error::Error::missing_parameter(resource, field));
    }
    Ok(())
}
