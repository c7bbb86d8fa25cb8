//! Stack assembly.
//!
//! A [`Stack`] is one named environment declared end to end: certificate,
//! access, storage, registry, compute, DNS and scheduled jobs, in that
//! order, followed by the stack outputs. Every parameter is checked by
//! [`StackParams::validate`] before the first node is declared, so a
//! rejected configuration never yields a partial graph.

pub mod environment;

use tracing::{debug, info, warn};

use crate::config::{ConfigSet, DeploymentTarget, EnvironmentConfig, Secrets};
use crate::error::{Error, Result};
use crate::graph::{GraphBuilder, GraphDocument, ResourceGraph, Scope};
use crate::resources::certificate::validate_domain;
use crate::resources::iam::validate_repository;
use crate::resources::{
    default_tables, job_output_name, load_balancer_zone_id, validate_job, AliasRecordProps,
    BucketRefProps, CertificateProps, ClusterProps, Construct, GitHubOidcProps, HostedZoneProps,
    InstanceRoleProps, RegistryProps, ScheduledJobProps, TablesProps, WebEnvironmentProps,
};

pub use environment::{EnvironmentVariables, ENVIRONMENT_KEYS};

/// Output names the stack declares itself. Job outputs share the same
/// namespace and must not collide with these.
pub const ECR_REPOSITORY_URI_OUTPUT: &str = "EcrRepositoryUri";
pub const INSTANCE_ROLE_ARN_OUTPUT: &str = "InstanceRoleArn";
pub const ENVIRONMENT_ENDPOINT_OUTPUT: &str = "EnvironmentEndpoint";
pub const GITHUB_ACTIONS_ROLE_ARN_OUTPUT: &str = "GitHubActionsRoleArn";

pub const STACK_OUTPUTS: [&str; 4] = [
    ECR_REPOSITORY_URI_OUTPUT,
    INSTANCE_ROLE_ARN_OUTPUT,
    ENVIRONMENT_ENDPOINT_OUTPUT,
    GITHUB_ACTIONS_ROLE_ARN_OUTPUT,
];

/// Stack name for an environment without an explicit `stack_name`:
/// `production` -> `CubeCobraProductionStack`
pub fn default_stack_name(environment: &str) -> String {
    let pascal: String = environment
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    format!("CubeCobra{}Stack", pascal)
}

/// Everything needed to declare one stack
#[derive(Debug, Clone)]
pub struct StackParams {
    /// Stack name
    pub stack_name: String,
    /// Application version label
    pub version: String,
    /// Environment configuration
    pub environment: EnvironmentConfig,
    /// Secrets read at the entry point
    pub secrets: Secrets,
}

impl StackParams {
    /// Resolve a named environment from the configuration set
    pub fn resolve(
        config: &ConfigSet,
        environment: &str,
        version: &str,
        secrets: Secrets,
    ) -> Result<Self> {
        let env = config.resolve(environment)?;
        if version.trim().is_empty() {
            return Err(Error::EmptyVersion);
        }
        let stack_name = env
            .stack_name
            .clone()
            .unwrap_or_else(|| default_stack_name(environment));

        Ok(Self {
            stack_name,
            version: version.to_string(),
            environment: env.clone(),
            secrets,
        })
    }

    /// Check every parameter the constructors will need
    pub fn validate(&self) -> Result<()> {
        let env = &self.environment;
        if self.version.trim().is_empty() {
            return Err(Error::EmptyVersion);
        }

        let required = [
            ("stack_name", &self.stack_name),
            ("environment_name", &env.environment_name),
            ("app_bucket", &env.app_bucket),
            ("data_bucket", &env.data_bucket),
            ("log_group", &env.log_group),
            ("log_stream", &env.log_stream),
            ("dynamo_prefix", &env.dynamo_prefix),
            ("target.account", &env.target.account),
            ("target.region", &env.target.region),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::missing_parameter("stack", field));
            }
        }

        validate_domain(&env.domain)?;
        load_balancer_zone_id(&env.target.region)?;
        if env.fleet_size == 0 || env.fleet_size == u32::MAX {
            return Err(Error::invalid_parameter(
                "fleet_size",
                format!("{} is out of range", env.fleet_size),
            ));
        }
        if let Some(repo) = &env.github_repository {
            validate_repository(repo)?;
        }
        for (name, job) in &env.jobs {
            validate_job(name, job.memory_limit_mib, job.cpu, &job.schedule)?;
            let output = job_output_name(name);
            if STACK_OUTPUTS.contains(&output.as_str()) {
                return Err(Error::invalid_parameter(
                    "jobs",
                    format!("job '{}' output '{}' collides with a stack output", name, output),
                ));
            }
        }
        Ok(())
    }
}

/// A fully declared stack
#[derive(Debug, Clone)]
pub struct Stack {
    target: DeploymentTarget,
    graph: ResourceGraph,
}

impl Stack {
    /// Validate the parameters and declare every resource of the stack
    pub fn assemble(params: &StackParams) -> Result<Self> {
        params.validate()?;
        let env = &params.environment;
        info!(
            stack = %params.stack_name,
            environment = %env.environment_name,
            version = %params.version,
            "assembling stack"
        );

        let mut builder = GraphBuilder::new(&params.stack_name);
        let root = Scope::root();

        // DNS zone and certificate
        let certificates = root.child("Certificates")?;
        let zone = HostedZoneProps {
            domain: env.domain.clone(),
        }
        .declare(&mut builder, &certificates)?;
        let certificate = CertificateProps {
            domain: env.domain.clone(),
            zone: zone.clone(),
        }
        .declare(&mut builder, &certificates)?;

        let instance_role = InstanceRoleProps::default().declare(&mut builder, &root)?;

        // Buckets predate the stack
        let _data_bucket = BucketRefProps {
            id: "DataBucket".into(),
            bucket_name: env.data_bucket.clone(),
        }
        .declare(&mut builder, &root)?;
        let app_bucket = BucketRefProps {
            id: "AppBucket".into(),
            bucket_name: env.app_bucket.clone(),
        }
        .declare(&mut builder, &root)?;

        if env.create_tables {
            TablesProps {
                prefix: env.dynamo_prefix.clone(),
                tables: default_tables(),
            }
            .declare(&mut builder, &root.child("DynamodbTables")?)?;
        } else {
            debug!(prefix = %env.dynamo_prefix, "using existing tables");
        }

        let registry = RegistryProps::default().declare(&mut builder, &root.child("ECR")?)?;

        let federation = match &env.github_repository {
            Some(repo) => Some(
                GitHubOidcProps {
                    repositories: vec![repo.clone()],
                    registry: Some(registry.node().clone()),
                }
                .declare(&mut builder, &root)?,
            ),
            None => {
                warn!("no github_repository configured, skipping CI federation");
                None
            }
        };

        let web = WebEnvironmentProps {
            environment_name: env.environment_name.clone(),
            version: params.version.clone(),
            app_bucket,
            certificate_arn: certificate.arn(),
            instance_profile: instance_role.profile.clone(),
            fleet_size: env.fleet_size,
            instance_type: env.instance_type.clone(),
            solution_stack: env.solution_stack.clone(),
            variables: EnvironmentVariables::from_params(params).into_map(),
        }
        .declare(&mut builder, &root.child("ElasticBeanstalk")?)?;

        AliasRecordProps {
            domain: env.domain.clone(),
            zone,
            target: web.endpoint_url(),
            region: env.target.region.clone(),
        }
        .declare(&mut builder, &root.child("Route53")?)?;

        if !env.jobs.is_empty() {
            let cluster = ClusterProps::default().declare(&mut builder, &root)?;
            for (name, job) in &env.jobs {
                ScheduledJobProps {
                    name: name.clone(),
                    command: job.command.clone(),
                    schedule: job.schedule.clone(),
                    memory_limit_mib: job.memory_limit_mib,
                    cpu: job.cpu,
                    cluster: cluster.clone(),
                    registry: registry.clone(),
                }
                .declare(&mut builder, &root.child(name)?)?;
            }
        }

        builder.add_output(
            ECR_REPOSITORY_URI_OUTPUT,
            registry.uri(),
            "ECR repository URI for container images",
        )?;
        builder.add_output(
            INSTANCE_ROLE_ARN_OUTPUT,
            instance_role.role_arn(),
            "Role assumed by the web instances",
        )?;
        builder.add_output(
            ENVIRONMENT_ENDPOINT_OUTPUT,
            web.endpoint_url(),
            "Load balancer endpoint of the web environment",
        )?;
        if let Some(federation) = &federation {
            builder.add_output(
                GITHUB_ACTIONS_ROLE_ARN_OUTPUT,
                federation.role_arn(),
                "Role GitHub Actions assumes to push images",
            )?;
        }

        let graph = builder.finish()?;
        info!(
            stack = %graph.name(),
            resources = graph.node_count(),
            edges = graph.edge_count(),
            "stack assembled"
        );

        Ok(Self {
            target: env.target.clone(),
            graph,
        })
    }

    /// Stack name
    pub fn name(&self) -> &str {
        self.graph.name()
    }

    /// Deployment target
    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    /// The completed resource graph
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Render the graph document
    pub fn document(&self) -> GraphDocument {
        GraphDocument::new(&self.graph, &self.target)
    }
}
