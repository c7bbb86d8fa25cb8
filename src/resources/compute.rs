//! Web application, its deployable version and the load-balanced compute
//! environment serving it.

use indexmap::IndexMap;
use tracing::debug;

use super::{require, BucketHandle, Construct};
use crate::error::{Error, Result};
use crate::graph::{
    AttrValue, GraphBuilder, NodeHandle, OutputRef, ResourceKind, ResourceNode, Scope,
};

/// Namespace of application environment variables in the option settings
pub const APPLICATION_ENVIRONMENT_NAMESPACE: &str = "aws:elasticbeanstalk:application:environment";

/// Path the load balancer probes
pub const HEALTH_CHECK_PATH: &str = "/healthcheck";

/// Application, version and environment
#[derive(Debug, Clone)]
pub struct WebEnvironmentProps {
    /// Environment name, e.g. `cubecobra-prod`
    pub environment_name: String,
    /// Version label of the bundle to deploy
    pub version: String,
    /// Bucket holding `builds/{version}.zip`
    pub app_bucket: BucketHandle,
    /// Certificate served by the HTTPS listener
    pub certificate_arn: OutputRef,
    /// Instance profile attached to the instances
    pub instance_profile: NodeHandle,
    /// Minimum instance count; the maximum is one more
    pub fleet_size: u32,
    /// Instance type
    pub instance_type: String,
    /// Platform name
    pub solution_stack: String,
    /// Application environment variables, emitted in order
    pub variables: IndexMap<String, String>,
}

/// Handle to the declared environment
#[derive(Debug, Clone)]
pub struct WebEnvironmentHandle {
    /// Application node
    pub application: NodeHandle,
    /// Application version node
    pub version: NodeHandle,
    /// Environment node
    pub environment: NodeHandle,
}

impl WebEnvironmentHandle {
    /// Public endpoint of the environment's load balancer, known after apply
    pub fn endpoint_url(&self) -> OutputRef {
        self.environment.output("EndpointURL")
    }
}

fn setting(namespace: &str, name: &str, value: impl Into<AttrValue>) -> AttrValue {
    AttrValue::map([
        ("Namespace", AttrValue::from(namespace)),
        ("OptionName", AttrValue::from(name)),
        ("Value", value.into()),
    ])
}

impl WebEnvironmentProps {
    fn validate(&self) -> Result<()> {
        require("compute environment", "environment_name", &self.environment_name)?;
        require("compute environment", "version", &self.version)?;
        require("compute environment", "instance_type", &self.instance_type)?;
        require("compute environment", "solution_stack", &self.solution_stack)?;
        if self.fleet_size == 0 {
            return Err(Error::invalid_parameter(
                "fleet_size",
                "at least one instance is required",
            ));
        }
        Ok(())
    }

    fn option_settings(&self, max_size: u32) -> Vec<AttrValue> {
        let mut settings = vec![
            setting(
                "aws:autoscaling:launchconfiguration",
                "InstanceType",
                &self.instance_type,
            ),
            setting(
                "aws:autoscaling:launchconfiguration",
                "IamInstanceProfile",
                self.instance_profile.reference(),
            ),
            setting("aws:autoscaling:asg", "MinSize", self.fleet_size.to_string()),
            setting("aws:autoscaling:asg", "MaxSize", max_size.to_string()),
            setting(
                "aws:elasticbeanstalk:environment",
                "EnvironmentType",
                "LoadBalanced",
            ),
            setting(
                "aws:elasticbeanstalk:environment",
                "LoadBalancerType",
                "application",
            ),
            setting("aws:elbv2:listener:443", "ListenerEnabled", "true"),
            setting(
                "aws:elbv2:listener:443",
                "SSLCertificateArns",
                self.certificate_arn.clone(),
            ),
            setting("aws:elbv2:listener:443", "Protocol", "HTTPS"),
            setting(
                "aws:elasticbeanstalk:environment:process:default",
                "HealthCheckPath",
                HEALTH_CHECK_PATH,
            ),
            setting(
                "aws:elasticbeanstalk:command",
                "DeploymentPolicy",
                "Immutable",
            ),
        ];
        settings.extend(
            self.variables
                .iter()
                .map(|(key, value)| setting(APPLICATION_ENVIRONMENT_NAMESPACE, key, value)),
        );
        settings
    }
}

impl Construct for WebEnvironmentProps {
    type Handle = WebEnvironmentHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<WebEnvironmentHandle> {
        self.validate()?;
        let max_size = self.fleet_size.checked_add(1).ok_or_else(|| {
            Error::invalid_parameter("fleet_size", format!("{} is too large", self.fleet_size))
        })?;
        let settings = self.option_settings(max_size);

        let application = builder.add_node(
            ResourceNode::new(scope.node_id("Application")?, ResourceKind::Application)
                .with_attr(
                    "ApplicationName",
                    format!("CubeCobra-{}", self.environment_name),
                )
                .depends_on(self.instance_profile.id()),
        )?;

        let version = builder.add_node(
            ResourceNode::new(scope.node_id("AppVersion")?, ResourceKind::ApplicationVersion)
                .with_attr("ApplicationName", application.reference())
                .with_attr("Description", &self.version)
                .with_attr(
                    "SourceBundle",
                    AttrValue::map([
                        ("S3Bucket", self.app_bucket.name().to_string()),
                        ("S3Key", format!("builds/{}.zip", self.version)),
                    ]),
                )
                .depends_on(self.app_bucket.node().id()),
        )?;

        let environment = builder.add_node(
            ResourceNode::new(scope.node_id("Environment")?, ResourceKind::ComputeEnvironment)
                .with_attr("EnvironmentName", format!("{}-env", self.environment_name))
                .with_attr("ApplicationName", application.reference())
                .with_attr("SolutionStackName", &self.solution_stack)
                .with_attr("OptionSettings", settings)
                .with_attr("VersionLabel", version.reference()),
        )?;

        debug!(
            environment = %self.environment_name,
            version = %self.version,
            variables = self.variables.len(),
            "declared compute environment"
        );

        Ok(WebEnvironmentHandle {
            application,
            version,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{BucketRefProps, InstanceRoleProps};

    fn props(builder: &mut GraphBuilder, fleet_size: u32) -> WebEnvironmentProps {
        let bucket = BucketRefProps {
            id: "AppBucket".into(),
            bucket_name: "cubecobra".into(),
        }
        .declare(builder, &Scope::root())
        .unwrap();
        let role = InstanceRoleProps::default()
            .declare(builder, &Scope::root())
            .unwrap();
        let cert = builder
            .add_node(ResourceNode::new("Cert", ResourceKind::Certificate))
            .unwrap();

        let mut variables = IndexMap::new();
        variables.insert("PORT".to_string(), "8080".to_string());
        WebEnvironmentProps {
            environment_name: "cubecobra-prod".into(),
            version: "1.2.3".into(),
            app_bucket: bucket,
            certificate_arn: cert.output("Arn"),
            instance_profile: role.profile,
            fleet_size,
            instance_type: "t3.large".into(),
            solution_stack: "64bit Amazon Linux 2023 v6.4.0 running Node.js 20".into(),
            variables,
        }
    }

    fn option(node: &ResourceNode, namespace: &str, name: &str) -> Option<AttrValue> {
        match node.attr("OptionSettings") {
            Some(AttrValue::List(items)) => items
                .iter()
                .find(|s| {
                    s.get("Namespace").and_then(AttrValue::as_str) == Some(namespace)
                        && s.get("OptionName").and_then(AttrValue::as_str) == Some(name)
                })
                .and_then(|s| s.get("Value").cloned()),
            _ => None,
        }
    }

    #[test]
    fn test_environment_nodes_and_edges() {
        let mut builder = GraphBuilder::new("Test");
        let props = props(&mut builder, 1);
        let scope = Scope::root().child("ElasticBeanstalk").unwrap();
        let handle = props.declare(&mut builder, &scope).unwrap();
        assert_eq!(handle.environment.id(), "ElasticBeanstalk/Environment");

        let graph = builder.finish().unwrap();
        assert!(graph.has_edge("ElasticBeanstalk/Application", "InstanceProfile"));
        assert!(graph.has_edge("ElasticBeanstalk/AppVersion", "ElasticBeanstalk/Application"));
        assert!(graph.has_edge("ElasticBeanstalk/Environment", "ElasticBeanstalk/AppVersion"));
        assert!(graph.has_edge("ElasticBeanstalk/Environment", "Cert"));

        let app = graph.node("ElasticBeanstalk/Application").unwrap();
        assert_eq!(
            app.attr("ApplicationName").unwrap().as_str(),
            Some("CubeCobra-cubecobra-prod")
        );
        let version = graph.node("ElasticBeanstalk/AppVersion").unwrap();
        assert_eq!(
            version.attr("SourceBundle").unwrap().get("S3Key").unwrap().as_str(),
            Some("builds/1.2.3.zip")
        );
        let env = graph.node("ElasticBeanstalk/Environment").unwrap();
        assert_eq!(
            env.attr("EnvironmentName").unwrap().as_str(),
            Some("cubecobra-prod-env")
        );
    }

    #[test]
    fn test_fleet_size_bounds() {
        let mut builder = GraphBuilder::new("Test");
        let props = props(&mut builder, 3);
        props.declare(&mut builder, &Scope::root()).unwrap();
        let graph = builder.finish().unwrap();
        let env = graph.node("Environment").unwrap();
        assert_eq!(
            option(env, "aws:autoscaling:asg", "MinSize"),
            Some(AttrValue::from("3"))
        );
        assert_eq!(
            option(env, "aws:autoscaling:asg", "MaxSize"),
            Some(AttrValue::from("4"))
        );
        assert_eq!(
            option(env, "aws:elasticbeanstalk:environment:process:default", "HealthCheckPath"),
            Some(AttrValue::from("/healthcheck"))
        );
        assert_eq!(
            option(env, APPLICATION_ENVIRONMENT_NAMESPACE, "PORT"),
            Some(AttrValue::from("8080"))
        );
    }

    #[test]
    fn test_fleet_size_overflow_declares_nothing() {
        let mut builder = GraphBuilder::new("Test");
        let props = props(&mut builder, u32::MAX);
        let before = builder.node_count();
        let err = props.declare(&mut builder, &Scope::root()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
        assert_eq!(builder.node_count(), before);
    }

    #[test]
    fn test_empty_version_is_rejected() {
        let mut builder = GraphBuilder::new("Test");
        let mut props = props(&mut builder, 1);
        props.version = String::new();
        let err = props.declare(&mut builder, &Scope::root()).unwrap_err();
        assert!(matches!(err, Error::MissingParameter { .. }));
    }
}
