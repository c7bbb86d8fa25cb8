//! Access resources: instance role and profile, CI identity federation.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Construct;
use crate::error::{Error, Result};
use crate::graph::{
    AttrValue, GraphBuilder, NodeHandle, OutputRef, ResourceKind, ResourceNode, Scope,
};

/// Token issuer for GitHub Actions workloads
pub const GITHUB_OIDC_URL: &str = "https://token.actions.githubusercontent.com";

/// Audience GitHub Actions tokens are minted for
pub const STS_AUDIENCE: &str = "sts.amazonaws.com";

/// `owner/repo`
static REPOSITORY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("Invalid repository regex")
});

/// Check an `owner/repo` pattern
pub fn validate_repository(repository: &str) -> Result<()> {
    if !REPOSITORY_REGEX.is_match(repository) {
        return Err(Error::invalid_parameter(
            "github_repository",
            format!("'{}' is not of the form owner/repo", repository),
        ));
    }
    Ok(())
}

fn assume_role_policy(
    principal: AttrValue,
    action: &str,
    condition: Option<AttrValue>,
) -> AttrValue {
    let mut statement = vec![
        ("Effect", AttrValue::from("Allow")),
        ("Principal", principal),
        ("Action", AttrValue::from(action)),
    ];
    if let Some(condition) = condition {
        statement.push(("Condition", condition));
    }
    AttrValue::map([
        ("Version", AttrValue::from("2012-10-17")),
        ("Statement", AttrValue::List(vec![AttrValue::map(statement)])),
    ])
}

/// Role assumed by compute instances, wrapped in an instance profile
#[derive(Debug, Clone)]
pub struct InstanceRoleProps {
    /// Service principal allowed to assume the role
    pub service: String,
}

impl Default for InstanceRoleProps {
    fn default() -> Self {
        Self {
            service: "ec2.amazonaws.com".to_string(),
        }
    }
}

/// Handle to the instance role and its profile
#[derive(Debug, Clone)]
pub struct InstanceRoleHandle {
    /// Role node
    pub role: NodeHandle,
    /// Instance profile node
    pub profile: NodeHandle,
}

impl InstanceRoleHandle {
    /// Role ARN, known after apply
    pub fn role_arn(&self) -> OutputRef {
        self.role.output("Arn")
    }
}

impl Construct for InstanceRoleProps {
    type Handle = InstanceRoleHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<InstanceRoleHandle> {
        super::require("instance role", "service", &self.service)?;

        let role = builder.add_node(
            ResourceNode::new(scope.node_id("InstanceRole")?, ResourceKind::Role).with_attr(
                "AssumeRolePolicyDocument",
                assume_role_policy(
                    AttrValue::map([("Service", self.service)]),
                    "sts:AssumeRole",
                    None,
                ),
            ),
        )?;

        let profile = builder.add_node(
            ResourceNode::new(scope.node_id("InstanceProfile")?, ResourceKind::InstanceProfile)
                .with_attr("Roles", AttrValue::List(vec![role.reference().into()])),
        )?;

        Ok(InstanceRoleHandle { role, profile })
    }
}

/// OIDC provider plus a role CI workflows from the listed repositories may
/// assume to push images
#[derive(Debug, Clone)]
pub struct GitHubOidcProps {
    /// Allowed repositories, `owner/repo`
    pub repositories: Vec<String>,
    /// Registry the role may push to
    pub registry: Option<NodeHandle>,
}

/// Handle to the federation resources
#[derive(Debug, Clone)]
pub struct GitHubOidcHandle {
    /// Identity provider node
    pub provider: NodeHandle,
    /// Federated role node
    pub role: NodeHandle,
}

impl GitHubOidcHandle {
    /// Role ARN, known after apply
    pub fn role_arn(&self) -> OutputRef {
        self.role.output("Arn")
    }
}

impl Construct for GitHubOidcProps {
    type Handle = GitHubOidcHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<GitHubOidcHandle> {
        if self.repositories.is_empty() {
            return Err(Error::missing_parameter("github federation", "repositories"));
        }
        for repo in &self.repositories {
            validate_repository(repo)?;
        }

        let provider = builder.add_node(
            ResourceNode::new(scope.node_id("GitHubOidcProvider")?, ResourceKind::OidcProvider)
                .with_attr("Url", GITHUB_OIDC_URL)
                .with_attr("ClientIdList", AttrValue::strings([STS_AUDIENCE])),
        )?;

        let subjects: Vec<String> = self
            .repositories
            .iter()
            .map(|repo| format!("repo:{}:*", repo))
            .collect();
        let condition = AttrValue::map([
            (
                "StringEquals",
                AttrValue::map([("token.actions.githubusercontent.com:aud", STS_AUDIENCE)]),
            ),
            (
                "StringLike",
                AttrValue::map([(
                    "token.actions.githubusercontent.com:sub",
                    AttrValue::strings(subjects),
                )]),
            ),
        ]);

        let mut role = ResourceNode::new(scope.node_id("GitHubActionsRole")?, ResourceKind::Role)
            .with_attr(
                "AssumeRolePolicyDocument",
                assume_role_policy(
                    AttrValue::map([("Federated", AttrValue::from(provider.reference()))]),
                    "sts:AssumeRoleWithWebIdentity",
                    Some(condition),
                ),
            )
            .with_attr("Description", "Role for GitHub Actions to access ECR");

        if let Some(registry) = &self.registry {
            role = role.with_attr(
                "Policies",
                AttrValue::List(vec![AttrValue::map([
                    ("PolicyName", AttrValue::from("EcrPush")),
                    (
                        "PolicyDocument",
                        AttrValue::map([
                            ("Version", AttrValue::from("2012-10-17")),
                            (
                                "Statement",
                                AttrValue::List(vec![
                                    AttrValue::map([
                                        ("Effect", AttrValue::from("Allow")),
                                        (
                                            "Action",
                                            AttrValue::strings(["ecr:GetAuthorizationToken"]),
                                        ),
                                        ("Resource", AttrValue::from("*")),
                                    ]),
                                    AttrValue::map([
                                        ("Effect", AttrValue::from("Allow")),
                                        (
                                            "Action",
                                            AttrValue::strings([
                                                "ecr:BatchCheckLayerAvailability",
                                                "ecr:CompleteLayerUpload",
                                                "ecr:InitiateLayerUpload",
                                                "ecr:PutImage",
                                                "ecr:UploadLayerPart",
                                            ]),
                                        ),
                                        ("Resource", registry.output("Arn").into()),
                                    ]),
                                ]),
                            ),
                        ]),
                    ),
                ])]),
            );
        }

        let role = builder.add_node(role)?;
        Ok(GitHubOidcHandle { provider, role })
    }
}
