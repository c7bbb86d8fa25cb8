//! Resource nodes and attribute values.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute mapping of a resource node, kept in declaration order.
pub type Attributes = IndexMap<String, AttrValue>;

/// Kind of infrastructure a node declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Existing DNS hosted zone, looked up by domain name
    HostedZone,
    /// TLS certificate validated through DNS
    Certificate,
    /// DNS alias record
    DnsRecord,
    /// IAM role
    Role,
    /// Instance profile wrapping a role
    InstanceProfile,
    /// OpenID Connect identity provider
    OidcProvider,
    /// Object storage bucket
    Bucket,
    /// Key-value data table
    Table,
    /// Container image registry
    Registry,
    /// Managed application container for compute environments
    Application,
    /// Deployable version of an application
    ApplicationVersion,
    /// Managed compute environment serving the web application
    ComputeEnvironment,
    /// Container cluster shared by scheduled tasks
    Cluster,
    /// Container task definition
    TaskDefinition,
    /// Time-based trigger rule running a task definition
    ScheduledTask,
}

impl ResourceKind {
    /// Provider resource type used in the rendered graph document
    pub fn provider_type(&self) -> &'static str {
        match self {
            ResourceKind::HostedZone => "AWS::Route53::HostedZone",
            ResourceKind::Certificate => "AWS::CertificateManager::Certificate",
            ResourceKind::DnsRecord => "AWS::Route53::RecordSet",
            ResourceKind::Role => "AWS::IAM::Role",
            ResourceKind::InstanceProfile => "AWS::IAM::InstanceProfile",
            ResourceKind::OidcProvider => "AWS::IAM::OIDCProvider",
            ResourceKind::Bucket => "AWS::S3::Bucket",
            ResourceKind::Table => "AWS::DynamoDB::Table",
            ResourceKind::Registry => "AWS::ECR::Repository",
            ResourceKind::Application => "AWS::ElasticBeanstalk::Application",
            ResourceKind::ApplicationVersion => "AWS::ElasticBeanstalk::ApplicationVersion",
            ResourceKind::ComputeEnvironment => "AWS::ElasticBeanstalk::Environment",
            ResourceKind::Cluster => "AWS::ECS::Cluster",
            ResourceKind::TaskDefinition => "AWS::ECS::TaskDefinition",
            ResourceKind::ScheduledTask => "AWS::Events::Rule",
        }
    }

    /// Kinds that hold user data and must never be deleted by a graph diff
    pub fn is_stateful(&self) -> bool {
        matches!(self, ResourceKind::Bucket | ResourceKind::Table)
    }

    /// Short name used in logs and plans
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::HostedZone => "HostedZone",
            ResourceKind::Certificate => "Certificate",
            ResourceKind::DnsRecord => "DnsRecord",
            ResourceKind::Role => "Role",
            ResourceKind::InstanceProfile => "InstanceProfile",
            ResourceKind::OidcProvider => "OidcProvider",
            ResourceKind::Bucket => "Bucket",
            ResourceKind::Table => "Table",
            ResourceKind::Registry => "Registry",
            ResourceKind::Application => "Application",
            ResourceKind::ApplicationVersion => "ApplicationVersion",
            ResourceKind::ComputeEnvironment => "ComputeEnvironment",
            ResourceKind::Cluster => "Cluster",
            ResourceKind::TaskDefinition => "TaskDefinition",
            ResourceKind::ScheduledTask => "ScheduledTask",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the apply engine does when a node disappears from the declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Keep the live resource, only forget it
    Retain,
    /// Delete the live resource
    Destroy,
}

/// Whether the apply engine owns the node or only looks it up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOrigin {
    /// Created, updated and deleted by the apply engine
    Managed,
    /// Pre-existing resource referenced by name
    Imported,
}

/// Reference to an output attribute of another node.
///
/// The value only exists once the apply engine has created the node, so a
/// reference is also an implicit dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    /// Identifier of the referenced node
    pub node: String,
    /// Output attribute name
    pub attribute: String,
}

impl OutputRef {
    /// Attribute name for the node's primary identifier
    pub const REF: &'static str = "Ref";

    /// Create a new output reference
    pub fn new(node: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.node, self.attribute)
    }
}

/// A value in a node's attribute mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// String
    Str(String),
    /// Ordered list
    List(Vec<AttrValue>),
    /// Output attribute of another node
    Ref {
        /// The referenced output
        #[serde(rename = "ref")]
        target: OutputRef,
    },
    /// Nested mapping
    Map(IndexMap<String, AttrValue>),
}

impl AttrValue {
    /// Build a nested mapping from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<AttrValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        AttrValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list of strings
    pub fn strings<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        AttrValue::List(items.into_iter().map(|s| AttrValue::Str(s.into())).collect())
    }

    /// Get the string value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get a nested value by key, if this is a mapping
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        match self {
            AttrValue::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Collect every output reference contained in this value
    pub fn refs(&self) -> Vec<&OutputRef> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a OutputRef>) {
        match self {
            AttrValue::Ref { target } => out.push(target),
            AttrValue::List(items) => items.iter().for_each(|v| v.collect_refs(out)),
            AttrValue::Map(m) => m.values().for_each(|v| v.collect_refs(out)),
            AttrValue::Bool(_) | AttrValue::Int(_) | AttrValue::Str(_) => {}
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<&String> for AttrValue {
    fn from(s: &String) -> Self {
        AttrValue::Str(s.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Int(i64::from(n))
    }
}

impl From<OutputRef> for AttrValue {
    fn from(target: OutputRef) -> Self {
        AttrValue::Ref { target }
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(items: Vec<AttrValue>) -> Self {
        AttrValue::List(items)
    }
}

impl From<IndexMap<String, AttrValue>> for AttrValue {
    fn from(m: IndexMap<String, AttrValue>) -> Self {
        AttrValue::Map(m)
    }
}

/// One declared unit of infrastructure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNode {
    /// Unique identifier within the graph
    pub id: String,
    /// Resource kind
    pub kind: ResourceKind,
    /// Managed or imported
    pub origin: NodeOrigin,
    /// Behavior when removed from the declaration
    pub removal_policy: RemovalPolicy,
    /// Declared attributes
    pub attributes: Attributes,
    /// Resource tags
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,
    /// Explicit dependencies declared by the constructor
    #[serde(skip)]
    pub depends_on: Vec<String>,
}

impl ResourceNode {
    /// Create a new managed node.
    ///
    /// Stateful kinds start out retained; everything else is destroyed
    /// when removed from the declaration.
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        let removal_policy = if kind.is_stateful() {
            RemovalPolicy::Retain
        } else {
            RemovalPolicy::Destroy
        };
        Self {
            id: id.into(),
            kind,
            origin: NodeOrigin::Managed,
            removal_policy,
            attributes: Attributes::new(),
            tags: IndexMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Mark the node as a lookup of an existing resource
    pub fn imported(mut self) -> Self {
        self.origin = NodeOrigin::Imported;
        self
    }

    /// Set the removal policy
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// Add an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Declare an explicit dependency on another node
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Get an attribute by key
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Every output reference in this node's attributes
    pub fn refs(&self) -> Vec<&OutputRef> {
        self.attributes.values().flat_map(AttrValue::refs).collect()
    }
}
