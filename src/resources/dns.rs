//! Apex alias record.

use super::certificate::validate_domain;
use super::Construct;
use crate::error::{Error, Result};
use crate::graph::{
    AttrValue, GraphBuilder, NodeHandle, OutputRef, ResourceKind, ResourceNode, Scope,
};

/// Hosted zone of the regional application load balancers, used as the
/// alias target zone for records pointing at a load-balanced environment.
pub fn load_balancer_zone_id(region: &str) -> Result<&'static str> {
    match region {
        "us-east-1" => Ok("Z35SXDOTRQ7X7K"),
        "us-east-2" => Ok("Z3AADJGX6KTTL2"),
        "us-west-1" => Ok("Z368ELLRRE2KJ0"),
        "us-west-2" => Ok("Z1H1FL5HABSF5"),
        other => Err(Error::UnsupportedRegion(other.to_string())),
    }
}

/// `A` alias record for the apex domain
#[derive(Debug, Clone)]
pub struct AliasRecordProps {
    /// Record name
    pub domain: String,
    /// Zone the record lives in
    pub zone: NodeHandle,
    /// Hostname the alias resolves to
    pub target: OutputRef,
    /// Region of the load balancer behind `target`
    pub region: String,
}

impl Construct for AliasRecordProps {
    type Handle = NodeHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<NodeHandle> {
        validate_domain(&self.domain)?;
        let alias_zone = load_balancer_zone_id(&self.region)?;

        builder.add_node(
            ResourceNode::new(scope.node_id("ConsoleAliasRecord")?, ResourceKind::DnsRecord)
                .with_attr("HostedZoneId", self.zone.reference())
                .with_attr("Name", self.domain)
                .with_attr("Type", "A")
                .with_attr(
                    "AliasTarget",
                    AttrValue::map([
                        ("DNSName", AttrValue::from(self.target)),
                        ("HostedZoneId", AttrValue::from(alias_zone)),
                    ]),
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_ids() {
        assert_eq!(load_balancer_zone_id("us-east-1").unwrap(), "Z35SXDOTRQ7X7K");
        assert_eq!(load_balancer_zone_id("us-east-2").unwrap(), "Z3AADJGX6KTTL2");
        assert!(matches!(
            load_balancer_zone_id("mars-north-1"),
            Err(Error::UnsupportedRegion(_))
        ));
    }

    #[test]
    fn test_alias_record_points_at_target() {
        let mut builder = GraphBuilder::new("Test");
        let zone = builder
            .add_node(
                ResourceNode::new("Zone", ResourceKind::HostedZone)
                    .imported()
                    .with_attr("DomainName", "example.com"),
            )
            .unwrap();
        let env = builder
            .add_node(ResourceNode::new("Env", ResourceKind::ComputeEnvironment))
            .unwrap();

        let record = AliasRecordProps {
            domain: "example.com".into(),
            zone,
            target: env.output("EndpointURL"),
            region: "us-east-2".into(),
        }
        .declare(&mut builder, &Scope::root().child("Route53").unwrap())
        .unwrap();

        let graph = builder.finish().unwrap();
        let node = graph.node(record.id()).unwrap();
        assert_eq!(node.attr("Name").unwrap().as_str(), Some("example.com"));
        assert_eq!(node.attr("Type").unwrap().as_str(), Some("A"));
        assert_eq!(
            node.attr("AliasTarget").unwrap().get("HostedZoneId").unwrap().as_str(),
            Some("Z3AADJGX6KTTL2")
        );
        assert!(graph.has_edge(record.id(), "Env"));
        assert!(graph.has_edge(record.id(), "Zone"));
    }
}
