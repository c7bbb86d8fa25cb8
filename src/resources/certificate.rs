//! Hosted zone lookup and DNS-validated certificate.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{require, Construct};
use crate::error::{Error, Result};
use crate::graph::{
    AttrValue, GraphBuilder, NodeHandle, OutputRef, ResourceKind, ResourceNode, Scope,
};

/// Bare domain name, no scheme or path
static DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}$")
        .expect("Invalid domain regex")
});

/// Check that a string looks like a bare domain name
pub(crate) fn validate_domain(domain: &str) -> Result<()> {
    require("certificate", "domain", domain)?;
    if !DOMAIN_REGEX.is_match(domain) {
        return Err(Error::invalid_parameter(
            "domain",
            format!("'{}' is not a domain name", domain),
        ));
    }
    Ok(())
}

/// Lookup of the existing hosted zone for a domain
#[derive(Debug, Clone)]
pub struct HostedZoneProps {
    /// Domain the zone serves
    pub domain: String,
}

impl Construct for HostedZoneProps {
    type Handle = NodeHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<NodeHandle> {
        validate_domain(&self.domain)?;
        builder.add_node(
            ResourceNode::new(scope.node_id("Zone")?, ResourceKind::HostedZone)
                .imported()
                .with_attr("DomainName", self.domain),
        )
    }
}

/// Certificate for a domain and its `www.` alias
#[derive(Debug, Clone)]
pub struct CertificateProps {
    /// Apex domain
    pub domain: String,
    /// Zone used for DNS validation
    pub zone: NodeHandle,
}

/// Handle to a declared certificate
#[derive(Debug, Clone)]
pub struct CertificateHandle {
    node: NodeHandle,
    names: Vec<String>,
}

impl CertificateHandle {
    /// Certificate node
    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Apex domain
    pub fn domain(&self) -> &str {
        &self.names[0]
    }

    /// Every name the certificate covers, apex first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Certificate ARN, known after apply
    pub fn arn(&self) -> OutputRef {
        self.node.reference()
    }
}

impl Construct for CertificateProps {
    type Handle = CertificateHandle;

    fn declare(self, builder: &mut GraphBuilder, scope: &Scope) -> Result<CertificateHandle> {
        validate_domain(&self.domain)?;
        if self.zone.kind() != ResourceKind::HostedZone {
            return Err(Error::invalid_parameter(
                "zone",
                format!("'{}' is not a hosted zone", self.zone.id()),
            ));
        }

        let names = vec![self.domain.clone(), format!("www.{}", self.domain)];
        let validation: Vec<AttrValue> = names
            .iter()
            .map(|name| {
                AttrValue::map([
                    ("DomainName", AttrValue::from(name)),
                    ("HostedZoneId", self.zone.reference().into()),
                ])
            })
            .collect();

        let node = builder.add_node(
            ResourceNode::new(scope.node_id("ConsoleCertificate")?, ResourceKind::Certificate)
                .with_attr("DomainName", &self.domain)
                .with_attr("SubjectAlternativeNames", AttrValue::strings(&names[1..]))
                .with_attr("ValidationMethod", "DNS")
                .with_attr("DomainValidationOptions", validation),
        )?;

        Ok(CertificateHandle { node, names })
    }
}
