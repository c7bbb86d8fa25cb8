//! Construct scopes.
//!
//! A scope is the path under which a constructor declares its nodes, e.g.
//! `ECR` for the registry construct. Node identifiers are the scope path
//! joined with the local name: `ECR/EcrRepository`.

use crate::error::{Error, Result};

/// Separator between path segments in node identifiers
pub const PATH_SEPARATOR: char = '/';

/// Ownership scope handed to resource constructors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    segments: Vec<String>,
}

impl Scope {
    /// The stack root
    pub fn root() -> Self {
        Self::default()
    }

    /// Open a nested scope
    pub fn child(&self, name: &str) -> Result<Self> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Identifier of a node declared in this scope
    pub fn node_id(&self, name: &str) -> Result<String> {
        validate_segment(name)?;
        if self.segments.is_empty() {
            return Ok(name.to_string());
        }
        let sep = PATH_SEPARATOR.to_string();
        Ok(format!("{}{}{}", self.segments.join(&sep), sep, name))
    }
}

fn validate_segment(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_parameter("scope", "name must not be empty"));
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(Error::invalid_parameter(
            "scope",
            format!("name '{}' must not contain '{}'", name, PATH_SEPARATOR),
        ));
    }
    Ok(())
}
