//! Error types for cubecobra-infra.
//!
//! Every error raised here happens while the resource graph is being
//! declared. Nothing in this crate talks to the cloud, so there are no
//! apply-time failures to model.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cubecobra-infra operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for cubecobra-infra.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The requested environment is not part of the configuration set.
    #[error("Environment '{0}' not found in configuration")]
    UnknownEnvironment(String),

    /// The application version label was empty.
    #[error("Version label must not be empty")]
    EmptyVersion,

    /// A required parameter was missing or blank.
    #[error("Missing required parameter '{field}' for {resource}")]
    MissingParameter {
        /// Resource or component that needs the parameter
        resource: String,
        /// Parameter name
        field: String,
    },

    /// A parameter was present but malformed.
    #[error("Invalid value for '{field}': {message}")]
    InvalidParameter {
        /// Parameter name
        field: String,
        /// Error message
        message: String,
    },

    /// Scheduled job declared without explicit memory or CPU sizing.
    #[error("Scheduled job '{job}' must declare {field} explicitly")]
    MissingJobSizing {
        /// Job name
        job: String,
        /// Missing sizing field
        field: String,
    },

    /// Schedule expression could not be parsed.
    #[error("Invalid schedule expression '{0}'")]
    InvalidSchedule(String),

    /// Region has no known load balancer hosted zone.
    #[error("Region '{0}' is not supported")]
    UnsupportedRegion(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // ========================================================================
    // Graph Errors
    // ========================================================================
    /// Two nodes were declared with the same identifier.
    #[error("Resource '{0}' is already declared in this graph")]
    DuplicateResource(String),

    /// A dependency or reference names a node that does not exist.
    #[error("Resource '{0}' is not declared in this graph")]
    UnknownResource(String),

    /// Adding an edge would make the graph cyclic.
    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    /// A stateful resource was declared without the retain policy.
    #[error("Resource '{id}' of kind {kind} must be retained on delete")]
    RetainRequired {
        /// Resource identifier
        id: String,
        /// Resource kind
        kind: String,
    },

    /// Two stack outputs share a name.
    #[error("Output '{0}' is already declared in this stack")]
    DuplicateOutput(String),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new missing parameter error.
    pub fn missing_parameter(resource: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingParameter {
            resource: resource.into(),
            field: field.into(),
        }
    }

    /// Creates a new invalid parameter error.
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error was caused by configuration rather than
    /// by the graph being declared.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownEnvironment(_)
                | Error::EmptyVersion
                | Error::MissingParameter { .. }
                | Error::InvalidParameter { .. }
                | Error::MissingJobSizing { .. }
                | Error::InvalidSchedule(_)
                | Error::UnsupportedRegion(_)
                | Error::Config(_)
                | Error::ConfigNotFound(_)
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::DuplicateResource(_)
            | Error::UnknownResource(_)
            | Error::DependencyCycle(_)
            | Error::RetainRequired { .. }
            | Error::DuplicateOutput(_) => 3,
            e if e.is_config_error() => 2,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::Other {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::UnknownEnvironment("production".into()).exit_code(), 2);
        assert_eq!(Error::EmptyVersion.exit_code(), 2);
        assert_eq!(Error::DuplicateResource("Table".into()).exit_code(), 3);
        assert_eq!(
            Error::Other {
                message: "boom".into(),
                source: None
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_context_wraps_source() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.context("reading config").unwrap_err();
        assert_eq!(err.to_string(), "reading config");
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_config_error());
        assert_eq!(err.exit_code(), 1);
    }
}
