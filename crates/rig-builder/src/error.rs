//! Error types for build operations.

use rig_core::RigError;
use rig_graph::GraphError;
use thiserror::Error;

/// Errors that abort a build.
///
/// All of them are programmer or configuration errors: there is no retry and
/// no partial build. Variants about a graph entity carry its full path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// A node, constraint or operator kind has no dispatch case.
    #[error("{what} '{path}' has an unsupported type: {kind}")]
    UnsupportedKind {
        what: &'static str,
        kind: String,
        path: String,
    },

    #[error("Component connection '{path}' is invalid: {reason}")]
    InvalidConnection { path: String, reason: String },

    #[error("Invalid location '{location}' on: {path}")]
    InvalidLocation { location: String, path: String },

    #[error("Unresolvable token '{token}' used on: {path}")]
    UnresolvableToken { token: String, path: String },

    /// A pass dereferenced something no earlier pass registered.
    #[error("{what} '{path}' has not been built")]
    UnbuiltReference { what: &'static str, path: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type BuildResult<T> = Result<T, BuildError>;

impl BuildError {
    /// Convenience for backends reporting host failures.
    pub fn backend(message: impl Into<String>) -> Self {
        BuildError::Backend {
            message: message.into(),
        }
    }
}

impl From<BuildError> for RigError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::Graph(graph) => graph.into(),
            BuildError::Backend { message } => RigError::InvalidArg { what: message },
            other => RigError::Invariant {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BuildError::UnsupportedKind {
            what: "node",
            kind: "Mesh".into(),
            path: "Bob.geo.body".into(),
        };
        let text = err.to_string();
        assert!(text.contains("Mesh"));
        assert!(text.contains("Bob.geo.body"));
    }

    #[test]
    fn error_conversion() {
        let err = BuildError::backend("host refused");
        let rig_err: RigError = err.into();
        assert!(matches!(rig_err, RigError::InvalidArg { .. }));
    }
}
