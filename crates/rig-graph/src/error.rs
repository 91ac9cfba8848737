//! Graph-specific error types.

use rig_core::{AttrId, ConstraintId, NodeId, OperatorId, PortId, RigError};
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {node} does not exist")]
    InvalidNodeRef { node: NodeId },

    #[error("Constraint {constraint} does not exist")]
    MissingConstraint { constraint: ConstraintId },

    #[error("Operator {operator} does not exist")]
    MissingOperator { operator: OperatorId },

    #[error("Port {port} refers to non-existent {what}")]
    InvalidPortRef { port: PortId, what: &'static str },

    #[error("Attribute {attr} refers to non-existent {what}")]
    InvalidAttrRef { attr: AttrId, what: &'static str },

    #[error("Constraint '{name}' ({constraint}) refers to non-existent node {node}")]
    InvalidConstraintRef {
        constraint: ConstraintId,
        name: String,
        node: NodeId,
    },

    #[error("Operator '{name}' ({operator}) has a dangling binding '{binding}'")]
    InvalidBinding {
        operator: OperatorId,
        name: String,
        binding: String,
    },

    /// Ports, operators and membership links may only target Component nodes.
    #[error("{what} requires a Component but '{path}' is not one")]
    NotAComponent { what: &'static str, path: String },

    #[error("Constraint '{name}' has no constrainers")]
    NoConstrainers { name: String },

    #[error("Constraint '{name}' is not attached to its constrainee '{path}'")]
    DetachedConstraint { name: String, path: String },

    #[error("Parent/child links are inconsistent at '{path}'")]
    InconsistentHierarchy { path: String },

    #[error("Node '{path}' is its own ancestor")]
    HierarchyCycle { path: String },
}

impl From<GraphError> for RigError {
    fn from(err: GraphError) -> Self {
        RigError::Invariant {
            what: err.to_string(),
        }
    }
}
