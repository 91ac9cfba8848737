//! rig-graph: the abstract rig scene graph.
//!
//! Provides:
//! - Core graph data structures (Node, Port, Attribute, Constraint, Operator)
//! - Incremental graph builder with validation
//! - Path and component-membership queries used for naming
//!
//! All entities live in arenas owned by [`SceneGraph`]. A node owns its
//! children; every other relation (constrainee, constrainer, port source,
//! attribute driver, component membership) is a plain ID.
//!
//! # Example
//!
//! ```
//! use rig_graph::{GraphBuilder, NodeKind};
//!
//! let mut builder = GraphBuilder::new();
//! let rig = builder.add_root("Bob", NodeKind::Container);
//! let deformers = builder.add_child(rig, "deformers", NodeKind::Layer);
//! let leg = builder.add_component(deformers, "leg", "L");
//! builder.add_child(leg, "femur", NodeKind::Joint);
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.nodes().len(), 4);
//! assert_eq!(graph.full_path(leg), "Bob.deformers.leg");
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{
    Attribute, AttributeGroup, AttributeKind, AttributeValue, BindingTarget, ComponentData,
    Constraint, ConstraintKind, Node, NodeKind, Operator, OperatorBinding, OperatorKind, Port,
    PortDataType, PortDirection, PortTarget, SceneGraph, DEFAULT_ATTRIBUTE_GROUP,
    DEFAULT_LOCATION,
};
