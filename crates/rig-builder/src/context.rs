//! Per-build state threaded through every pass.

use rig_config::{ColorPalette, NamingConfig};
use rig_core::{AttrId, NodeId};
use rig_graph::{Constraint, GraphError, Node, SceneGraph};

use crate::backend::TargetHandle;
use crate::error::{BuildError, BuildResult};
use crate::naming::NameResolver;
use crate::registry::{IdentityRegistry, SourceId};

/// Counters reported at the end of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub nodes: usize,
    pub attributes: usize,
    pub constraints: usize,
    pub synthesized: usize,
    pub attribute_links: usize,
    pub connections: usize,
    pub operators: usize,
}

/// Result of a successful build. The registry is the input to the synchronizer.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub registry: IdentityRegistry,
    /// Pose constraints created for transform connections, indexed by
    /// [`SourceId::Synthesized`].
    pub synthesized: Vec<Constraint>,
    pub stats: BuildStats,
}

/// Explicit build context: the graph being read, naming and palette lookups,
/// and the registry owned by this run.
pub struct BuildContext<'a> {
    pub graph: &'a SceneGraph,
    pub resolver: NameResolver<'a>,
    pub palette: &'a ColorPalette,
    pub registry: IdentityRegistry,
    pub synthesized: Vec<Constraint>,
    pub stats: BuildStats,
}

impl<'a> BuildContext<'a> {
    pub fn new(graph: &'a SceneGraph, naming: &'a NamingConfig, palette: &'a ColorPalette) -> Self {
        Self {
            graph,
            resolver: NameResolver::new(naming),
            palette,
            registry: IdentityRegistry::new(),
            synthesized: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn node(&self, id: NodeId) -> BuildResult<&'a Node> {
        let graph = self.graph;
        Ok(graph.node(id).ok_or(GraphError::InvalidNodeRef { node: id })?)
    }

    /// Host item built for `node`, or `UnbuiltReference` naming the node path.
    pub fn require_node(&self, node: NodeId, what: &'static str) -> BuildResult<TargetHandle> {
        self.registry
            .lookup(SourceId::Node(node))
            .ok_or_else(|| BuildError::UnbuiltReference {
                what,
                path: self.graph.full_path(node),
            })
    }

    pub fn require_attribute(&self, attr: AttrId, what: &'static str) -> BuildResult<TargetHandle> {
        self.registry
            .lookup(SourceId::Attribute(attr))
            .ok_or_else(|| BuildError::UnbuiltReference {
                what,
                path: self.graph.attribute_path(attr),
            })
    }

    pub fn into_output(self) -> BuildOutput {
        BuildOutput {
            registry: self.registry,
            synthesized: self.synthesized,
            stats: self.stats,
        }
    }
}
