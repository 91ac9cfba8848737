//! Reverse pass: pull host-side state back into the source graph.

use rig_core::AttrId;
use rig_graph::{AttributeKind, GraphError, Node, NodeKind, SceneGraph};
use tracing::debug;

use crate::backend::{Backend, TargetHandle};
use crate::error::{BuildError, BuildResult};
use crate::registry::{IdentityRegistry, SourceId};

type SyncNode<B> = fn(&mut B, TargetHandle, &mut Node) -> BuildResult<bool>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Nodes visited.
    pub nodes: usize,
    /// Nodes whose name, state or attributes changed.
    pub changed: usize,
    pub attributes: usize,
    /// Entries with no node kind or no host item.
    pub skipped: usize,
}

/// Synchronize every node pairing in `registry`, in registration order.
///
/// Each node gets its name synced first, then its kind-specific state, then
/// each of its built attributes.
pub fn synchronize<B: Backend + ?Sized>(
    backend: &mut B,
    graph: &mut SceneGraph,
    registry: &IdentityRegistry,
) -> BuildResult<SyncReport> {
    let mut report = SyncReport::default();

    for pairing in registry.iter() {
        let (Some(id), Some(target)) = (pairing.source.node(), pairing.target) else {
            report.skipped += 1;
            continue;
        };

        let path = graph.full_path(id);
        let node = graph
            .node_mut(id)
            .ok_or(GraphError::InvalidNodeRef { node: id })?;
        let sync: SyncNode<B> = match &node.kind {
            NodeKind::Container => B::sync_container,
            NodeKind::Layer => B::sync_layer,
            NodeKind::Component | NodeKind::SrtBuffer | NodeKind::HierarchyGroup => B::sync_group,
            NodeKind::Locator | NodeKind::SceneItem => B::sync_locator,
            NodeKind::Joint => B::sync_joint,
            NodeKind::Curve | NodeKind::Control => B::sync_curve,
            NodeKind::Custom(kind) => {
                return Err(BuildError::UnsupportedKind {
                    what: "node",
                    kind: kind.clone(),
                    path,
                });
            }
        };

        let mut changed = backend.sync_name(target, node)?;
        changed |= sync(backend, target, node)?;

        let attributes: Vec<AttrId> = node.attributes().collect();
        for attr in attributes {
            let Some(attr_target) = registry.lookup(SourceId::Attribute(attr)) else {
                continue;
            };
            let attribute = graph.attribute_mut(attr).ok_or(GraphError::InvalidAttrRef {
                attr,
                what: "attribute",
            })?;
            changed |= match attribute.kind() {
                AttributeKind::Bool => backend.sync_bool_attribute(attr_target, attribute)?,
                AttributeKind::Float => backend.sync_float_attribute(attr_target, attribute)?,
                AttributeKind::Integer => backend.sync_integer_attribute(attr_target, attribute)?,
                AttributeKind::String => backend.sync_string_attribute(attr_target, attribute)?,
            };
            report.attributes += 1;
        }

        report.nodes += 1;
        if changed {
            debug!(node = %path, "synchronized changes from host");
            report.changed += 1;
        }
    }

    Ok(report)
}
