//! Passes 3 and 4: attribute drivers and component IO connections.
//!
//! A transform connection is realized as a synthesized pose constraint from
//! the source port's node to the driven port's node. An attribute connection
//! is a direct value link.

use rig_core::{AttrId, NodeId, PortId};
use rig_graph::{Constraint, ConstraintKind, GraphError, PortDataType};
use tracing::trace;

use crate::backend::{AttributeLink, Backend, TargetHandle};
use crate::constraints::build_constraint;
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::registry::SourceId;

/// Pass 3: link every attribute that has a driver.
pub fn build_attribute_connections<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    node: NodeId,
) -> BuildResult<()> {
    let graph = ctx.graph;
    let n = ctx.node(node)?;

    for attr in n.attributes() {
        let attribute = graph.attribute(attr).ok_or(GraphError::InvalidAttrRef {
            attr,
            what: "attribute",
        })?;
        if let Some(driver) = attribute.driver {
            link_attributes(ctx, backend, driver, attr)?;
            ctx.stats.attribute_links += 1;
        }
    }

    for &child in &n.children {
        build_attribute_connections(ctx, backend, child)?;
    }
    Ok(())
}

/// Pass 4: realize the connected inputs, then outputs, of every component.
///
/// Ports without a source are unconnected and skipped.
pub fn build_io_connections<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    node: NodeId,
) -> BuildResult<()> {
    let graph = ctx.graph;
    let n = ctx.node(node)?;

    if let Some(data) = n.component_data() {
        for &id in data.inputs.iter().chain(&data.outputs) {
            let port = graph.port(id).ok_or(GraphError::InvalidPortRef {
                port: id,
                what: "port",
            })?;
            if port.source.is_none() {
                continue;
            }
            match port.data_type {
                PortDataType::Transform => {
                    build_xfo_connection(ctx, backend, id)?;
                }
                PortDataType::Attribute => build_attribute_connection(ctx, backend, id)?,
            }
            ctx.stats.connections += 1;
        }
    }

    for &child in &n.children {
        build_io_connections(ctx, backend, child)?;
    }
    Ok(())
}

/// Realize a transform connection on `port` as a pose constraint.
///
/// The constraint is named `<target>_To_<source>` after the nodes the two
/// ports carry, keeps its offset and has the source node as sole constrainer.
/// The connection and the synthesized constraint are both registered.
pub fn build_xfo_connection<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    port: PortId,
) -> BuildResult<Option<TargetHandle>> {
    let graph = ctx.graph;
    let p = graph.port(port).ok_or(GraphError::InvalidPortRef {
        port,
        what: "port",
    })?;
    let missing = |reason: &str| BuildError::InvalidConnection {
        path: graph.port_path(port),
        reason: reason.to_string(),
    };

    let source = p
        .source
        .and_then(|id| graph.port(id))
        .ok_or_else(|| missing("missing source"))?;
    let source_node = source
        .target_node()
        .and_then(|id| graph.node(id))
        .ok_or_else(|| missing("source port carries no node"))?;
    let target_node = p
        .target_node()
        .and_then(|id| graph.node(id))
        .ok_or_else(|| missing("missing target"))?;

    let mut constraint = Constraint::new(
        format!("{}_To_{}", target_node.name, source_node.name),
        ConstraintKind::Pose,
        target_node.id,
    );
    constraint.constrainers.push(source_node.id);
    constraint.maintain_offset = true;

    let index = ctx.synthesized.len();
    let target = build_constraint(ctx, backend, SourceId::Synthesized(index), &constraint)?;
    ctx.synthesized.push(constraint);
    ctx.stats.synthesized += 1;

    ctx.registry.register(SourceId::Connection(port), target);
    trace!(port = %graph.port_path(port), ?target, "built transform connection");
    Ok(target)
}

/// Realize an attribute connection on `port` as a direct link from the
/// source port's attribute.
pub fn build_attribute_connection<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    port: PortId,
) -> BuildResult<()> {
    let graph = ctx.graph;
    let p = graph.port(port).ok_or(GraphError::InvalidPortRef {
        port,
        what: "port",
    })?;
    let missing = |reason: &str| BuildError::InvalidConnection {
        path: graph.port_path(port),
        reason: reason.to_string(),
    };

    let source = p
        .source
        .and_then(|id| graph.port(id))
        .ok_or_else(|| missing("missing source"))?;
    let driver = source
        .target_attribute()
        .ok_or_else(|| missing("source port carries no attribute"))?;
    let driven = p
        .target_attribute()
        .ok_or_else(|| missing("missing target"))?;

    link_attributes(ctx, backend, driver, driven)
}

fn link_attributes<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    driver: AttrId,
    driven: AttrId,
) -> BuildResult<()> {
    let graph = ctx.graph;
    let driver_attribute = graph.attribute(driver).ok_or(GraphError::InvalidAttrRef {
        attr: driver,
        what: "attribute",
    })?;
    let driven_attribute = graph.attribute(driven).ok_or(GraphError::InvalidAttrRef {
        attr: driven,
        what: "attribute",
    })?;

    let link = AttributeLink {
        driver: ctx.require_attribute(driver, "driver attribute")?,
        driver_attribute,
        driven: ctx.require_attribute(driven, "driven attribute")?,
        driven_attribute,
    };
    backend.connect_attribute(&link)?;
    trace!(
        driver = %graph.attribute_path(driver),
        driven = %graph.attribute_path(driven),
        "linked attributes"
    );
    Ok(())
}
