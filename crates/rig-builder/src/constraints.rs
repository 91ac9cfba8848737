//! Pass 2: declared constraints.

use rig_core::NodeId;
use rig_graph::{Constraint, ConstraintKind, GraphError};
use tracing::trace;

use crate::backend::{Backend, ConstraintRequest, TargetHandle};
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::registry::SourceId;

type CreateConstraint<B> = fn(&mut B, &ConstraintRequest<'_>) -> BuildResult<Option<TargetHandle>>;

/// Walk the built tree and create every constraint attached to each node.
pub fn build_constraints<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    node: NodeId,
) -> BuildResult<()> {
    let graph = ctx.graph;
    let n = ctx.node(node)?;

    for &id in &n.constraints {
        let constraint = graph
            .constraint(id)
            .ok_or(GraphError::MissingConstraint { constraint: id })?;
        build_constraint(ctx, backend, SourceId::Constraint(id), constraint)?;
    }

    for &child in &n.children {
        build_constraints(ctx, backend, child)?;
    }
    Ok(())
}

/// Create one constraint and register it under `source`.
///
/// The constrainee and every constrainer must already have host items.
pub fn build_constraint<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    source: SourceId,
    constraint: &Constraint,
) -> BuildResult<Option<TargetHandle>> {
    let graph = ctx.graph;
    let create: CreateConstraint<B> = match &constraint.kind {
        ConstraintKind::Orientation => B::create_orientation_constraint,
        ConstraintKind::Pose => B::create_pose_constraint,
        ConstraintKind::Position => B::create_position_constraint,
        ConstraintKind::Scale => B::create_scale_constraint,
        ConstraintKind::Custom(kind) => {
            return Err(BuildError::UnsupportedKind {
                what: "constraint",
                kind: kind.clone(),
                path: format!("{}.{}", graph.full_path(constraint.constrainee), constraint.name),
            });
        }
    };

    let constrainee = ctx.require_node(constraint.constrainee, "constrainee")?;
    let constrainers = constraint
        .constrainers
        .iter()
        .map(|&node| ctx.require_node(node, "constrainer"))
        .collect::<BuildResult<Vec<_>>>()?;

    let build_name = ctx.resolver.resolve_constraint(graph, constraint)?;
    let target = create(
        backend,
        &ConstraintRequest {
            constraint,
            build_name: &build_name,
            constrainee,
            constrainers: &constrainers,
        },
    )?;

    ctx.registry.register(source, target);
    ctx.stats.constraints += 1;
    trace!(constraint = %build_name, ?target, "built constraint");
    Ok(target)
}
