//! Pass 5: component operators.

use rig_core::NodeId;
use rig_graph::{BindingTarget, GraphError, Operator, OperatorBinding, OperatorKind, PortTarget};
use tracing::trace;

use crate::backend::{Backend, OperatorRequest, ResolvedBinding, TargetHandle};
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::registry::SourceId;

pub fn build_operators<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    node: NodeId,
) -> BuildResult<()> {
    let graph = ctx.graph;
    let n = ctx.node(node)?;

    if let Some(data) = n.component_data() {
        for &id in &data.operators {
            let operator = graph
                .operator(id)
                .ok_or(GraphError::MissingOperator { operator: id })?;
            build_operator(ctx, backend, operator)?;
        }
    }

    for &child in &n.children {
        build_operators(ctx, backend, child)?;
    }
    Ok(())
}

pub fn build_operator<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    operator: &Operator,
) -> BuildResult<Option<TargetHandle>> {
    let graph = ctx.graph;
    match &operator.kind {
        OperatorKind::Solver { .. } => {}
        OperatorKind::Custom(kind) => {
            return Err(BuildError::UnsupportedKind {
                what: "operator",
                kind: kind.clone(),
                path: format!("{}.{}", graph.full_path(operator.component), operator.name),
            });
        }
    }

    let component = ctx.require_node(operator.component, "operator component")?;
    let inputs = resolve_bindings(ctx, &operator.inputs)?;
    let outputs = resolve_bindings(ctx, &operator.outputs)?;
    let build_name = ctx.resolver.resolve_operator(graph, operator)?;

    let request = OperatorRequest {
        operator,
        build_name: &build_name,
        component,
        inputs: &inputs,
        outputs: &outputs,
    };
    let target = backend.create_solver_operator(&request)?;

    ctx.registry.register(SourceId::Operator(operator.id), target);
    ctx.stats.operators += 1;
    trace!(operator = %build_name, ?target, "built operator");
    Ok(target)
}

fn resolve_bindings(
    ctx: &BuildContext<'_>,
    bindings: &[OperatorBinding],
) -> BuildResult<Vec<ResolvedBinding>> {
    bindings
        .iter()
        .map(|binding| {
            let target = match binding.target {
                BindingTarget::Node(node) => ctx.require_node(node, "operator binding")?,
                BindingTarget::Attribute(attr) => ctx.require_attribute(attr, "operator binding")?,
                BindingTarget::Port(port) => {
                    let p = ctx.graph.port(port).ok_or(GraphError::InvalidPortRef {
                        port,
                        what: "port",
                    })?;
                    match p.target {
                        Some(PortTarget::Node(node)) => ctx.require_node(node, "operator binding")?,
                        Some(PortTarget::Attribute(attr)) => {
                            ctx.require_attribute(attr, "operator binding")?
                        }
                        None => {
                            return Err(BuildError::UnbuiltReference {
                                what: "operator binding",
                                path: ctx.graph.port_path(port),
                            });
                        }
                    }
                }
            };
            Ok(ResolvedBinding {
                name: binding.name.clone(),
                target,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_hierarchy;
    use crate::recording::{BackendCall, CreateOp, RecordingBackend};
    use rig_config::RigConfig;
    use rig_graph::{GraphBuilder, NodeKind, PortDataType};

    #[test]
    fn solver_bindings_resolve_to_targets() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        let root = builder.add_child(leg, "legRoot", NodeKind::Locator);
        let femur = builder.add_child(leg, "femurOut", NodeKind::Locator);
        let port = builder.add_input(leg, "root", PortDataType::Transform, Some(PortTarget::Node(root)));
        let solver = builder.add_operator(
            leg,
            "legSolver",
            OperatorKind::Solver {
                solver_type: "LegSolver".into(),
                extension: "RigSolvers".into(),
            },
        );
        builder.bind_operator_input(solver, "root", BindingTarget::Port(port));
        builder.bind_operator_output(solver, "femur", BindingTarget::Node(femur));
        let graph = builder.build().unwrap();

        let config = RigConfig::default();
        let mut ctx = BuildContext::new(&graph, &config.naming, &config.palette);
        let mut backend = RecordingBackend::new();
        build_hierarchy(&mut ctx, &mut backend, rig, None, None).unwrap();
        build_operators(&mut ctx, &mut backend, rig).unwrap();

        assert_eq!(backend.created(CreateOp::SolverOperator), vec!["legSolver_L_solverOp"]);
        let root_target = backend.handle_of("legRoot_L_loc").unwrap();
        let femur_target = backend.handle_of("femurOut_L_loc").unwrap();
        assert!(backend.calls().iter().any(|call| matches!(
            call,
            BackendCall::Operator { inputs, outputs, .. }
                if inputs == &vec![("root".to_string(), root_target)]
                    && outputs == &vec![("femur".to_string(), femur_target)]
        )));
        assert!(ctx.registry.lookup(SourceId::Operator(solver)).is_some());
    }

    #[test]
    fn custom_operator_kind_is_unsupported() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        builder.add_operator(leg, "deform", OperatorKind::Custom("CanvasOperator".into()));
        let graph = builder.build().unwrap();

        let config = RigConfig::default();
        let mut ctx = BuildContext::new(&graph, &config.naming, &config.palette);
        let mut backend = RecordingBackend::new();
        build_hierarchy(&mut ctx, &mut backend, rig, None, None).unwrap();

        let err = build_operators(&mut ctx, &mut backend, rig).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnsupportedKind {
                what: "operator",
                kind: "CanvasOperator".into(),
                path: "Bob.leg.deform".into(),
            }
        );
    }
}
