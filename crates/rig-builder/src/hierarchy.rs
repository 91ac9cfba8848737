//! Pass 1: depth-first construction of the node tree.

use rig_core::NodeId;
use rig_graph::{AttributeKind, GraphError, Node, NodeKind};
use tracing::{trace, warn};

use crate::backend::{AttributeGroupRequest, AttributeRequest, Backend, ItemRequest, TargetHandle};
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::registry::SourceId;

type CreateItem<B> = fn(&mut B, &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;
type CreateAttribute<B> = fn(&mut B, &AttributeRequest<'_>) -> BuildResult<Option<TargetHandle>>;

fn item_creator<B: Backend + ?Sized>(kind: &NodeKind) -> Option<CreateItem<B>> {
    let create: CreateItem<B> = match kind {
        NodeKind::Container => B::create_container,
        NodeKind::Layer => B::create_layer,
        NodeKind::Component | NodeKind::SrtBuffer => B::create_group,
        NodeKind::HierarchyGroup => B::create_hierarchy_group,
        NodeKind::Locator | NodeKind::SceneItem => B::create_locator,
        NodeKind::Joint => B::create_joint,
        NodeKind::Curve => B::create_curve,
        NodeKind::Control => B::create_control,
        NodeKind::Custom(_) => return None,
    };
    Some(create)
}

fn attribute_creator<B: Backend + ?Sized>(kind: AttributeKind) -> CreateAttribute<B> {
    match kind {
        AttributeKind::Bool => B::create_bool_attribute,
        AttributeKind::Float => B::create_float_attribute,
        AttributeKind::Integer => B::create_integer_attribute,
        AttributeKind::String => B::create_string_attribute,
    }
}

/// Build `node` and its subtree, returning the node's host item.
///
/// A Component becomes the current component for its descendants. Each node
/// is registered as soon as it is created and decorated before its children
/// are visited. Children of an uncreated node are still built, with no parent.
pub fn build_hierarchy<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    node: NodeId,
    parent: Option<TargetHandle>,
    component: Option<NodeId>,
) -> BuildResult<Option<TargetHandle>> {
    let graph = ctx.graph;
    let n = ctx.node(node)?;

    let create = item_creator::<B>(&n.kind).ok_or_else(|| BuildError::UnsupportedKind {
        what: "node",
        kind: n.kind.to_string(),
        path: graph.full_path(node),
    })?;

    let component = if n.is_component() {
        Some(node)
    } else {
        component
    };

    let build_name = ctx.resolver.resolve(graph, node)?;
    let request = ItemRequest {
        graph,
        node: n,
        build_name: &build_name,
        parent,
        component: graph.owning_component(node).or(component),
    };
    let target = create(backend, &request)?;

    ctx.registry.register(SourceId::Node(node), target);
    ctx.stats.nodes += 1;
    trace!(node = %graph.full_path(node), name = %build_name, ?target, "built node");

    if let Some(target) = target {
        // Attributes, transform, visibility, colour.
        build_attributes(ctx, backend, n, target)?;
        backend.set_transform(target, &n.xfo)?;
        set_visibility(backend, n, target)?;
        set_color(ctx, backend, n, target)?;
    }

    for &child in &n.children {
        build_hierarchy(ctx, backend, child, target, component)?;
    }

    Ok(target)
}

/// Create every non-empty attribute group on `node` and the attributes in it.
pub fn build_attributes<B: Backend + ?Sized>(
    ctx: &mut BuildContext<'_>,
    backend: &mut B,
    node: &Node,
    owner: TargetHandle,
) -> BuildResult<()> {
    let graph = ctx.graph;
    for (index, group) in node.attribute_groups.iter().enumerate() {
        if group.is_empty() {
            continue;
        }
        let group_target = backend.create_attribute_group(&AttributeGroupRequest {
            owner,
            node,
            group,
            index,
        })?;

        for &attr in &group.attributes {
            let attribute = graph.attribute(attr).ok_or(GraphError::InvalidAttrRef {
                attr,
                what: "attribute",
            })?;
            let create = attribute_creator::<B>(attribute.kind());
            let target = create(
                backend,
                &AttributeRequest {
                    owner,
                    group: group_target,
                    attribute,
                },
            )?;
            ctx.registry.register(SourceId::Attribute(attr), target);
            ctx.stats.attributes += 1;
        }
    }
    Ok(())
}

fn set_visibility<B: Backend + ?Sized>(
    backend: &mut B,
    node: &Node,
    target: TargetHandle,
) -> BuildResult<()> {
    backend.set_visibility(target, node.visible)?;
    if node.kind.has_shape() {
        backend.set_shape_visibility(target, node.shape_visible)?;
    }
    Ok(())
}

fn set_color<B: Backend + ?Sized>(
    ctx: &BuildContext<'_>,
    backend: &mut B,
    node: &Node,
    target: TargetHandle,
) -> BuildResult<()> {
    let Some(tag) = node.color.as_deref() else {
        return Ok(());
    };
    match ctx.palette.get(tag) {
        Some(color) => backend.set_color(target, tag, color),
        None => {
            warn!(node = %ctx.graph.full_path(node.id), color = tag, "unknown display colour");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{BackendCall, CreateOp, RecordingBackend};
    use rig_config::RigConfig;
    use rig_graph::{AttributeValue, GraphBuilder, SceneGraph};

    fn build(graph: &SceneGraph, backend: &mut RecordingBackend) -> BuildResult<()> {
        let config = RigConfig::default();
        let mut ctx = BuildContext::new(graph, &config.naming, &config.palette);
        build_hierarchy(&mut ctx, backend, graph.roots()[0], None, None)?;
        Ok(())
    }

    #[test]
    fn dispatch_by_kind() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        builder.add_child(leg, "hrc", NodeKind::HierarchyGroup);
        builder.add_child(leg, "buffer", NodeKind::SrtBuffer);
        builder.add_child(leg, "item", NodeKind::SceneItem);
        builder.add_child(leg, "shape", NodeKind::Curve);
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        build(&graph, &mut backend).unwrap();

        let ops: Vec<CreateOp> = backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                BackendCall::Create { op, .. } => Some(*op),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                CreateOp::Container,
                CreateOp::Group,
                CreateOp::HierarchyGroup,
                CreateOp::Group,
                CreateOp::Locator,
                CreateOp::Curve,
            ]
        );
    }

    #[test]
    fn children_receive_parent_handle() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        builder.add_child(leg, "femur", NodeKind::Joint);
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        build(&graph, &mut backend).unwrap();

        let leg_target = backend.handle_of("leg_L_cmp").unwrap();
        assert!(backend.calls().iter().any(|call| matches!(
            call,
            BackendCall::Create { op: CreateOp::Joint, parent: Some(p), .. } if *p == leg_target
        )));
    }

    #[test]
    fn empty_attribute_groups_are_skipped() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        let settings = builder.add_attribute_group(leg, "settings");
        builder.add_attribute(leg, settings, "rightSide", AttributeValue::Bool(false));
        builder.add_attribute(leg, settings, "stretch", AttributeValue::float_ranged(1.0, 0.0, 2.0));
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        build(&graph, &mut backend).unwrap();

        assert_eq!(backend.created(CreateOp::AttributeGroup), vec!["settings"]);
        assert_eq!(backend.created(CreateOp::BoolAttribute), vec!["rightSide"]);
        assert_eq!(backend.created(CreateOp::FloatAttribute), vec!["stretch"]);
    }

    #[test]
    fn shape_visibility_only_for_shapes() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        let ctrl = builder.add_child(leg, "IK", NodeKind::Control);
        builder.set_shape_visibility(ctrl, false);
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        build(&graph, &mut backend).unwrap();

        let shape_calls: Vec<_> = backend
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::SetShapeVisibility { .. }))
            .collect();
        assert_eq!(shape_calls.len(), 1);
        let ctrl_target = backend.handle_of("IK_L_ctrl").unwrap();
        assert_eq!(
            shape_calls[0],
            &BackendCall::SetShapeVisibility {
                target: ctrl_target,
                visible: false,
            }
        );
    }

    #[test]
    fn unknown_colour_is_skipped() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        let ik = builder.add_child(leg, "IK", NodeKind::Control);
        let fk = builder.add_child(leg, "FK", NodeKind::Control);
        builder.set_color(ik, "yellow");
        builder.set_color(fk, "chartreuse");
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        build(&graph, &mut backend).unwrap();

        let colours: Vec<_> = backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                BackendCall::SetColor { name, index, .. } => Some((name.as_str(), *index)),
                _ => None,
            })
            .collect();
        assert_eq!(colours, vec![("yellow", 17)]);
    }

    #[test]
    fn uncreated_node_is_registered_and_children_still_built() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let layer = builder.add_child(rig, "deformers", NodeKind::Layer);
        let leg = builder.add_component(layer, "leg", "L");
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new().with_uncreated(CreateOp::Layer);
        let config = RigConfig::default();
        let mut ctx = BuildContext::new(&graph, &config.naming, &config.palette);
        build_hierarchy(&mut ctx, &mut backend, rig, None, None).unwrap();

        assert!(ctx.registry.contains(SourceId::Node(layer)));
        assert_eq!(ctx.registry.lookup(SourceId::Node(layer)), None);
        assert!(ctx.registry.lookup(SourceId::Node(leg)).is_some());
        let decorated = backend
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::SetTransform { .. }))
            .count();
        assert_eq!(decorated, 2);
    }

    #[test]
    fn decoration_order_is_fixed() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let leg = builder.add_component(rig, "leg", "L");
        let ik = builder.add_child(leg, "IK", NodeKind::Control);
        let settings = builder.add_attribute_group(ik, "settings");
        builder.add_attribute(ik, settings, "ikBlend", AttributeValue::float_ranged(1.0, 0.0, 1.0));
        builder.set_color(ik, "yellow");
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        let config = RigConfig::default();
        let mut ctx = BuildContext::new(&graph, &config.naming, &config.palette);
        build_hierarchy(&mut ctx, &mut backend, ik, None, None).unwrap();

        let calls = backend.calls();
        let target = backend.handle_of("IK_L_ctrl").unwrap();
        let steps: Vec<&str> = calls
            .iter()
            .map(|call| match call {
                BackendCall::Create { op: CreateOp::Control, .. } => "control",
                BackendCall::Create { op: CreateOp::AttributeGroup, .. } => "group",
                BackendCall::Create { op: CreateOp::FloatAttribute, .. } => "float",
                BackendCall::SetTransform { target: t } if *t == target => "transform",
                BackendCall::SetVisibility { target: t, .. } if *t == target => "visibility",
                BackendCall::SetShapeVisibility { target: t, .. } if *t == target => "shape",
                BackendCall::SetColor { target: t, .. } if *t == target => "colour",
                _ => "other",
            })
            .collect();
        assert_eq!(
            steps,
            vec!["control", "group", "float", "transform", "visibility", "shape", "colour"]
        );
    }

    #[test]
    fn explicit_membership_reaches_backend() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        let deformers = builder.add_child(rig, "deformers", NodeKind::Layer);
        let leg = builder.add_component(rig, "leg", "L");
        let femur = builder.add_child(deformers, "femur", NodeKind::Joint);
        builder.set_component(femur, leg);
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        build(&graph, &mut backend).unwrap();

        let femur_target = backend.handle_of("femur_L_def").unwrap();
        let deformers_target = backend.handle_of("deformers").unwrap();
        assert_eq!(backend.component_of(femur_target), Some(leg));
        assert_eq!(backend.component_of(deformers_target), None);
    }

    #[test]
    fn custom_kind_is_unsupported() {
        let mut builder = GraphBuilder::new();
        let rig = builder.add_root("Bob", NodeKind::Container);
        builder.add_child(rig, "body", NodeKind::Custom("Mesh".into()));
        let graph = builder.build().unwrap();

        let mut backend = RecordingBackend::new();
        let err = build(&graph, &mut backend).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnsupportedKind {
                what: "node",
                kind: "Mesh".into(),
                path: "Bob.body".into(),
            }
        );
    }
}
