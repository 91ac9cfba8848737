//! Property tests over generated rigs.

use std::collections::HashSet;

use proptest::prelude::*;
use rig_builder::{BackendCall, Builder, CreateOp, NameResolver, RecordingBackend, SourceId};
use rig_config::NamingConfig;
use rig_core::NodeId;
use rig_graph::{GraphBuilder, NodeKind, PortDataType, PortTarget, SceneGraph};

const KINDS: [NodeKind; 7] = [
    NodeKind::Locator,
    NodeKind::Joint,
    NodeKind::SrtBuffer,
    NodeKind::HierarchyGroup,
    NodeKind::Curve,
    NodeKind::Control,
    NodeKind::SceneItem,
];

/// A container with one component; every generated node hangs below the
/// component, under an earlier node.
fn random_rig(picks: &[(prop::sample::Index, usize)]) -> (SceneGraph, NodeId, Vec<NodeId>) {
    let mut builder = GraphBuilder::new();
    let root = builder.add_root("Bob", NodeKind::Container);
    let component = builder.add_component(root, "limb", "M");
    let mut ids = vec![root, component];
    for (i, (parent, kind)) in picks.iter().enumerate() {
        let parent = ids[1 + parent.index(ids.len() - 1)];
        let kind = KINDS[kind % KINDS.len()].clone();
        ids.push(builder.add_child(parent, format!("n{i}"), kind));
    }
    (builder.build().unwrap(), root, ids)
}

fn picks() -> impl Strategy<Value = Vec<(prop::sample::Index, usize)>> {
    prop::collection::vec((any::<prop::sample::Index>(), 0..KINDS.len()), 0..40)
}

proptest! {
    #[test]
    fn every_node_built_and_registered_once(picks in picks()) {
        let (graph, root, ids) = random_rig(&picks);
        let mut builder = Builder::new(RecordingBackend::new());
        let output = builder.build(&graph, root).unwrap();

        let items = builder
            .backend()
            .calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::Create { op, .. } if op.is_item()))
            .count();
        prop_assert_eq!(items, ids.len());
        prop_assert_eq!(output.stats.nodes, ids.len());
        prop_assert_eq!(output.registry.len(), ids.len());

        let registered: HashSet<NodeId> = output
            .registry
            .iter()
            .filter_map(|pairing| pairing.source.node())
            .collect();
        prop_assert_eq!(registered.len(), ids.len());
    }

    #[test]
    fn nodes_decorated_before_children(picks in picks()) {
        let (graph, root, _) = random_rig(&picks);
        let mut builder = Builder::new(RecordingBackend::new());
        builder.build(&graph, root).unwrap();

        let mut decorated = HashSet::new();
        for call in builder.backend().calls() {
            match call {
                BackendCall::SetColor { target, .. } | BackendCall::SetTransform { target } => {
                    decorated.insert(*target);
                }
                BackendCall::Create { parent: Some(parent), op, .. } if op.is_item() => {
                    prop_assert!(decorated.contains(parent));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn resolver_is_deterministic(picks in picks(), explicit in any::<prop::sample::Index>()) {
        let (graph, _, ids) = random_rig(&picks);
        let naming = NamingConfig::default();
        let resolver = NameResolver::new(&naming);
        for &id in &ids {
            prop_assert_eq!(resolver.resolve(&graph, id).unwrap(), resolver.resolve(&graph, id).unwrap());
        }

        // Re-author with one node flagged explicit.
        let flagged = explicit.index(picks.len() + 1);
        let mut builder = GraphBuilder::new();
        let root = builder.add_root("Bob", NodeKind::Container);
        let component = builder.add_component(root, "limb", "M");
        let mut authored = vec![component];
        for (i, (parent, kind)) in picks.iter().enumerate() {
            let parent = authored[parent.index(authored.len())];
            authored.push(builder.add_child(parent, format!("n{i}"), KINDS[kind % KINDS.len()].clone()));
        }
        let target = authored[flagged];
        builder.set_explicit_name(target, true);
        let graph = builder.build().unwrap();
        let name = NameResolver::new(&naming).resolve(&graph, target).unwrap();
        prop_assert!(name.starts_with(graph.node(target).unwrap().name.as_str()));
    }

    #[test]
    fn chained_connections_synthesize_one_pose_each(count in 1usize..8) {
        let mut builder = GraphBuilder::new();
        let root = builder.add_root("Bob", NodeKind::Container);
        let mut previous = None;
        for i in 0..count {
            let component = builder.add_component(root, format!("seg{i}"), "L");
            let input = builder.add_child(component, format!("in{i}"), NodeKind::Locator);
            let output = builder.add_child(component, format!("out{i}"), NodeKind::Locator);
            let in_port = builder.add_input(component, "parent", PortDataType::Transform, Some(PortTarget::Node(input)));
            let out_port = builder.add_output(component, "end", PortDataType::Transform, Some(PortTarget::Node(output)));
            if let Some(prev) = previous {
                builder.set_port_source(in_port, prev);
            }
            previous = Some(out_port);
        }
        let graph = builder.build().unwrap();

        let mut rig_builder = Builder::new(RecordingBackend::new());
        let output = rig_builder.build(&graph, root).unwrap();

        prop_assert_eq!(output.synthesized.len(), count - 1);
        for (i, constraint) in output.synthesized.iter().enumerate() {
            prop_assert!(constraint.maintain_offset);
            prop_assert_eq!(constraint.constrainers.len(), 1);
            prop_assert!(output.registry.lookup(SourceId::Synthesized(i)).is_some());
        }
        prop_assert_eq!(rig_builder.backend().created(CreateOp::PoseConstraint).len(), count - 1);
    }
}
