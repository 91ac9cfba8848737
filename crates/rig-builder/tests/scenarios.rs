//! End-to-end builds against the recording backend.

use rig_builder::connections::build_xfo_connection;
use rig_builder::hierarchy::build_hierarchy;
use rig_builder::{
    BackendCall, BuildContext, BuildError, Builder, CreateOp, NameResolver, RecordingBackend,
    SourceId,
};
use rig_config::RigConfig;
use rig_graph::{AttributeValue, ConstraintKind, GraphBuilder, NodeKind, PortDataType, PortTarget};

#[test]
fn leg_component_names_and_registry() {
    let mut builder = GraphBuilder::new();
    let rig = builder.add_root("Bob", NodeKind::Container);
    let deformers = builder.add_child(rig, "deformers", NodeKind::Layer);
    let leg = builder.add_component(deformers, "leg", "L");
    let femur = builder.add_child(leg, "femur", NodeKind::Joint);
    let graph = builder.build().unwrap();

    let config = RigConfig::default();
    let resolver = NameResolver::new(&config.naming);
    assert_eq!(resolver.resolve(&graph, deformers).unwrap(), "deformers");
    assert_eq!(resolver.resolve(&graph, leg).unwrap(), "leg_L_cmp");
    assert_eq!(resolver.resolve(&graph, femur).unwrap(), "femur_L_def");

    let mut rig_builder = Builder::new(RecordingBackend::new());
    let output = rig_builder.build(&graph, rig).unwrap();

    // The root container is registered too.
    assert_eq!(output.registry.len(), 4);
    for node in [deformers, leg, femur] {
        assert!(output.registry.lookup(SourceId::Node(node)).is_some());
    }
    let backend = rig_builder.backend();
    assert_eq!(backend.created(CreateOp::Layer), vec!["deformers"]);
    assert_eq!(backend.created(CreateOp::Group), vec!["leg_L_cmp"]);
    assert_eq!(backend.created(CreateOp::Joint), vec!["femur_L_def"]);
}

#[test]
fn deformer_joint_uses_explicit_component_membership() {
    let mut builder = GraphBuilder::new();
    let rig = builder.add_root("Bob", NodeKind::Container);
    let deformers = builder.add_child(rig, "deformers", NodeKind::Layer);
    let controls = builder.add_child(rig, "controls", NodeKind::Layer);
    let leg = builder.add_component(controls, "leg", "R");
    let femur = builder.add_child(deformers, "femur", NodeKind::Joint);
    builder.set_component(femur, leg);
    let graph = builder.build().unwrap();

    let mut rig_builder = Builder::new(RecordingBackend::new());
    rig_builder.build(&graph, rig).unwrap();
    assert_eq!(rig_builder.backend().created(CreateOp::Joint), vec!["femur_R_def"]);
}

#[test]
fn transform_connection_synthesizes_pose_constraint() {
    let mut builder = GraphBuilder::new();
    let rig = builder.add_root("Bob", NodeKind::Container);
    let a = builder.add_component(rig, "leg", "L");
    let leg_end = builder.add_child(a, "legEndXfo", NodeKind::Locator);
    let out = builder.add_output(
        a,
        "legEnd",
        PortDataType::Transform,
        Some(PortTarget::Node(leg_end)),
    );
    let b = builder.add_component(rig, "foot", "L");
    let foot_root = builder.add_child(b, "legEndInput", NodeKind::Locator);
    let input = builder.add_input(
        b,
        "legEnd",
        PortDataType::Transform,
        Some(PortTarget::Node(foot_root)),
    );
    builder.set_port_source(input, out);
    let graph = builder.build().unwrap();

    let mut rig_builder = Builder::new(RecordingBackend::new());
    let output = rig_builder.build(&graph, rig).unwrap();

    assert_eq!(output.synthesized.len(), 1);
    let constraint = &output.synthesized[0];
    assert_eq!(constraint.name, "legEndInput_To_legEndXfo");
    assert_eq!(constraint.kind, ConstraintKind::Pose);
    assert!(constraint.maintain_offset);
    assert_eq!(constraint.constrainee, foot_root);
    assert_eq!(constraint.constrainers, vec![leg_end]);

    let backend = rig_builder.backend();
    assert_eq!(
        backend.created(CreateOp::PoseConstraint),
        vec!["legEndInput_To_legEndXfo_L_poseCns"]
    );
    let cns_target = output.registry.lookup(SourceId::Synthesized(0));
    assert!(cns_target.is_some());
    assert_eq!(output.registry.lookup(SourceId::Connection(input)), cns_target);
    assert!(backend.calls().iter().any(|call| matches!(
        call,
        BackendCall::Constraint { maintain_offset: true, constrainers, .. } if constrainers.len() == 1
    )));
}

#[test]
fn transform_connection_without_source_is_invalid() {
    let mut builder = GraphBuilder::new();
    let rig = builder.add_root("Bob", NodeKind::Container);
    let foot = builder.add_component(rig, "foot", "L");
    let root = builder.add_child(foot, "legEndInput", NodeKind::Locator);
    let input = builder.add_input(
        foot,
        "legEnd",
        PortDataType::Transform,
        Some(PortTarget::Node(root)),
    );
    let graph = builder.build().unwrap();

    let config = RigConfig::default();
    let mut ctx = BuildContext::new(&graph, &config.naming, &config.palette);
    let mut backend = RecordingBackend::new();
    build_hierarchy(&mut ctx, &mut backend, rig, None, None).unwrap();

    let err = build_xfo_connection(&mut ctx, &mut backend, input).unwrap_err();
    assert_eq!(
        err,
        BuildError::InvalidConnection {
            path: "Bob.foot.legEnd".into(),
            reason: "missing source".into(),
        }
    );
    assert!(ctx.synthesized.is_empty());
}

#[test]
fn unsupported_kind_still_runs_post_build() {
    let mut builder = GraphBuilder::new();
    let rig = builder.add_root("Bob", NodeKind::Container);
    let geo = builder.add_child(rig, "geometry", NodeKind::Layer);
    builder.add_child(geo, "body", NodeKind::Custom("Mesh".into()));
    let graph = builder.build().unwrap();

    let mut rig_builder = Builder::new(RecordingBackend::new());
    let err = rig_builder.build(&graph, rig).unwrap_err();

    assert_eq!(
        err,
        BuildError::UnsupportedKind {
            what: "node",
            kind: "Mesh".into(),
            path: "Bob.geometry.body".into(),
        }
    );
    assert_eq!(rig_builder.backend().pre_build_count(), 1);
    assert_eq!(rig_builder.backend().post_build_count(), 1);
    assert_eq!(rig_builder.backend().calls().last(), Some(&BackendCall::PostBuild));
}

#[test]
fn attribute_driver_links_without_constraint() {
    let mut builder = GraphBuilder::new();
    let rig = builder.add_root("Bob", NodeKind::Container);
    let leg = builder.add_component(rig, "leg", "R");
    let settings = builder.add_attribute_group(leg, "settings");
    let side = builder.add_attribute(leg, settings, "rightSide", AttributeValue::Bool(true));
    let ctrl = builder.add_child(leg, "IK", NodeKind::Control);
    let ctrl_settings = builder.add_attribute_group(ctrl, "settings");
    let ctrl_side = builder.add_attribute(
        ctrl,
        ctrl_settings,
        "rightSide",
        AttributeValue::Bool(false),
    );
    builder.connect_attribute(ctrl_side, side);
    let graph = builder.build().unwrap();

    let mut rig_builder = Builder::new(RecordingBackend::new());
    let output = rig_builder.build(&graph, rig).unwrap();

    let driver = output.registry.lookup(SourceId::Attribute(side)).unwrap();
    let driven = output.registry.lookup(SourceId::Attribute(ctrl_side)).unwrap();
    let backend = rig_builder.backend();
    assert!(
        backend
            .calls()
            .contains(&BackendCall::ConnectAttribute { driver, driven })
    );
    assert!(output.synthesized.is_empty());
    assert!(backend.created(CreateOp::PoseConstraint).is_empty());
    assert_eq!(output.stats.attribute_links, 1);
}

#[test]
fn passes_run_in_dependency_order() {
    let mut builder = GraphBuilder::new();
    let rig = builder.add_root("Bob", NodeKind::Container);
    let leg = builder.add_component(rig, "leg", "L");
    let ik = builder.add_child(leg, "IK", NodeKind::Control);
    let ankle = builder.add_child(leg, "ankle", NodeKind::Locator);
    let cns = builder.add_constraint(ankle, "ankle", ConstraintKind::Orientation);
    builder.add_constrainer(cns, ik);
    builder.add_operator(
        leg,
        "legSolver",
        rig_graph::OperatorKind::Solver {
            solver_type: "LegSolver".into(),
            extension: "RigSolvers".into(),
        },
    );
    let graph = builder.build().unwrap();

    let mut rig_builder = Builder::new(RecordingBackend::new());
    rig_builder.build(&graph, rig).unwrap();

    let calls = rig_builder.backend().calls();
    let last_item = calls
        .iter()
        .rposition(|call| matches!(call, BackendCall::Create { .. }))
        .unwrap();
    let constraint = calls
        .iter()
        .position(|call| matches!(call, BackendCall::Constraint { .. }))
        .unwrap();
    let operator = calls
        .iter()
        .position(|call| matches!(call, BackendCall::Operator { .. }))
        .unwrap();
    assert!(last_item < constraint);
    assert!(constraint < operator);
}
