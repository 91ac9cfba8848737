//! A backend that records every call instead of talking to a host.
//!
//! Handles are allocated sequentially from 1. Host-side edits used by the
//! synchronizer (renames, moved items, changed attribute values) can be staged
//! with [`RecordingBackend::rename`], [`RecordingBackend::move_item`] and
//! [`RecordingBackend::set_attribute_value`].

use std::collections::{HashMap, HashSet};

use rig_config::PaletteColor;
use rig_core::{NodeId, Xfo};
use rig_graph::{Attribute, AttributeValue, Node, SceneGraph};

use crate::backend::{
    AttributeGroupRequest, AttributeLink, AttributeRequest, Backend, ConstraintRequest,
    ItemRequest, OperatorRequest, TargetHandle,
};
use crate::error::{BuildError, BuildResult};

/// Every creation operation of [`Backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateOp {
    Container,
    Layer,
    Group,
    HierarchyGroup,
    Locator,
    Joint,
    Curve,
    Control,
    AttributeGroup,
    BoolAttribute,
    FloatAttribute,
    IntegerAttribute,
    StringAttribute,
    OrientationConstraint,
    PoseConstraint,
    PositionConstraint,
    ScaleConstraint,
    SolverOperator,
}

impl CreateOp {
    /// Whether this op creates the host item for a node.
    pub fn is_item(self) -> bool {
        matches!(
            self,
            CreateOp::Container
                | CreateOp::Layer
                | CreateOp::Group
                | CreateOp::HierarchyGroup
                | CreateOp::Locator
                | CreateOp::Joint
                | CreateOp::Curve
                | CreateOp::Control
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    PreBuild {
        root: NodeId,
    },
    /// Scene items, attribute groups and attributes. `parent` is the owner for
    /// attribute groups and attributes.
    Create {
        op: CreateOp,
        name: String,
        parent: Option<TargetHandle>,
        target: Option<TargetHandle>,
    },
    Constraint {
        op: CreateOp,
        name: String,
        constrainee: TargetHandle,
        constrainers: Vec<TargetHandle>,
        maintain_offset: bool,
        target: Option<TargetHandle>,
    },
    Operator {
        name: String,
        component: TargetHandle,
        inputs: Vec<(String, TargetHandle)>,
        outputs: Vec<(String, TargetHandle)>,
        target: Option<TargetHandle>,
    },
    ConnectAttribute {
        driver: TargetHandle,
        driven: TargetHandle,
    },
    SetTransform {
        target: TargetHandle,
    },
    SetVisibility {
        target: TargetHandle,
        visible: bool,
    },
    SetShapeVisibility {
        target: TargetHandle,
        visible: bool,
    },
    SetColor {
        target: TargetHandle,
        name: String,
        index: u8,
    },
    PostBuild,
    Sync {
        target: TargetHandle,
        what: &'static str,
    },
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    next_handle: u64,
    names: HashMap<TargetHandle, String>,
    components: HashMap<TargetHandle, NodeId>,
    uncreated: HashSet<CreateOp>,
    fail_on: Option<String>,
    fail_post_build: bool,
    pre_builds: usize,
    post_builds: usize,
    renamed: HashMap<TargetHandle, String>,
    moved: HashMap<TargetHandle, Xfo>,
    values: HashMap<TargetHandle, AttributeValue>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report "not created" for every call of `op`.
    pub fn with_uncreated(mut self, op: CreateOp) -> Self {
        self.uncreated.insert(op);
        self
    }

    /// Fail the creation of the item with this build name.
    pub fn fail_on_create(mut self, build_name: impl Into<String>) -> Self {
        self.fail_on = Some(build_name.into());
        self
    }

    pub fn fail_post_build(mut self) -> Self {
        self.fail_post_build = true;
        self
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn pre_build_count(&self) -> usize {
        self.pre_builds
    }

    pub fn post_build_count(&self) -> usize {
        self.post_builds
    }

    /// Build name given to a created item.
    pub fn name_of(&self, target: TargetHandle) -> Option<&str> {
        self.names.get(&target).map(String::as_str)
    }

    /// Component the backend was told an item belongs to.
    pub fn component_of(&self, target: TargetHandle) -> Option<NodeId> {
        self.components.get(&target).copied()
    }

    /// Handle of the first item created with `build_name`.
    pub fn handle_of(&self, build_name: &str) -> Option<TargetHandle> {
        self.calls.iter().find_map(|call| match call {
            BackendCall::Create { name, target, .. }
            | BackendCall::Constraint { name, target, .. }
            | BackendCall::Operator { name, target, .. }
                if name == build_name =>
            {
                *target
            }
            _ => None,
        })
    }

    /// Names passed to `op`, in call order.
    pub fn created(&self, op: CreateOp) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Create { op: o, name, .. }
                | BackendCall::Constraint { op: o, name, .. }
                    if *o == op =>
                {
                    Some(name.as_str())
                }
                BackendCall::Operator { name, .. } if op == CreateOp::SolverOperator => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Stage a host-side rename for the synchronizer.
    pub fn rename(&mut self, target: TargetHandle, name: impl Into<String>) {
        self.renamed.insert(target, name.into());
    }

    /// Stage a host-side transform edit for the synchronizer.
    pub fn move_item(&mut self, target: TargetHandle, xfo: Xfo) {
        self.moved.insert(target, xfo);
    }

    /// Stage a host-side attribute edit for the synchronizer.
    pub fn set_attribute_value(&mut self, target: TargetHandle, value: AttributeValue) {
        self.values.insert(target, value);
    }

    fn allocate(&mut self, op: CreateOp, name: &str) -> BuildResult<Option<TargetHandle>> {
        if self.fail_on.as_deref() == Some(name) {
            return Err(BuildError::backend(format!("refused to create '{}'", name)));
        }
        if self.uncreated.contains(&op) {
            return Ok(None);
        }
        self.next_handle += 1;
        let handle = TargetHandle::new(self.next_handle);
        self.names.insert(handle, name.to_string());
        Ok(Some(handle))
    }

    fn create_item(&mut self, op: CreateOp, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        let target = self.allocate(op, item.build_name)?;
        if let (Some(target), Some(component)) = (target, item.component) {
            self.components.insert(target, component);
        }
        self.calls.push(BackendCall::Create {
            op,
            name: item.build_name.to_string(),
            parent: item.parent,
            target,
        });
        Ok(target)
    }

    fn create_attribute(
        &mut self,
        op: CreateOp,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        let name = &request.attribute.name;
        let target = self.allocate(op, name)?;
        self.calls.push(BackendCall::Create {
            op,
            name: name.clone(),
            parent: Some(request.owner),
            target,
        });
        Ok(target)
    }

    fn create_constraint(
        &mut self,
        op: CreateOp,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        let target = self.allocate(op, request.build_name)?;
        self.calls.push(BackendCall::Constraint {
            op,
            name: request.build_name.to_string(),
            constrainee: request.constrainee,
            constrainers: request.constrainers.to_vec(),
            maintain_offset: request.constraint.maintain_offset,
            target,
        });
        Ok(target)
    }

    fn sync_item(&mut self, target: TargetHandle, node: &mut Node, what: &'static str) -> bool {
        self.calls.push(BackendCall::Sync { target, what });
        match self.moved.get(&target) {
            Some(xfo) if node.xfo != *xfo => {
                node.xfo = *xfo;
                true
            }
            _ => false,
        }
    }

    fn sync_value(&mut self, target: TargetHandle, attribute: &mut Attribute) -> bool {
        self.calls.push(BackendCall::Sync {
            target,
            what: "attribute",
        });
        match self.values.get(&target) {
            Some(value) if value.kind() == attribute.kind() && attribute.value != *value => {
                attribute.value = value.clone();
                true
            }
            _ => false,
        }
    }
}

impl Backend for RecordingBackend {
    fn create_container(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::Container, item)
    }

    fn create_layer(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::Layer, item)
    }

    fn create_group(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::Group, item)
    }

    fn create_hierarchy_group(
        &mut self,
        item: &ItemRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::HierarchyGroup, item)
    }

    fn create_locator(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::Locator, item)
    }

    fn create_joint(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::Joint, item)
    }

    fn create_curve(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::Curve, item)
    }

    fn create_control(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>> {
        self.create_item(CreateOp::Control, item)
    }

    fn create_attribute_group(
        &mut self,
        request: &AttributeGroupRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        let name = &request.group.name;
        let target = self.allocate(CreateOp::AttributeGroup, name)?;
        self.calls.push(BackendCall::Create {
            op: CreateOp::AttributeGroup,
            name: name.clone(),
            parent: Some(request.owner),
            target,
        });
        Ok(target)
    }

    fn create_bool_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_attribute(CreateOp::BoolAttribute, request)
    }

    fn create_float_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_attribute(CreateOp::FloatAttribute, request)
    }

    fn create_integer_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_attribute(CreateOp::IntegerAttribute, request)
    }

    fn create_string_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_attribute(CreateOp::StringAttribute, request)
    }

    fn connect_attribute(&mut self, link: &AttributeLink<'_>) -> BuildResult<()> {
        self.calls.push(BackendCall::ConnectAttribute {
            driver: link.driver,
            driven: link.driven,
        });
        Ok(())
    }

    fn create_orientation_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_constraint(CreateOp::OrientationConstraint, request)
    }

    fn create_pose_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_constraint(CreateOp::PoseConstraint, request)
    }

    fn create_position_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_constraint(CreateOp::PositionConstraint, request)
    }

    fn create_scale_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        self.create_constraint(CreateOp::ScaleConstraint, request)
    }

    fn create_solver_operator(
        &mut self,
        request: &OperatorRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>> {
        let target = self.allocate(CreateOp::SolverOperator, request.build_name)?;
        let pairs = |bindings: &[crate::backend::ResolvedBinding]| {
            bindings
                .iter()
                .map(|b| (b.name.clone(), b.target))
                .collect::<Vec<_>>()
        };
        self.calls.push(BackendCall::Operator {
            name: request.build_name.to_string(),
            component: request.component,
            inputs: pairs(request.inputs),
            outputs: pairs(request.outputs),
            target,
        });
        Ok(target)
    }

    fn set_transform(&mut self, target: TargetHandle, _xfo: &Xfo) -> BuildResult<()> {
        self.calls.push(BackendCall::SetTransform { target });
        Ok(())
    }

    fn set_visibility(&mut self, target: TargetHandle, visible: bool) -> BuildResult<()> {
        self.calls.push(BackendCall::SetVisibility { target, visible });
        Ok(())
    }

    fn set_shape_visibility(&mut self, target: TargetHandle, visible: bool) -> BuildResult<()> {
        self.calls
            .push(BackendCall::SetShapeVisibility { target, visible });
        Ok(())
    }

    fn set_color(&mut self, target: TargetHandle, name: &str, color: PaletteColor) -> BuildResult<()> {
        self.calls.push(BackendCall::SetColor {
            target,
            name: name.to_string(),
            index: color.index,
        });
        Ok(())
    }

    fn pre_build(&mut self, _graph: &SceneGraph, root: NodeId) -> BuildResult<()> {
        self.pre_builds += 1;
        self.calls.push(BackendCall::PreBuild { root });
        Ok(())
    }

    fn post_build(&mut self) -> BuildResult<()> {
        self.post_builds += 1;
        self.calls.push(BackendCall::PostBuild);
        if self.fail_post_build {
            return Err(BuildError::backend("post-build hook failed"));
        }
        Ok(())
    }

    fn sync_name(&mut self, target: TargetHandle, node: &mut Node) -> BuildResult<bool> {
        match self.renamed.get(&target) {
            Some(name) if node.name != *name => {
                node.name = name.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn sync_container(&mut self, target: TargetHandle, node: &mut Node) -> BuildResult<bool> {
        Ok(self.sync_item(target, node, "container"))
    }

    fn sync_layer(&mut self, target: TargetHandle, node: &mut Node) -> BuildResult<bool> {
        Ok(self.sync_item(target, node, "layer"))
    }

    fn sync_group(&mut self, target: TargetHandle, node: &mut Node) -> BuildResult<bool> {
        Ok(self.sync_item(target, node, "group"))
    }

    fn sync_locator(&mut self, target: TargetHandle, node: &mut Node) -> BuildResult<bool> {
        Ok(self.sync_item(target, node, "locator"))
    }

    fn sync_joint(&mut self, target: TargetHandle, node: &mut Node) -> BuildResult<bool> {
        Ok(self.sync_item(target, node, "joint"))
    }

    fn sync_curve(&mut self, target: TargetHandle, node: &mut Node) -> BuildResult<bool> {
        Ok(self.sync_item(target, node, "curve"))
    }

    fn sync_bool_attribute(
        &mut self,
        target: TargetHandle,
        attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(self.sync_value(target, attribute))
    }

    fn sync_float_attribute(
        &mut self,
        target: TargetHandle,
        attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(self.sync_value(target, attribute))
    }

    fn sync_integer_attribute(
        &mut self,
        target: TargetHandle,
        attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(self.sync_value(target, attribute))
    }

    fn sync_string_attribute(
        &mut self,
        target: TargetHandle,
        attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(self.sync_value(target, attribute))
    }
}
