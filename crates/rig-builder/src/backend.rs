//! Host capability trait.
//!
//! A host integration implements [`Backend`] and hands it to the
//! [`Builder`](crate::Builder). Creation operations return the handle of the
//! created host item, or `None` when the host chose not to create anything.

use std::fmt;

use rig_config::PaletteColor;
use rig_core::{NodeId, Xfo};
use rig_graph::{Attribute, AttributeGroup, Constraint, Node, Operator, SceneGraph};

use crate::error::BuildResult;

/// Opaque reference to an item in the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(u64);

impl TargetHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a host needs to create the item for one node.
#[derive(Debug, Clone, Copy)]
pub struct ItemRequest<'a> {
    pub graph: &'a SceneGraph,
    pub node: &'a Node,
    pub build_name: &'a str,
    /// Host item of the parent node; `None` for the root or under an uncreated parent.
    pub parent: Option<TargetHandle>,
    /// Component the node belongs to, including explicit membership, so hosts
    /// can place deformers that live outside the component's subtree.
    pub component: Option<NodeId>,
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeGroupRequest<'a> {
    pub owner: TargetHandle,
    pub node: &'a Node,
    pub group: &'a AttributeGroup,
    /// Position of the group on its node; 0 is the default group.
    pub index: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeRequest<'a> {
    pub owner: TargetHandle,
    pub group: Option<TargetHandle>,
    pub attribute: &'a Attribute,
}

/// A direct value link: `driven` follows `driver`.
#[derive(Debug, Clone, Copy)]
pub struct AttributeLink<'a> {
    pub driver: TargetHandle,
    pub driver_attribute: &'a Attribute,
    pub driven: TargetHandle,
    pub driven_attribute: &'a Attribute,
}

#[derive(Debug, Clone, Copy)]
pub struct ConstraintRequest<'a> {
    pub constraint: &'a Constraint,
    pub build_name: &'a str,
    pub constrainee: TargetHandle,
    /// In the constraint's constrainer order.
    pub constrainers: &'a [TargetHandle],
}

/// An operator binding resolved to the host item it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub name: String,
    pub target: TargetHandle,
}

#[derive(Debug, Clone, Copy)]
pub struct OperatorRequest<'a> {
    pub operator: &'a Operator,
    pub build_name: &'a str,
    pub component: TargetHandle,
    pub inputs: &'a [ResolvedBinding],
    pub outputs: &'a [ResolvedBinding],
}

/// Capability contract for a host scene.
///
/// The builder calls creation operations at most once per graph entity per
/// build. Setters and hooks have no-op defaults, as do the reverse-sync
/// operations, which report whether they changed the source graph.
pub trait Backend {
    // Scene items, one per buildable node kind.
    fn create_container(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;
    fn create_layer(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;
    /// Used for Component, SrtBuffer and plain groups.
    fn create_group(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;
    fn create_hierarchy_group(&mut self, item: &ItemRequest<'_>)
    -> BuildResult<Option<TargetHandle>>;
    /// Used for Locator and SceneItem.
    fn create_locator(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;
    fn create_joint(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;
    fn create_curve(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;
    fn create_control(&mut self, item: &ItemRequest<'_>) -> BuildResult<Option<TargetHandle>>;

    // Attributes.
    fn create_attribute_group(
        &mut self,
        request: &AttributeGroupRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn create_bool_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn create_float_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn create_integer_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn create_string_attribute(
        &mut self,
        request: &AttributeRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn connect_attribute(&mut self, link: &AttributeLink<'_>) -> BuildResult<()>;

    // Constraints.
    fn create_orientation_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn create_pose_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn create_position_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;
    fn create_scale_constraint(
        &mut self,
        request: &ConstraintRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;

    // Operators.
    fn create_solver_operator(
        &mut self,
        request: &OperatorRequest<'_>,
    ) -> BuildResult<Option<TargetHandle>>;

    // Decoration.
    fn set_transform(&mut self, _target: TargetHandle, _xfo: &Xfo) -> BuildResult<()> {
        Ok(())
    }

    fn set_visibility(&mut self, _target: TargetHandle, _visible: bool) -> BuildResult<()> {
        Ok(())
    }

    /// Only called for node kinds that carry a shape.
    fn set_shape_visibility(&mut self, _target: TargetHandle, _visible: bool) -> BuildResult<()> {
        Ok(())
    }

    fn set_color(
        &mut self,
        _target: TargetHandle,
        _name: &str,
        _color: PaletteColor,
    ) -> BuildResult<()> {
        Ok(())
    }

    // Lifecycle.
    fn pre_build(&mut self, _graph: &SceneGraph, _root: NodeId) -> BuildResult<()> {
        Ok(())
    }

    /// Runs after every build attempt, whether or not the passes succeeded.
    fn post_build(&mut self) -> BuildResult<()> {
        Ok(())
    }

    // Reverse sync. Each returns whether the source was changed.
    fn sync_name(&mut self, _target: TargetHandle, _node: &mut Node) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_container(&mut self, _target: TargetHandle, _node: &mut Node) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_layer(&mut self, _target: TargetHandle, _node: &mut Node) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_group(&mut self, _target: TargetHandle, _node: &mut Node) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_locator(&mut self, _target: TargetHandle, _node: &mut Node) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_joint(&mut self, _target: TargetHandle, _node: &mut Node) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_curve(&mut self, _target: TargetHandle, _node: &mut Node) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_bool_attribute(
        &mut self,
        _target: TargetHandle,
        _attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_float_attribute(
        &mut self,
        _target: TargetHandle,
        _attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_integer_attribute(
        &mut self,
        _target: TargetHandle,
        _attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(false)
    }

    fn sync_string_attribute(
        &mut self,
        _target: TargetHandle,
        _attribute: &mut Attribute,
    ) -> BuildResult<bool> {
        Ok(false)
    }
}
