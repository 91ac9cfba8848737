//! Core graph data structures.

use core::fmt;

use rig_core::{AttrId, ConstraintId, NodeId, OperatorId, PortId, Xfo};

/// Name of the implicit attribute group every node starts with.
pub const DEFAULT_ATTRIBUTE_GROUP: &str = "default";

/// Location code given to components that do not specify one.
pub const DEFAULT_LOCATION: &str = "M";

/// Kind tag of a scene graph node.
///
/// The known kinds are matched exhaustively by the builder. `Custom` carries
/// kinds introduced by authoring code that no builder pass knows how to
/// realize; reaching one during a build is a fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container,
    Layer,
    Component,
    HierarchyGroup,
    SrtBuffer,
    Locator,
    Joint,
    SceneItem,
    Curve,
    Control,
    Custom(String),
}

impl NodeKind {
    /// Kind name used as the key into naming formats and type tokens.
    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Container => "Container",
            NodeKind::Layer => "Layer",
            NodeKind::Component => "Component",
            NodeKind::HierarchyGroup => "HierarchyGroup",
            NodeKind::SrtBuffer => "SrtBuffer",
            NodeKind::Locator => "Locator",
            NodeKind::Joint => "Joint",
            NodeKind::SceneItem => "SceneItem",
            NodeKind::Curve => "Curve",
            NodeKind::Control => "Control",
            NodeKind::Custom(name) => name,
        }
    }

    /// Whether items of this kind carry a displayable shape.
    pub fn has_shape(&self) -> bool {
        matches!(self, NodeKind::Curve | NodeKind::Control)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Component-only state: location code, ports and operators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentData {
    pub location: String,
    pub inputs: Vec<PortId>,
    pub outputs: Vec<PortId>,
    pub operators: Vec<OperatorId>,
}

impl ComponentData {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }
}

/// Named, ordered set of attributes on a node. Group 0 is the implicit default.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeGroup {
    pub name: String,
    pub attributes: Vec<AttrId>,
}

impl AttributeGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A node in the rig scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// The raw name is used as the prefix of the build name.
    pub explicit_name: bool,
    pub parent: Option<NodeId>,
    /// Build order; preserved across builds.
    pub children: Vec<NodeId>,
    /// Explicit component membership for nodes living outside the component's subtree.
    pub component: Option<NodeId>,
    pub attribute_groups: Vec<AttributeGroup>,
    pub constraints: Vec<ConstraintId>,
    pub xfo: Xfo,
    pub visible: bool,
    pub shape_visible: bool,
    pub color: Option<String>,
    pub(crate) component_data: Option<ComponentData>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, kind: NodeKind) -> Self {
        let component_data = (kind == NodeKind::Component).then(|| ComponentData::new(DEFAULT_LOCATION));
        Self {
            id,
            name,
            kind,
            explicit_name: false,
            parent: None,
            children: Vec::new(),
            component: None,
            attribute_groups: vec![AttributeGroup::new(DEFAULT_ATTRIBUTE_GROUP)],
            constraints: Vec::new(),
            xfo: Xfo::identity(),
            visible: true,
            shape_visible: true,
            color: None,
            component_data,
        }
    }

    pub fn is_component(&self) -> bool {
        self.component_data.is_some()
    }

    /// Ports and operators; `None` unless this node is a Component.
    pub fn component_data(&self) -> Option<&ComponentData> {
        self.component_data.as_ref()
    }

    pub fn location(&self) -> Option<&str> {
        self.component_data.as_ref().map(|c| c.location.as_str())
    }

    /// All attribute IDs across groups, in group then attribute order.
    pub fn attributes(&self) -> impl Iterator<Item = AttrId> + '_ {
        self.attribute_groups
            .iter()
            .flat_map(|g| g.attributes.iter().copied())
    }
}

/// Attribute kind tag, derived from the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Bool,
    Float,
    Integer,
    String,
}

/// Attribute value with its kind-specific metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Float {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    Integer(i64),
    String(String),
}

impl AttributeValue {
    pub fn float(value: f64) -> Self {
        AttributeValue::Float {
            value,
            min: None,
            max: None,
        }
    }

    pub fn float_ranged(value: f64, min: f64, max: f64) -> Self {
        AttributeValue::Float {
            value,
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Bool(_) => AttributeKind::Bool,
            AttributeValue::Float { .. } => AttributeKind::Float,
            AttributeValue::Integer(_) => AttributeKind::Integer,
            AttributeValue::String(_) => AttributeKind::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: AttrId,
    pub name: String,
    pub owner: NodeId,
    /// Index into the owner's attribute groups.
    pub group: usize,
    pub value: AttributeValue,
    /// Attribute whose value drives this one.
    pub driver: Option<AttrId>,
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        self.value.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Orientation,
    Pose,
    Position,
    Scale,
    Custom(String),
}

impl ConstraintKind {
    pub fn type_name(&self) -> &str {
        match self {
            ConstraintKind::Orientation => "OrientationConstraint",
            ConstraintKind::Pose => "PoseConstraint",
            ConstraintKind::Position => "PositionConstraint",
            ConstraintKind::Scale => "ScaleConstraint",
            ConstraintKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A declared constraint. It is attached to (listed on) its constrainee.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub constrainee: NodeId,
    /// Ordered, non-empty once validated.
    pub constrainers: Vec<NodeId>,
    pub maintain_offset: bool,
}

impl Constraint {
    pub fn new(name: impl Into<String>, kind: ConstraintKind, constrainee: NodeId) -> Self {
        Self {
            name: name.into(),
            kind,
            constrainee,
            constrainers: Vec::new(),
            maintain_offset: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDataType {
    Transform,
    Attribute,
}

/// The scene item a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortTarget {
    Node(NodeId),
    Attribute(AttrId),
}

/// A component input or output.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub direction: PortDirection,
    pub data_type: PortDataType,
    /// Owning Component node.
    pub component: NodeId,
    pub target: Option<PortTarget>,
    /// `None` means unconnected.
    pub source: Option<PortId>,
}

impl Port {
    pub fn target_node(&self) -> Option<NodeId> {
        match self.target {
            Some(PortTarget::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn target_attribute(&self) -> Option<AttrId> {
        match self.target {
            Some(PortTarget::Attribute(attr)) => Some(attr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Procedural solver evaluated by the host.
    Solver {
        solver_type: String,
        extension: String,
    },
    Custom(String),
}

impl OperatorKind {
    pub fn type_name(&self) -> &str {
        match self {
            OperatorKind::Solver { .. } => "SolverOperator",
            OperatorKind::Custom(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingTarget {
    Node(NodeId),
    Port(PortId),
    Attribute(AttrId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorBinding {
    pub name: String,
    pub target: BindingTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    pub kind: OperatorKind,
    pub component: NodeId,
    pub inputs: Vec<OperatorBinding>,
    pub outputs: Vec<OperatorBinding>,
}

/// The scene graph: a validated collection of nodes and the entities they own.
///
/// Entities are stored in vectors indexed by their IDs. The graph is built once
/// by authoring code and persists across builds; only the synchronizer writes
/// back into it.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) ports: Vec<Port>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) operators: Vec<Operator>,
    pub(crate) roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Nodes without a parent, in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.slot())
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.slot())
    }

    pub fn attribute(&self, id: AttrId) -> Option<&Attribute> {
        self.attributes.get(id.slot())
    }

    pub fn attribute_mut(&mut self, id: AttrId) -> Option<&mut Attribute> {
        self.attributes.get_mut(id.slot())
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.slot())
    }

    pub fn operator(&self, id: OperatorId) -> Option<&Operator> {
        self.operators.get(id.slot())
    }

    /// Dot-separated names from the root down to `id`.
    ///
    /// Unknown IDs render as `<missing:N>` so error messages never fail.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match self.node(current) {
                Some(node) => {
                    names.push(node.name.as_str());
                    cursor = node.parent;
                }
                None => return format!("<missing:{}>", current),
            }
            // validation rejects cycles; bail out rather than loop on a corrupt graph
            if names.len() > self.nodes.len() {
                break;
            }
        }
        names.reverse();
        names.join(".")
    }

    /// Path of an attribute: `<owner path>.<attribute name>`.
    pub fn attribute_path(&self, id: AttrId) -> String {
        match self.attribute(id) {
            Some(attr) => format!("{}.{}", self.full_path(attr.owner), attr.name),
            None => format!("<missing-attribute:{}>", id),
        }
    }

    /// Path of a port: `<component path>.<port name>`.
    pub fn port_path(&self, id: PortId) -> String {
        match self.port(id) {
            Some(port) => format!("{}.{}", self.full_path(port.component), port.name),
            None => format!("<missing-port:{}>", id),
        }
    }

    /// The component a node belongs to.
    ///
    /// A Component owns itself. Otherwise an explicit membership link wins over
    /// the nearest Component ancestor.
    pub fn owning_component(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.is_component() {
            return Some(id);
        }
        if let Some(component) = node.component {
            return Some(component);
        }
        let mut cursor = node.parent;
        let mut steps = 0;
        while let Some(current) = cursor {
            let ancestor = self.node(current)?;
            if ancestor.is_component() {
                return Some(current);
            }
            cursor = ancestor.parent;
            steps += 1;
            if steps > self.nodes.len() {
                return None;
            }
        }
        None
    }

    /// Find a direct child by name.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).is_some_and(|n| n.name == name))
    }

    /// Resolve a dot-separated path starting at one of the roots.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self
            .roots
            .iter()
            .copied()
            .find(|&root| self.node(root).is_some_and(|n| n.name == first))?;
        for segment in segments {
            current = self.child_by_name(current, segment)?;
        }
        Some(current)
    }

    /// Pre-order iteration over the subtree rooted at `root`, children in stored order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }
}
