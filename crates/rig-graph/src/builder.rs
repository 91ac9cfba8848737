//! Incremental scene graph builder.

use rig_core::{AttrId, ConstraintId, NodeId, OperatorId, PortId, Xfo};

use crate::error::GraphResult;
use crate::graph::{
    Attribute, AttributeGroup, AttributeValue, BindingTarget, Constraint, ConstraintKind, Node,
    NodeKind, Operator, OperatorBinding, OperatorKind, Port, PortDataType, PortDirection,
    PortTarget, SceneGraph,
};
use crate::validate;

/// Builder for authoring a rig scene graph incrementally.
///
/// Authoring calls never fail: references are only checked when `build()`
/// validates and freezes the graph. Setters on unknown IDs are ignored.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    ports: Vec<Port>,
    attributes: Vec<Attribute>,
    constraints: Vec<Constraint>,
    operators: Vec<Operator>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, name.into(), kind));
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.slot())
    }

    /// Add a parentless node (typically the rig container).
    pub fn add_root(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        self.push_node(name, kind)
    }

    /// Add a node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.push_node(name, kind);
        self.reparent(id, parent);
        id
    }

    /// Add a Component under `parent` with the given location code.
    pub fn add_component(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> NodeId {
        let id = self.add_child(parent, name, NodeKind::Component);
        self.set_location(id, location);
        id
    }

    /// Move `node` to the end of `parent`'s children.
    pub fn reparent(&mut self, node: NodeId, parent: NodeId) {
        if node.slot() >= self.nodes.len() {
            return;
        }
        let previous = self.nodes[node.slot()].parent;
        if let Some(old_parent) = previous.and_then(|old| self.node_mut(old)) {
            old_parent.children.retain(|&c| c != node);
        }
        self.nodes[node.slot()].parent = Some(parent);
        if let Some(new_parent) = self.node_mut(parent) {
            new_parent.children.push(node);
        }
    }

    pub fn set_location(&mut self, component: NodeId, location: impl Into<String>) {
        if let Some(data) = self
            .node_mut(component)
            .and_then(|n| n.component_data.as_mut())
        {
            data.location = location.into();
        }
    }

    /// Declare that `node` belongs to `component` regardless of where it is parented.
    pub fn set_component(&mut self, node: NodeId, component: NodeId) {
        if let Some(n) = self.node_mut(node) {
            n.component = Some(component);
        }
    }

    pub fn rename_node(&mut self, node: NodeId, new_name: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.name = new_name.into();
        }
    }

    pub fn set_explicit_name(&mut self, node: NodeId, explicit: bool) {
        if let Some(n) = self.node_mut(node) {
            n.explicit_name = explicit;
        }
    }

    pub fn set_xfo(&mut self, node: NodeId, xfo: Xfo) {
        if let Some(n) = self.node_mut(node) {
            n.xfo = xfo;
        }
    }

    pub fn set_visibility(&mut self, node: NodeId, visible: bool) {
        if let Some(n) = self.node_mut(node) {
            n.visible = visible;
        }
    }

    pub fn set_shape_visibility(&mut self, node: NodeId, visible: bool) {
        if let Some(n) = self.node_mut(node) {
            n.shape_visible = visible;
        }
    }

    pub fn set_color(&mut self, node: NodeId, color: impl Into<String>) {
        if let Some(n) = self.node_mut(node) {
            n.color = Some(color.into());
        }
    }

    /// Append an attribute group to `node` and return its index.
    pub fn add_attribute_group(&mut self, node: NodeId, name: impl Into<String>) -> usize {
        match self.node_mut(node) {
            Some(n) => {
                n.attribute_groups.push(AttributeGroup::new(name));
                n.attribute_groups.len() - 1
            }
            None => 0,
        }
    }

    /// Add an attribute to group `group` of `node`.
    pub fn add_attribute(
        &mut self,
        node: NodeId,
        group: usize,
        name: impl Into<String>,
        value: AttributeValue,
    ) -> AttrId {
        let id = AttrId::from_index(self.attributes.len() as u32);
        self.attributes.push(Attribute {
            id,
            name: name.into(),
            owner: node,
            group,
            value,
            driver: None,
        });
        if let Some(g) = self
            .node_mut(node)
            .and_then(|n| n.attribute_groups.get_mut(group))
        {
            g.attributes.push(id);
        }
        id
    }

    /// Make `driver` drive the value of `driven`.
    pub fn connect_attribute(&mut self, driven: AttrId, driver: AttrId) {
        if let Some(attr) = self.attributes.get_mut(driven.slot()) {
            attr.driver = Some(driver);
        }
    }

    /// Declare a constraint on `constrainee` and attach it there.
    pub fn add_constraint(
        &mut self,
        constrainee: NodeId,
        name: impl Into<String>,
        kind: ConstraintKind,
    ) -> ConstraintId {
        let id = ConstraintId::from_index(self.constraints.len() as u32);
        self.constraints
            .push(Constraint::new(name, kind, constrainee));
        if let Some(n) = self.node_mut(constrainee) {
            n.constraints.push(id);
        }
        id
    }

    pub fn add_constrainer(&mut self, constraint: ConstraintId, constrainer: NodeId) {
        if let Some(c) = self.constraints.get_mut(constraint.slot()) {
            c.constrainers.push(constrainer);
        }
    }

    pub fn set_maintain_offset(&mut self, constraint: ConstraintId, maintain: bool) {
        if let Some(c) = self.constraints.get_mut(constraint.slot()) {
            c.maintain_offset = maintain;
        }
    }

    fn push_port(
        &mut self,
        component: NodeId,
        name: impl Into<String>,
        direction: PortDirection,
        data_type: PortDataType,
        target: Option<PortTarget>,
    ) -> PortId {
        let id = PortId::from_index(self.ports.len() as u32);
        self.ports.push(Port {
            id,
            name: name.into(),
            direction,
            data_type,
            component,
            target,
            source: None,
        });
        id
    }

    /// Add an input port to `component`. Port lists are attached in `build()`.
    pub fn add_input(
        &mut self,
        component: NodeId,
        name: impl Into<String>,
        data_type: PortDataType,
        target: Option<PortTarget>,
    ) -> PortId {
        self.push_port(component, name, PortDirection::Input, data_type, target)
    }

    /// Add an output port to `component`. Port lists are attached in `build()`.
    pub fn add_output(
        &mut self,
        component: NodeId,
        name: impl Into<String>,
        data_type: PortDataType,
        target: Option<PortTarget>,
    ) -> PortId {
        self.push_port(component, name, PortDirection::Output, data_type, target)
    }

    /// Connect `port` to `source` (usually another component's output).
    pub fn set_port_source(&mut self, port: PortId, source: PortId) {
        if let Some(p) = self.ports.get_mut(port.slot()) {
            p.source = Some(source);
        }
    }

    pub fn set_port_target(&mut self, port: PortId, target: PortTarget) {
        if let Some(p) = self.ports.get_mut(port.slot()) {
            p.target = Some(target);
        }
    }

    pub fn add_operator(
        &mut self,
        component: NodeId,
        name: impl Into<String>,
        kind: OperatorKind,
    ) -> OperatorId {
        let id = OperatorId::from_index(self.operators.len() as u32);
        self.operators.push(Operator {
            id,
            name: name.into(),
            kind,
            component,
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        id
    }

    pub fn bind_operator_input(
        &mut self,
        operator: OperatorId,
        name: impl Into<String>,
        target: BindingTarget,
    ) {
        if let Some(op) = self.operators.get_mut(operator.slot()) {
            op.inputs.push(OperatorBinding {
                name: name.into(),
                target,
            });
        }
    }

    pub fn bind_operator_output(
        &mut self,
        operator: OperatorId,
        name: impl Into<String>,
        target: BindingTarget,
    ) {
        if let Some(op) = self.operators.get_mut(operator.slot()) {
            op.outputs.push(OperatorBinding {
                name: name.into(),
                target,
            });
        }
    }

    /// Validate and freeze the graph.
    ///
    /// Ports and operators are attached to their components in creation order.
    pub fn build(mut self) -> GraphResult<SceneGraph> {
        validate::validate_hierarchy(&self.nodes)?;
        validate::validate_references(
            &self.nodes,
            &self.ports,
            &self.attributes,
            &self.constraints,
            &self.operators,
        )?;

        // validated above: every port/operator component is a Component node
        for port in &self.ports {
            if let Some(data) = self.nodes[port.component.slot()].component_data.as_mut() {
                match port.direction {
                    PortDirection::Input => data.inputs.push(port.id),
                    PortDirection::Output => data.outputs.push(port.id),
                }
            }
        }
        for op in &self.operators {
            if let Some(data) = self.nodes[op.component.slot()].component_data.as_mut() {
                data.operators.push(op.id);
            }
        }

        let roots = self
            .nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect();

        Ok(SceneGraph {
            nodes: self.nodes,
            ports: self.ports,
            attributes: self.attributes,
            constraints: self.constraints,
            operators: self.operators,
            roots,
        })
    }
}
