//! Graph validation logic.

use std::collections::HashSet;

use rig_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Attribute, BindingTarget, Constraint, Node, Operator, Port, PortTarget};

/// Render a node path from the raw arena (the graph is not frozen yet).
fn path_of(nodes: &[Node], id: NodeId) -> String {
    let mut names = Vec::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let Some(node) = nodes.get(current.slot()) else {
            names.push(format!("<missing:{}>", current));
            break;
        };
        names.push(node.name.clone());
        cursor = node.parent;
        if names.len() > nodes.len() {
            break;
        }
    }
    names.reverse();
    names.join(".")
}

fn node_exists(nodes: &[Node], id: NodeId) -> bool {
    id.slot() < nodes.len()
}

fn require_component(nodes: &[Node], id: NodeId, what: &'static str) -> GraphResult<()> {
    match nodes.get(id.slot()) {
        None => Err(GraphError::InvalidNodeRef { node: id }),
        Some(node) if !node.is_component() => Err(GraphError::NotAComponent {
            what,
            path: path_of(nodes, id),
        }),
        Some(_) => Ok(()),
    }
}

/// Validate parent/child links: references exist, both directions agree, no cycles.
pub(crate) fn validate_hierarchy(nodes: &[Node]) -> GraphResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        if node.id.slot() != i {
            return Err(GraphError::InconsistentHierarchy {
                path: node.name.clone(),
            });
        }

        if let Some(parent) = node.parent {
            let Some(parent_node) = nodes.get(parent.slot()) else {
                return Err(GraphError::InvalidNodeRef { node: parent });
            };
            if !parent_node.children.contains(&node.id) {
                return Err(GraphError::InconsistentHierarchy {
                    path: path_of(nodes, node.id),
                });
            }
        }

        let mut seen = HashSet::new();
        for &child in &node.children {
            let Some(child_node) = nodes.get(child.slot()) else {
                return Err(GraphError::InvalidNodeRef { node: child });
            };
            if child_node.parent != Some(node.id) || !seen.insert(child) {
                return Err(GraphError::InconsistentHierarchy {
                    path: path_of(nodes, child),
                });
            }
        }

        if let Some(component) = node.component {
            require_component(nodes, component, "component membership")?;
        }
    }

    // Walking up from any node must terminate within nodes.len() steps
    for node in nodes {
        let mut steps = 0;
        let mut cursor = node.parent;
        while let Some(current) = cursor {
            if current == node.id || steps > nodes.len() {
                return Err(GraphError::HierarchyCycle {
                    path: node.name.clone(),
                });
            }
            cursor = nodes[current.slot()].parent;
            steps += 1;
        }
    }

    Ok(())
}

/// Validate every non-owning reference held by ports, attributes, constraints and operators.
pub(crate) fn validate_references(
    nodes: &[Node],
    ports: &[Port],
    attributes: &[Attribute],
    constraints: &[Constraint],
    operators: &[Operator],
) -> GraphResult<()> {
    for attr in attributes {
        let Some(owner) = nodes.get(attr.owner.slot()) else {
            return Err(GraphError::InvalidAttrRef {
                attr: attr.id,
                what: "owner node",
            });
        };
        let in_group = owner
            .attribute_groups
            .get(attr.group)
            .is_some_and(|g| g.attributes.contains(&attr.id));
        if !in_group {
            return Err(GraphError::InvalidAttrRef {
                attr: attr.id,
                what: "attribute group",
            });
        }
        if let Some(driver) = attr.driver {
            if driver.slot() >= attributes.len() {
                return Err(GraphError::InvalidAttrRef {
                    attr: attr.id,
                    what: "driver attribute",
                });
            }
        }
    }

    for (i, cns) in constraints.iter().enumerate() {
        let id = rig_core::ConstraintId::from_index(i as u32);
        let Some(constrainee) = nodes.get(cns.constrainee.slot()) else {
            return Err(GraphError::InvalidConstraintRef {
                constraint: id,
                name: cns.name.clone(),
                node: cns.constrainee,
            });
        };
        if !constrainee.constraints.contains(&id) {
            return Err(GraphError::DetachedConstraint {
                name: cns.name.clone(),
                path: path_of(nodes, cns.constrainee),
            });
        }
        if cns.constrainers.is_empty() {
            return Err(GraphError::NoConstrainers {
                name: cns.name.clone(),
            });
        }
        if let Some(&missing) = cns.constrainers.iter().find(|&&c| !node_exists(nodes, c)) {
            return Err(GraphError::InvalidConstraintRef {
                constraint: id,
                name: cns.name.clone(),
                node: missing,
            });
        }
    }

    for port in ports {
        require_component(nodes, port.component, "port")?;
        match port.target {
            Some(PortTarget::Node(node)) if !node_exists(nodes, node) => {
                return Err(GraphError::InvalidPortRef {
                    port: port.id,
                    what: "target node",
                });
            }
            Some(PortTarget::Attribute(attr)) if attr.slot() >= attributes.len() => {
                return Err(GraphError::InvalidPortRef {
                    port: port.id,
                    what: "target attribute",
                });
            }
            _ => {}
        }
        if let Some(source) = port.source {
            if source.slot() >= ports.len() {
                return Err(GraphError::InvalidPortRef {
                    port: port.id,
                    what: "source port",
                });
            }
        }
    }

    for op in operators {
        require_component(nodes, op.component, "operator")?;
        for binding in op.inputs.iter().chain(&op.outputs) {
            let exists = match binding.target {
                BindingTarget::Node(node) => node_exists(nodes, node),
                BindingTarget::Port(port) => port.slot() < ports.len(),
                BindingTarget::Attribute(attr) => attr.slot() < attributes.len(),
            };
            if !exists {
                return Err(GraphError::InvalidBinding {
                    operator: op.id,
                    name: op.name.clone(),
                    binding: binding.name.clone(),
                });
            }
        }
    }

    Ok(())
}
