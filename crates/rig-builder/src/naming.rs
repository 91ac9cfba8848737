//! Build name resolution.
//!
//! A build name is assembled from the naming template entry for the entity's
//! kind. Resolution is a pure function of the graph and the template; it is
//! called once per node and again whenever a pass needs a constraint or
//! operator name.

use rig_config::{DEFAULT_KEY, NameToken, NamingConfig};
use rig_core::NodeId;
use rig_graph::{Constraint, GraphError, Operator, SceneGraph};

use crate::error::{BuildError, BuildResult};

/// The parts of a nameable entity the template can refer to.
struct Subject<'a> {
    name: &'a str,
    kind: &'a str,
    explicit: bool,
    component: Option<NodeId>,
}

#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    naming: &'a NamingConfig,
}

impl<'a> NameResolver<'a> {
    pub fn new(naming: &'a NamingConfig) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &'a NamingConfig {
        self.naming
    }

    /// Build name for a node.
    pub fn resolve(&self, graph: &SceneGraph, node: NodeId) -> BuildResult<String> {
        let n = graph.node(node).ok_or(GraphError::InvalidNodeRef { node })?;
        let subject = Subject {
            name: &n.name,
            kind: n.kind.type_name(),
            explicit: n.explicit_name,
            component: graph.owning_component(node),
        };
        self.assemble(graph, &subject, || graph.full_path(node))
    }

    /// Build name for a constraint; location and component come from the constrainee.
    pub fn resolve_constraint(
        &self,
        graph: &SceneGraph,
        constraint: &Constraint,
    ) -> BuildResult<String> {
        let subject = Subject {
            name: &constraint.name,
            kind: constraint.kind.type_name(),
            explicit: false,
            component: graph.owning_component(constraint.constrainee),
        };
        self.assemble(graph, &subject, || {
            format!("{}.{}", graph.full_path(constraint.constrainee), constraint.name)
        })
    }

    pub fn resolve_operator(&self, graph: &SceneGraph, operator: &Operator) -> BuildResult<String> {
        let subject = Subject {
            name: &operator.name,
            kind: operator.kind.type_name(),
            explicit: false,
            component: Some(operator.component),
        };
        self.assemble(graph, &subject, || {
            format!("{}.{}", graph.full_path(operator.component), operator.name)
        })
    }

    fn assemble(
        &self,
        graph: &SceneGraph,
        subject: &Subject<'_>,
        path: impl Fn() -> String,
    ) -> BuildResult<String> {
        let format = self
            .naming
            .format_for(subject.kind)
            .ok_or_else(|| BuildError::UnresolvableToken {
                token: DEFAULT_KEY.to_string(),
                path: path(),
            })?;

        let mut built = if subject.explicit {
            subject.name.to_string()
        } else {
            String::new()
        };

        let component = subject.component.and_then(|c| graph.node(c));

        for token in format {
            match token {
                NameToken::Sep => built.push_str(&self.naming.separator),
                NameToken::Location => {
                    let location = component.and_then(|c| c.location()).ok_or_else(|| {
                        BuildError::InvalidLocation {
                            location: "<none>".to_string(),
                            path: path(),
                        }
                    })?;
                    if !self.naming.is_valid_location(location) {
                        return Err(BuildError::InvalidLocation {
                            location: location.to_string(),
                            path: path(),
                        });
                    }
                    built.push_str(location);
                }
                NameToken::Type => {
                    let type_token = self.naming.type_token(subject.kind).ok_or_else(|| {
                        BuildError::UnresolvableToken {
                            token: token.to_string(),
                            path: path(),
                        }
                    })?;
                    built.push_str(type_token);
                }
                NameToken::Name => built.push_str(subject.name),
                NameToken::Component => {
                    let owner = component.ok_or_else(|| BuildError::UnresolvableToken {
                        token: token.to_string(),
                        path: path(),
                    })?;
                    built.push_str(&owner.name);
                }
                NameToken::Unknown(raw) => {
                    return Err(BuildError::UnresolvableToken {
                        token: raw.clone(),
                        path: path(),
                    });
                }
            }
        }

        Ok(built)
    }
}
