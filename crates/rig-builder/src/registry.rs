//! Source-to-target identity registry.
//!
//! Records which host item was created for which graph entity during one build.
//! Lookup is O(1) through a hash index; iteration follows registration order so
//! the synchronizer visits items deterministically.

use std::collections::HashMap;

use rig_core::{AttrId, ConstraintId, NodeId, OperatorId, PortId};
use tracing::debug;

use crate::backend::TargetHandle;

/// Identity of a registered graph entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    Node(NodeId),
    Attribute(AttrId),
    Constraint(ConstraintId),
    /// A realized port connection, keyed by the driven port.
    Connection(PortId),
    /// A constraint synthesized for a transform connection, by index into the build output.
    Synthesized(usize),
    Operator(OperatorId),
}

impl SourceId {
    pub fn node(self) -> Option<NodeId> {
        match self {
            SourceId::Node(id) => Some(id),
            _ => None,
        }
    }
}

/// One source/target pairing. `target` is `None` when the backend reported "not created".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub source: SourceId,
    pub target: Option<TargetHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    entries: Vec<Pairing>,
    index: HashMap<SourceId, usize>,
    by_target: HashMap<TargetHandle, usize>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pairing. A second registration for the same source replaces the
    /// first in place.
    pub fn register(&mut self, source: SourceId, target: Option<TargetHandle>) {
        match self.index.get(&source) {
            Some(&slot) => {
                debug!(?source, "overwriting existing registry entry");
                if let Some(old) = self.entries[slot].target.take() {
                    self.unindex_target(old, slot);
                }
                self.entries[slot].target = target;
                if let Some(target) = target {
                    self.index_target(target, slot);
                }
            }
            None => {
                let slot = self.entries.len();
                self.index.insert(source, slot);
                self.entries.push(Pairing { source, target });
                if let Some(target) = target {
                    self.index_target(target, slot);
                }
            }
        }
    }

    fn index_target(&mut self, target: TargetHandle, slot: usize) {
        let first = self.by_target.entry(target).or_insert(slot);
        *first = (*first).min(slot);
    }

    // `slot` has already released `target`; hand it to the earliest entry still holding it.
    fn unindex_target(&mut self, target: TargetHandle, slot: usize) {
        if self.by_target.get(&target) != Some(&slot) {
            return;
        }
        self.by_target.remove(&target);
        if let Some(next) = self.entries.iter().position(|p| p.target == Some(target)) {
            self.by_target.insert(target, next);
        }
    }

    /// Target created for `source`; `None` if unregistered or not created.
    pub fn lookup(&self, source: SourceId) -> Option<TargetHandle> {
        self.get(source).and_then(|p| p.target)
    }

    pub fn get(&self, source: SourceId) -> Option<&Pairing> {
        self.index.get(&source).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, source: SourceId) -> bool {
        self.index.contains_key(&source)
    }

    /// Reverse lookup: the source a target was created for.
    ///
    /// When several sources share one handle (a synthesized constraint and
    /// the connection it realizes), the earliest registration wins, so a
    /// transform connection resolves to its `Synthesized` key.
    pub fn source_of(&self, target: TargetHandle) -> Option<SourceId> {
        self.by_target
            .get(&target)
            .map(|&slot| self.entries[slot].source)
    }

    /// Pairings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Pairing> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
