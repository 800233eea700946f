//! Participant rosters: ordered index to public key mappings

use crate::bundle::Index;
use crate::error::RosterError;
use std::collections::BTreeMap;

/// A participant: its roster index and long-term public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<P> {
    pub index: Index,
    pub public: P,
}

impl<P> Node<P> {
    pub fn new(index: Index, public: P) -> Self {
        Self { index, public }
    }
}

/// Ordered mapping from participant index to public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster<P> {
    nodes: BTreeMap<Index, P>,
}

impl<P> Roster<P> {
    /// Build a roster, rejecting repeated indices
    pub fn new(nodes: impl IntoIterator<Item = Node<P>>) -> Result<Self, RosterError> {
        let mut map = BTreeMap::new();
        for node in nodes {
            if map.insert(node.index, node.public).is_some() {
                return Err(RosterError::DuplicateIndex(node.index));
            }
        }
        Ok(Self { nodes: map })
    }

    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Public key of the participant at `index`
    pub fn find(&self, index: Index) -> Option<&P> {
        self.nodes.get(&index)
    }

    pub fn contains(&self, index: Index) -> bool {
        self.nodes.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = Index> + '_ {
        self.nodes.keys().copied()
    }
}
