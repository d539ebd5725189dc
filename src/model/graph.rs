use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RoutingError, RoutingResult};

/// Router identifier. Ordering is plain string ordering and drives every
/// deterministic iteration in the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&NodeId> for NodeId {
    fn from(value: &NodeId) -> Self {
        value.clone()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Adjacency = BTreeMap<NodeId, BTreeMap<NodeId, f64>>;

/// Weighted directed graph. Every node owns an adjacency entry, possibly
/// empty, so isolated nodes stay enumerable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adjacency: Adjacency,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<I, S, T>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, T, f64)>,
        S: Into<NodeId>,
        T: Into<NodeId>,
    {
        let mut graph = Self::new();
        for (source, target, weight) in edges {
            graph.add_edge(source, target, weight);
        }
        graph
    }

    /// Returns `true` if the node was not present before.
    pub fn add_node(&mut self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, BTreeMap::new());
        true
    }

    /// Inserts or overwrites `source -> target`, creating both endpoints.
    /// Returns the weight that was replaced, if any.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        weight: f64,
    ) -> Option<f64> {
        let source = source.into();
        let target = target.into();
        self.adjacency.entry(target.clone()).or_default();
        self.adjacency
            .entry(source)
            .or_default()
            .insert(target, weight)
    }

    /// Undirected link, stored as two directed edges of equal weight.
    pub fn add_link(&mut self, a: impl Into<NodeId>, b: impl Into<NodeId>, weight: f64) {
        let a = a.into();
        let b = b.into();
        self.add_edge(a.clone(), b.clone(), weight);
        self.add_edge(b, a, weight);
    }

    /// Removes `source -> target` if present. Absent edges are a no-op.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Option<f64> {
        self.adjacency
            .get_mut(source)
            .and_then(|neighbors| neighbors.remove(target))
    }

    /// Replaces the weight of an existing edge and returns the old one.
    pub fn update_weight(&mut self, source: &str, target: &str, weight: f64) -> RoutingResult<f64> {
        let slot = self
            .adjacency
            .get_mut(source)
            .and_then(|neighbors| neighbors.get_mut(target))
            .ok_or_else(|| RoutingError::EdgeNotFound {
                from: NodeId::from(source),
                to: NodeId::from(target),
            })?;
        Ok(std::mem::replace(slot, weight))
    }

    /// One-hop `(target, weight)` pairs in ascending target order.
    pub fn neighbors(
        &self,
        node: &str,
    ) -> RoutingResult<impl Iterator<Item = (&NodeId, f64)> + '_> {
        let neighbors = self
            .adjacency
            .get(node)
            .ok_or_else(|| RoutingError::NodeNotFound(NodeId::from(node)))?;
        Ok(neighbors.iter().map(|(target, weight)| (target, *weight)))
    }

    pub fn weight(&self, source: &str, target: &str) -> Option<f64> {
        self.adjacency
            .get(source)
            .and_then(|neighbors| neighbors.get(target))
            .copied()
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.weight(source, target).is_some()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.adjacency.keys()
    }

    /// All edges, ascending by source then target.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, f64)> {
        self.adjacency.iter().flat_map(|(source, neighbors)| {
            neighbors
                .iter()
                .map(move |(target, weight)| (source, target, *weight))
        })
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum()
    }

    /// Drops every edge the predicate rejects. Nodes are kept.
    pub fn retain_edges<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&NodeId, &NodeId, f64) -> bool,
    {
        let mut removed = 0;
        for (source, neighbors) in &mut self.adjacency {
            let before = neighbors.len();
            neighbors.retain(|target, weight| keep(source, target, *weight));
            removed += before - neighbors.len();
        }
        removed
    }

    pub(crate) fn outgoing(&self, node: &NodeId) -> Option<&BTreeMap<NodeId, f64>> {
        self.adjacency.get(node)
    }
}
