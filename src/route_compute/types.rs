use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::graph::{Graph, NodeId};

/// Usable weight of a link, or `None` when it counts as absent (NaN or `+inf`).
pub(crate) fn link_weight(weight: f64) -> Option<f64> {
    (!weight.is_nan() && weight != f64::INFINITY).then_some(weight)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceEntry {
    /// `f64::INFINITY` while the node is unreached.
    pub distance: f64,
    pub predecessor: Option<NodeId>,
}

impl DistanceEntry {
    fn unreached() -> Self {
        Self {
            distance: f64::INFINITY,
            predecessor: None,
        }
    }
}

/// Single-source result: one entry per graph node at computation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceVector {
    source: NodeId,
    entries: BTreeMap<NodeId, DistanceEntry>,
}

impl DistanceVector {
    pub(crate) fn new(graph: &Graph, source: NodeId) -> Self {
        let mut entries: BTreeMap<NodeId, DistanceEntry> = graph
            .nodes()
            .map(|node| (node.clone(), DistanceEntry::unreached()))
            .collect();
        entries.insert(
            source.clone(),
            DistanceEntry {
                distance: 0.0,
                predecessor: None,
            },
        );
        Self { source, entries }
    }

    pub(crate) fn distance_of(&self, node: &NodeId) -> f64 {
        self.entries
            .get(node)
            .map(|entry| entry.distance)
            .unwrap_or(f64::INFINITY)
    }

    pub(crate) fn relax(&mut self, node: &NodeId, distance: f64, predecessor: &NodeId) {
        self.entries.insert(
            node.clone(),
            DistanceEntry {
                distance,
                predecessor: Some(predecessor.clone()),
            },
        );
    }

    /// Replaces the predecessors with one shortest-path tree that depends only
    /// on the final distances. Among the tight in-edges of a node, the
    /// predecessor with the fewest hops from the source wins, lowest id first.
    /// Nodes with no tight in-edge keep their predecessor.
    pub(crate) fn canonicalize_predecessors(&mut self, graph: &Graph) {
        let mut visited: BTreeSet<NodeId> = BTreeSet::from([self.source.clone()]);
        let mut layer: BTreeSet<NodeId> = visited.clone();

        while !layer.is_empty() {
            let mut next = BTreeSet::new();
            for u in &layer {
                let base = self.distance_of(u);
                let Some(neighbors) = graph.outgoing(u) else {
                    continue;
                };
                for (v, weight) in neighbors {
                    let Some(weight) = link_weight(*weight) else {
                        continue;
                    };
                    if visited.contains(v) || base + weight != self.distance_of(v) {
                        continue;
                    }
                    if let Some(entry) = self.entries.get_mut(v) {
                        entry.predecessor = Some(u.clone());
                    }
                    visited.insert(v.clone());
                    next.insert(v.clone());
                }
            }
            layer = next;
        }
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn entry(&self, node: &str) -> Option<&DistanceEntry> {
        self.entries.get(node)
    }

    /// `None` for nodes unknown to the vector, infinity for unreached ones.
    pub fn distance(&self, node: &str) -> Option<f64> {
        self.entry(node).map(|entry| entry.distance)
    }

    pub fn predecessor(&self, node: &str) -> Option<&NodeId> {
        self.entry(node).and_then(|entry| entry.predecessor.as_ref())
    }

    pub fn is_reachable(&self, node: &str) -> bool {
        self.distance(node).is_some_and(f64::is_finite)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &DistanceEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Node sequence from the source to `destination` following the
    /// predecessor chain. `None` if unreachable or the chain is broken.
    pub fn path_to(&self, destination: &str) -> Option<Vec<NodeId>> {
        if self.source == *destination {
            return Some(vec![self.source.clone()]);
        }

        let mut reversed = vec![self.entries.get_key_value(destination)?.0.clone()];
        let mut current = destination;
        for _ in 0..self.entries.len() {
            let parent = self.predecessor(current)?;
            reversed.push(parent.clone());
            if *parent == self.source {
                reversed.reverse();
                return Some(reversed);
            }
            current = parent.as_str();
        }

        None
    }
}
