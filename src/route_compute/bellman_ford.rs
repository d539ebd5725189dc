use tracing::debug;

use crate::error::{RoutingError, RoutingResult};
use crate::model::graph::{Graph, NodeId};

use super::types::link_weight;
use super::{DistanceVector, ShortestPathEngine};

#[derive(Debug, Default, Clone, Copy)]
pub struct BellmanFord;

impl ShortestPathEngine for BellmanFord {
    fn name(&self) -> &'static str {
        "bellman_ford"
    }

    fn shortest_paths(&self, graph: &Graph, source: &str) -> RoutingResult<DistanceVector> {
        compute_bellman_ford(graph, source)
    }
}

/// One pass over every edge, ascending by source then target. A reached
/// `-inf` link has no finite shortest distance and fails the run.
fn relax_pass(graph: &Graph, vector: &mut DistanceVector) -> RoutingResult<bool> {
    let mut changed = false;
    for (u, v, weight) in graph.edges() {
        let Some(weight) = link_weight(weight) else {
            continue;
        };
        let base = vector.distance_of(u);
        if !base.is_finite() {
            continue;
        }
        if weight == f64::NEG_INFINITY {
            return Err(RoutingError::NegativeWeight {
                from: u.clone(),
                to: v.clone(),
                weight,
            });
        }
        let candidate = base + weight;
        if candidate < vector.distance_of(v) {
            vector.relax(v, candidate, u);
            changed = true;
        }
    }
    Ok(changed)
}

fn find_relaxable_edge<'g>(
    graph: &'g Graph,
    vector: &DistanceVector,
) -> Option<(&'g NodeId, &'g NodeId)> {
    graph.edges().find_map(|(u, v, weight)| {
        let base = vector.distance_of(u);
        let improves = link_weight(weight)
            .is_some_and(|weight| base.is_finite() && base + weight < vector.distance_of(v));
        improves.then_some((u, v))
    })
}

/// Bellman-Ford with negative-cycle detection. Runs at most |V| - 1 passes
/// (stopping once a pass changes nothing) and then one verification pass;
/// strict improvement means a negative cycle is reachable from the source.
/// Predecessors follow the canonical tree of `DistanceVector`, so on
/// non-negative graphs the result equals Dijkstra's.
pub fn compute_bellman_ford(graph: &Graph, source: &str) -> RoutingResult<DistanceVector> {
    if !graph.contains_node(source) {
        return Err(RoutingError::NodeNotFound(NodeId::from(source)));
    }

    let src = NodeId::from(source);
    let mut vector = DistanceVector::new(graph, src.clone());

    for _ in 0..graph.node_count().saturating_sub(1) {
        if !relax_pass(graph, &mut vector)? {
            break;
        }
    }

    if let Some((u, v)) = find_relaxable_edge(graph, &vector) {
        debug!(source = %src, from = %u, to = %v, "edge still relaxes after |V|-1 passes");
        return Err(RoutingError::NegativeCycleDetected { origin: src });
    }

    vector.canonicalize_predecessors(graph);
    Ok(vector)
}
