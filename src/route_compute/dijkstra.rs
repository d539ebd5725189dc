use std::collections::BTreeSet;

use crate::error::{RoutingError, RoutingResult};
use crate::model::graph::{Graph, NodeId};

use super::frontier::DistanceFrontier;
use super::types::link_weight;
use super::{DistanceVector, ShortestPathEngine};

#[derive(Debug, Default, Clone, Copy)]
pub struct Dijkstra;

impl ShortestPathEngine for Dijkstra {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn shortest_paths(&self, graph: &Graph, source: &str) -> RoutingResult<DistanceVector> {
        compute_dijkstra(graph, source)
    }
}

/// Dijkstra over non-negative weights. A negative weight (`-inf` included)
/// fails the run as soon as a settled node tries to relax it; negative edges
/// never reached are ignored. NaN and `+inf` weights are absent links.
/// Predecessors follow the canonical tree of `DistanceVector`.
pub fn compute_dijkstra(graph: &Graph, source: &str) -> RoutingResult<DistanceVector> {
    if !graph.contains_node(source) {
        return Err(RoutingError::NodeNotFound(NodeId::from(source)));
    }

    let src = NodeId::from(source);
    let mut vector = DistanceVector::new(graph, src.clone());
    let mut settled: BTreeSet<NodeId> = BTreeSet::new();
    let mut frontier = DistanceFrontier::new();
    frontier.push(src, 0.0);

    loop {
        let Some((u, cost_u)) = frontier.pop_min(|node, cost| {
            settled.contains(node) || cost.total_cmp(&vector.distance_of(node)).is_gt()
        }) else {
            break;
        };
        settled.insert(u.clone());

        let Some(neighbors) = graph.outgoing(&u) else {
            continue;
        };
        for (v, weight) in neighbors {
            let Some(weight) = link_weight(*weight) else {
                continue;
            };
            if weight < 0.0 {
                return Err(RoutingError::NegativeWeight {
                    from: u.clone(),
                    to: v.clone(),
                    weight,
                });
            }
            if settled.contains(v) {
                continue;
            }

            let candidate = cost_u + weight;
            if candidate < vector.distance_of(v) {
                vector.relax(v, candidate, &u);
                frontier.push(v.clone(), candidate);
            }
        }
    }

    vector.canonicalize_predecessors(graph);
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        Graph::from_edges([("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 4.0)])
    }

    #[test]
    fn triangle_prefers_two_hop_path() {
        let out = compute_dijkstra(&triangle(), "A").expect("non-negative graph");
        assert_eq!(out.distance("A"), Some(0.0));
        assert_eq!(out.distance("B"), Some(1.0));
        assert_eq!(out.distance("C"), Some(3.0));
        assert_eq!(out.predecessor("C").map(NodeId::as_str), Some("B"));
        assert_eq!(out.predecessor("A"), None);
    }

    #[test]
    fn unreached_nodes_stay_infinite() {
        let mut graph = triangle();
        graph.add_edge("D", "A", 1.0);
        let out = compute_dijkstra(&graph, "A").expect("non-negative graph");
        assert_eq!(out.distance("D"), Some(f64::INFINITY));
        assert_eq!(out.predecessor("D"), None);
    }

    #[test]
    fn equal_cost_tie_goes_to_lower_id_predecessor() {
        let graph = Graph::from_edges([
            ("S", "A", 1.0),
            ("S", "B", 1.0),
            ("A", "T", 1.0),
            ("B", "T", 1.0),
        ]);
        let out = compute_dijkstra(&graph, "S").expect("non-negative graph");
        assert_eq!(out.distance("T"), Some(2.0));
        assert_eq!(out.predecessor("T").map(NodeId::as_str), Some("A"));
    }

    #[test]
    fn unknown_source_fails() {
        assert_eq!(
            compute_dijkstra(&triangle(), "Z").unwrap_err(),
            RoutingError::NodeNotFound("Z".into())
        );
    }

    #[test]
    fn reachable_negative_weight_fails() {
        let mut graph = triangle();
        graph.add_edge("B", "D", -1.0);
        let err = compute_dijkstra(&graph, "A").unwrap_err();
        assert_eq!(
            err,
            RoutingError::NegativeWeight {
                from: "B".into(),
                to: "D".into(),
                weight: -1.0,
            }
        );
    }

    #[test]
    fn unreachable_negative_weight_is_ignored() {
        let mut graph = triangle();
        graph.add_edge("X", "A", -5.0);
        let out = compute_dijkstra(&graph, "A").expect("negative edge not reachable");
        assert_eq!(out.distance("C"), Some(3.0));
    }

    #[test]
    fn infinite_and_nan_weights_are_treated_as_missing_links() {
        let graph = Graph::from_edges([
            ("A", "B", f64::INFINITY),
            ("A", "C", 1.0),
            ("A", "D", f64::NAN),
        ]);
        let out = compute_dijkstra(&graph, "A").expect("finite graph");
        assert!(!out.is_reachable("B"));
        assert!(out.is_reachable("C"));
        assert!(!out.is_reachable("D"));
    }

    #[test]
    fn negative_infinity_is_a_negative_weight() {
        let graph = Graph::from_edges([("A", "B", 1.0), ("B", "C", f64::NEG_INFINITY)]);
        assert_eq!(
            compute_dijkstra(&graph, "A").unwrap_err(),
            RoutingError::NegativeWeight {
                from: "B".into(),
                to: "C".into(),
                weight: f64::NEG_INFINITY,
            }
        );
    }

    #[test]
    fn equal_cost_paths_pick_fewest_hops_over_settle_order() {
        // T is reached at cost 2 through S-D-A and through S-B. D and A settle
        // before B, but the shorter hop count wins.
        let graph = Graph::from_edges([
            ("A", "T", 1.0),
            ("B", "T", 1.0),
            ("D", "A", 0.5),
            ("S", "B", 1.0),
            ("S", "D", 0.5),
        ]);
        let out = compute_dijkstra(&graph, "S").expect("non-negative graph");
        assert_eq!(out.distance("T"), Some(2.0));
        assert_eq!(out.predecessor("T").map(NodeId::as_str), Some("B"));
        assert_eq!(out.path_to("T"), Some(vec![NodeId::from("S"), "B".into(), "T".into()]));
    }
}
