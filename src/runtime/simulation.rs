use crate::model::events::TopologyEvent;
use crate::model::graph::{Graph, NodeId};

/// Small deterministic generator so simulations replay from a seed.
#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        let raw = self.next_u64() >> 11;
        (raw as f64) / ((1_u64 << 53) as f64)
    }

    /// Uniform integer in `low..=high`.
    pub fn range_u32(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        let span = u64::from(high - low) + 1;
        low + ((self.next_u64() >> 11) % span) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventPolicy {
    pub remove_probability: f64,
    pub min_weight: u32,
    pub max_weight: u32,
}

impl Default for EventPolicy {
    fn default() -> Self {
        Self {
            remove_probability: 0.5,
            min_weight: 1,
            max_weight: 20,
        }
    }
}

/// One random event per existing edge: either removal or a new integer
/// weight. The graph is left untouched; callers apply the events.
pub fn simulate_network_events(
    graph: &Graph,
    rng: &mut LcgRng,
    policy: &EventPolicy,
) -> Vec<TopologyEvent> {
    graph
        .edges()
        .map(|(source, target, _)| {
            if rng.next_f64() < policy.remove_probability {
                TopologyEvent::remove_edge(source, target)
            } else {
                let weight = rng.range_u32(policy.min_weight, policy.max_weight);
                TopologyEvent::update_weight(source, target, f64::from(weight))
            }
        })
        .collect()
}

fn node_name(index: usize, width: usize) -> NodeId {
    NodeId::new(format!("R{index:0width$}"))
}

/// Ring backbone in both directions plus random extra edges with
/// probability `density`. Weights are integers in `1..=19`.
pub fn generate_topology(seed: u64, nodes: usize, density: f64) -> Graph {
    let mut rng = LcgRng::new(seed);
    let mut graph = Graph::new();
    let width = nodes.max(1).to_string().len().max(3);
    let names: Vec<NodeId> = (1..=nodes).map(|idx| node_name(idx, width)).collect();

    for name in &names {
        graph.add_node(name);
    }

    if nodes >= 2 {
        for (idx, name) in names.iter().enumerate() {
            let next = &names[(idx + 1) % nodes];
            graph.add_edge(name, next, f64::from(rng.range_u32(1, 19)));
            graph.add_edge(next, name, f64::from(rng.range_u32(1, 19)));
        }
    }

    let p = density.clamp(0.0, 1.0);
    for u in &names {
        for v in &names {
            if u == v || graph.contains_edge(u.as_str(), v.as_str()) {
                continue;
            }
            if rng.next_f64() < p {
                graph.add_edge(u, v, f64::from(rng.range_u32(1, 19)));
            }
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::events::apply_events;
    use crate::route_compute::{compute_bellman_ford, compute_dijkstra};

    #[test]
    fn rng_is_deterministic_and_bounded() {
        let mut a = LcgRng::new(7);
        let mut b = LcgRng::new(7);
        for _ in 0..100 {
            let x = a.range_u32(1, 20);
            assert_eq!(x, b.range_u32(1, 20));
            assert!((1..=20).contains(&x));
        }
        assert_eq!(LcgRng::new(3).range_u32(5, 5), 5);
    }

    #[test]
    fn simulation_emits_one_event_per_edge() {
        let graph = generate_topology(11, 8, 0.2);
        let mut rng = LcgRng::new(99);
        let events = simulate_network_events(&graph, &mut rng, &EventPolicy::default());
        assert_eq!(events.len(), graph.edge_count());

        let mut replay = LcgRng::new(99);
        assert_eq!(
            events,
            simulate_network_events(&graph, &mut replay, &EventPolicy::default())
        );

        let mut mutated = graph.clone();
        apply_events(&mut mutated, &events).expect("events target existing edges");
        assert!(mutated.edge_count() <= graph.edge_count());
        assert_eq!(mutated.node_count(), graph.node_count());
        for (_, _, weight) in mutated.edges() {
            assert!((1.0..=20.0).contains(&weight));
        }
    }

    #[test]
    fn remove_probability_bounds_are_respected() {
        let graph = generate_topology(5, 6, 0.3);
        let mut rng = LcgRng::new(1);
        let all_updates = EventPolicy {
            remove_probability: 0.0,
            ..EventPolicy::default()
        };
        assert!(simulate_network_events(&graph, &mut rng, &all_updates)
            .iter()
            .all(|event| matches!(event, TopologyEvent::UpdateWeight { .. })));

        let all_removals = EventPolicy {
            remove_probability: 1.0,
            ..EventPolicy::default()
        };
        assert!(simulate_network_events(&graph, &mut rng, &all_removals)
            .iter()
            .all(|event| matches!(event, TopologyEvent::RemoveEdge { .. })));
    }

    #[test]
    fn generated_topology_has_ring_and_sorted_names() {
        let graph = generate_topology(3, 12, 0.0);
        assert_eq!(graph.node_count(), 12);
        assert_eq!(graph.edge_count(), 24);
        let names: Vec<&str> = graph.nodes().map(NodeId::as_str).collect();
        assert_eq!(names.first().copied(), Some("R001"));
        assert_eq!(names.last().copied(), Some("R012"));
        assert!(graph.contains_edge("R012", "R001"));
    }

    #[test]
    fn dijkstra_and_bellman_ford_agree_on_non_negative_graphs() {
        for seed in 1..=10 {
            let mut graph = generate_topology(seed, 25, 0.1);
            let mut rng = LcgRng::new(seed * 31);
            let policy = EventPolicy {
                remove_probability: 0.3,
                ..EventPolicy::default()
            };
            let events = simulate_network_events(&graph, &mut rng, &policy);
            apply_events(&mut graph, &events).expect("events target existing edges");

            for source in graph.nodes() {
                let d = compute_dijkstra(&graph, source.as_str()).expect("non-negative");
                let bf = compute_bellman_ford(&graph, source.as_str()).expect("no cycles");
                assert_eq!(d, bf, "seed {seed} source {source}");
            }
        }
    }
}
