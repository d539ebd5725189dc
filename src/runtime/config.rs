use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::model::events::TopologyEvent;
use crate::model::graph::{Graph, NodeId};
use crate::route_compute::RouteAlgorithm;
use crate::runtime::simulation::EventPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConfig {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub bidirectional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub seed: u64,
    pub policy: EventPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            policy: EventPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub algorithm: RouteAlgorithm,
    pub drop_negative_weights: bool,
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeConfig>,
    pub simulation: SimulationConfig,
    pub events: Vec<TopologyEvent>,
}

impl SimulatorConfig {
    /// Builds the topology in declaration order, so a later edge overwrites
    /// an earlier one between the same pair.
    pub fn build_graph(&self) -> Graph {
        let mut graph = Graph::new();
        for node in &self.nodes {
            graph.add_node(node);
        }
        for edge in &self.edges {
            if edge.bidirectional {
                graph.add_link(&edge.source, &edge.target, edge.weight);
            } else {
                graph.add_edge(&edge.source, &edge.target, edge.weight);
            }
        }

        if self.drop_negative_weights {
            let dropped = graph.retain_edges(|_, _, weight| weight >= 0.0);
            if dropped > 0 {
                info!(dropped, "dropped negative-weight edges from topology");
            }
        }
        graph
    }
}

// Router names may be written as bare numbers in YAML.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNode {
    Name(String),
    Number(i64),
}

impl From<RawNode> for NodeId {
    fn from(raw: RawNode) -> Self {
        match raw {
            RawNode::Name(name) => NodeId::new(name.trim()),
            RawNode::Number(number) => NodeId::new(number.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    source: RawNode,
    target: RawNode,
    weight: f64,
    bidirectional: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct RawTopology {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize, Default)]
struct RawSimulation {
    seed: Option<u64>,
    remove_probability: Option<f64>,
    min_weight: Option<u32>,
    max_weight: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct RawSimulatorConfig {
    algorithm: Option<String>,
    drop_negative_weights: Option<bool>,
    topology: Option<RawTopology>,
    simulation: Option<RawSimulation>,
    #[serde(default)]
    events: Vec<TopologyEvent>,
}

pub fn load_simulator_config(path: &Path) -> Result<SimulatorConfig> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_simulator_config(&raw_text)
        .with_context(|| format!("invalid config file {}", path.display()))
}

pub fn parse_simulator_config(raw_text: &str) -> Result<SimulatorConfig> {
    let raw_cfg: RawSimulatorConfig =
        serde_yaml::from_str(raw_text).context("failed to parse simulator config yaml")?;

    let algorithm = raw_cfg
        .algorithm
        .as_deref()
        .map(str::parse::<RouteAlgorithm>)
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let topology = raw_cfg.topology.unwrap_or_default();
    let simulation_raw = raw_cfg.simulation.unwrap_or_default();
    let defaults = EventPolicy::default();

    let policy = EventPolicy {
        remove_probability: simulation_raw
            .remove_probability
            .unwrap_or(defaults.remove_probability),
        min_weight: simulation_raw.min_weight.unwrap_or(defaults.min_weight),
        max_weight: simulation_raw.max_weight.unwrap_or(defaults.max_weight),
    };
    if !(0.0..=1.0).contains(&policy.remove_probability) {
        anyhow::bail!(
            "simulation.remove_probability must be within [0, 1], got {}",
            policy.remove_probability
        );
    }
    if policy.min_weight > policy.max_weight {
        anyhow::bail!(
            "simulation.min_weight ({}) exceeds simulation.max_weight ({})",
            policy.min_weight,
            policy.max_weight
        );
    }

    let mut edges = Vec::with_capacity(topology.edges.len());
    for (idx, raw) in topology.edges.into_iter().enumerate() {
        if raw.weight.is_nan() {
            anyhow::bail!("topology.edges[{idx}] has a NaN weight");
        }
        edges.push(EdgeConfig {
            source: raw.source.into(),
            target: raw.target.into(),
            weight: raw.weight,
            bidirectional: raw.bidirectional.unwrap_or(false),
        });
    }

    Ok(SimulatorConfig {
        algorithm,
        drop_negative_weights: raw_cfg.drop_negative_weights.unwrap_or(true),
        nodes: topology.nodes.into_iter().map(NodeId::from).collect(),
        edges,
        simulation: SimulationConfig {
            seed: simulation_raw.seed.unwrap_or(42),
            policy,
        },
        events: raw_cfg.events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
algorithm: bellman_ford
drop_negative_weights: false
topology:
  nodes: [Z]
  edges:
    - { source: A, target: B, weight: 1 }
    - { source: B, target: C, weight: 2 }
    - { source: A, target: C, weight: 4 }
    - { source: 10, target: A, weight: -1.5, bidirectional: true }
simulation:
  seed: 7
  remove_probability: 0.25
events:
  - kind: update_weight
    source: B
    target: C
    weight: 10
"#;

    #[test]
    fn parses_full_config() {
        let cfg = parse_simulator_config(SAMPLE).expect("valid config");
        assert_eq!(cfg.algorithm, RouteAlgorithm::BellmanFord);
        assert!(!cfg.drop_negative_weights);
        assert_eq!(cfg.nodes, vec![NodeId::from("Z")]);
        assert_eq!(cfg.edges.len(), 4);
        assert_eq!(cfg.edges[3].source, "10");
        assert!(cfg.edges[3].bidirectional);
        assert_eq!(cfg.simulation.seed, 7);
        assert_eq!(cfg.simulation.policy.remove_probability, 0.25);
        assert_eq!(cfg.simulation.policy.max_weight, 20);
        assert_eq!(
            cfg.events,
            vec![TopologyEvent::update_weight("B", "C", 10.0)]
        );

        let graph = cfg.build_graph();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.weight("A", "10"), Some(-1.5));
        assert_eq!(graph.weight("10", "A"), Some(-1.5));
    }

    #[test]
    fn defaults_apply_and_negative_weights_are_dropped() {
        let cfg = parse_simulator_config(
            "topology:\n  edges:\n    - { source: A, target: B, weight: -1 }\n    - { source: B, target: C, weight: 3 }\n",
        )
        .expect("valid config");
        assert_eq!(cfg.algorithm, RouteAlgorithm::Dijkstra);
        assert!(cfg.drop_negative_weights);
        assert_eq!(cfg.simulation, SimulationConfig::default());
        assert!(cfg.events.is_empty());

        let graph = cfg.build_graph();
        assert!(!graph.contains_edge("A", "B"));
        assert!(graph.contains_node("A"));
        assert_eq!(graph.weight("B", "C"), Some(3.0));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_simulator_config("algorithm: ospf\n").is_err());
        assert!(parse_simulator_config("simulation:\n  remove_probability: 1.5\n").is_err());
        assert!(parse_simulator_config("simulation:\n  min_weight: 9\n  max_weight: 3\n").is_err());
        assert!(parse_simulator_config("topology:\n  edges:\n    - { source: A }\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_simulator_config(Path::new("/nonexistent/pathsim.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pathsim.yaml"));
    }
}
