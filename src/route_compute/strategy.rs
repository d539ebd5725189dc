use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoutingResult;
use crate::model::graph::Graph;

use super::{compute_bellman_ford, compute_dijkstra, DistanceVector, ShortestPathEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    #[default]
    Dijkstra,
    BellmanFord,
}

impl RouteAlgorithm {
    pub const ALL: [RouteAlgorithm; 2] = [RouteAlgorithm::Dijkstra, RouteAlgorithm::BellmanFord];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::BellmanFord => "bellman_ford",
        }
    }
}

impl ShortestPathEngine for RouteAlgorithm {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn shortest_paths(&self, graph: &Graph, source: &str) -> RoutingResult<DistanceVector> {
        match self {
            Self::Dijkstra => compute_dijkstra(graph, source),
            Self::BellmanFord => compute_bellman_ford(graph, source),
        }
    }
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dijkstra" | "spf" => Ok(Self::Dijkstra),
            "bellman_ford" | "bellman-ford" | "bellmanford" | "bf" => Ok(Self::BellmanFord),
            other => Err(format!("unsupported route algorithm: {other}")),
        }
    }
}
