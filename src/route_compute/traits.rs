use crate::error::RoutingResult;
use crate::model::graph::Graph;

use super::DistanceVector;

/// Single-source shortest-path capability shared by every algorithm, so the
/// table builder stays algorithm-agnostic.
pub trait ShortestPathEngine {
    fn name(&self) -> &'static str;

    fn shortest_paths(&self, graph: &Graph, source: &str) -> RoutingResult<DistanceVector>;
}
