use std::fmt::Display;

use serde::{Serialize, Serializer};

use crate::error::{RoutingError, RoutingResult};
use crate::model::graph::{Graph, NodeId};

use super::{RouteAlgorithm, ShortestPathEngine};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSummary {
    pub path: Vec<NodeId>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathOutcome {
    Found(PathSummary),
    NoPath,
    Failed {
        #[serde(serialize_with = "serialize_display")]
        error: RoutingError,
    },
}

impl PathOutcome {
    pub fn cost(&self) -> Option<f64> {
        match self {
            Self::Found(summary) => Some(summary.cost),
            _ => None,
        }
    }
}

impl From<RoutingResult<Option<PathSummary>>> for PathOutcome {
    fn from(value: RoutingResult<Option<PathSummary>>) -> Self {
        match value {
            Ok(Some(summary)) => Self::Found(summary),
            Ok(None) => Self::NoPath,
            Err(error) => Self::Failed { error },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Dijkstra,
    BellmanFord,
    Either,
    NoPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmComparison {
    pub source: NodeId,
    pub destination: NodeId,
    pub dijkstra: PathOutcome,
    pub bellman_ford: PathOutcome,
    pub recommendation: Recommendation,
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Shortest path between two nodes. `Ok(None)` when the destination exists
/// but is unreachable.
pub fn shortest_path<E>(
    graph: &Graph,
    engine: &E,
    source: &str,
    destination: &str,
) -> RoutingResult<Option<PathSummary>>
where
    E: ShortestPathEngine + ?Sized,
{
    if !graph.contains_node(destination) {
        return Err(RoutingError::NodeNotFound(NodeId::from(destination)));
    }
    let vector = engine.shortest_paths(graph, source)?;
    let Some(cost) = vector.distance(destination).filter(|cost| cost.is_finite()) else {
        return Ok(None);
    };
    Ok(vector
        .path_to(destination)
        .map(|path| PathSummary { path, cost }))
}

/// Lower cost wins; a tie means either works; an algorithm that produced a
/// path beats one that failed or found nothing.
pub fn recommend(dijkstra: &PathOutcome, bellman_ford: &PathOutcome) -> Recommendation {
    match (dijkstra.cost(), bellman_ford.cost()) {
        (Some(d), Some(bf)) if d < bf => Recommendation::Dijkstra,
        (Some(d), Some(bf)) if bf < d => Recommendation::BellmanFord,
        (Some(_), Some(_)) => Recommendation::Either,
        (Some(_), None) => Recommendation::Dijkstra,
        (None, Some(_)) => Recommendation::BellmanFord,
        (None, None) => Recommendation::NoPath,
    }
}

/// Runs both algorithms for one pair. Endpoint validation errors are
/// returned directly; algorithm failures are reported per outcome.
pub fn compare_algorithms(
    graph: &Graph,
    source: &str,
    destination: &str,
) -> RoutingResult<AlgorithmComparison> {
    for node in [source, destination] {
        if !graph.contains_node(node) {
            return Err(RoutingError::NodeNotFound(NodeId::from(node)));
        }
    }
    if source == destination {
        return Err(RoutingError::SameEndpoints(NodeId::from(source)));
    }

    let dijkstra = PathOutcome::from(shortest_path(
        graph,
        &RouteAlgorithm::Dijkstra,
        source,
        destination,
    ));
    let bellman_ford = PathOutcome::from(shortest_path(
        graph,
        &RouteAlgorithm::BellmanFord,
        source,
        destination,
    ));
    let recommendation = recommend(&dijkstra, &bellman_ford);

    Ok(AlgorithmComparison {
        source: NodeId::from(source),
        destination: NodeId::from(destination),
        dijkstra,
        bellman_ford,
        recommendation,
    })
}
