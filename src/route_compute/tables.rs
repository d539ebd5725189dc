use tracing::{debug, warn};

use crate::error::RoutingResult;
use crate::model::graph::{Graph, NodeId};
use crate::model::routing::{RouteEntry, RoutingTable, RoutingTableSet};

use super::{DistanceVector, ShortestPathEngine};

/// Derives a next-hop table from one distance vector. Destinations without
/// a predecessor chain back to the source are left out.
pub fn routing_table_from_vector(vector: &DistanceVector) -> RoutingTable {
    let source = vector.source();
    let mut table = RoutingTable::new(source.clone());

    for (destination, entry) in vector.iter() {
        if destination == source || !entry.distance.is_finite() {
            continue;
        }
        let Some(path) = vector.path_to(destination.as_str()) else {
            warn!(%source, %destination, "predecessor chain does not reach source");
            continue;
        };
        let Some(next_hop) = path.get(1).cloned() else {
            continue;
        };
        table.insert(RouteEntry {
            destination: destination.clone(),
            next_hop,
            cost: entry.distance,
            path,
        });
    }

    table
}

pub fn build_table<E>(graph: &Graph, engine: &E, source: &str) -> RoutingResult<RoutingTable>
where
    E: ShortestPathEngine + ?Sized,
{
    let vector = engine.shortest_paths(graph, source)?;
    Ok(routing_table_from_vector(&vector))
}

/// Runs `engine` from every node in ascending id order. A failing source is
/// recorded in the set and the remaining sources are still computed.
pub fn build_all_tables<E>(graph: &Graph, engine: &E) -> RoutingTableSet
where
    E: ShortestPathEngine + ?Sized,
{
    let mut set = RoutingTableSet::default();
    let sources: Vec<NodeId> = graph.nodes().cloned().collect();

    for source in sources {
        match build_table(graph, engine, source.as_str()) {
            Ok(table) => {
                debug!(%source, algorithm = engine.name(), routes = table.len(), "built routing table");
                set.insert_table(table);
            }
            Err(err) => {
                warn!(%source, algorithm = engine.name(), error = %err, "routing table build failed");
                set.insert_failure(source, err);
            }
        }
    }

    set
}

/// Sum of graph weights along a route's path; `None` if a hop is missing.
pub fn path_cost(graph: &Graph, path: &[NodeId]) -> Option<f64> {
    path.windows(2)
        .map(|hop| graph.weight(hop[0].as_str(), hop[1].as_str()))
        .sum()
}
