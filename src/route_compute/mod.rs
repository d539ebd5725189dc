mod bellman_ford;
mod compare;
mod dijkstra;
mod frontier;
mod strategy;
mod tables;
mod traits;
mod types;

pub use bellman_ford::{compute_bellman_ford, BellmanFord};
pub use compare::{
    compare_algorithms, recommend, shortest_path, AlgorithmComparison, PathOutcome, PathSummary,
    Recommendation,
};
pub use dijkstra::{compute_dijkstra, Dijkstra};
pub use frontier::DistanceFrontier;
pub use strategy::RouteAlgorithm;
pub use tables::{build_all_tables, build_table, path_cost, routing_table_from_vector};
pub use traits::ShortestPathEngine;
pub use types::{DistanceEntry, DistanceVector};
