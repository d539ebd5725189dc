pub mod events;
pub mod graph;
pub mod routing;

pub use events::{apply_event, apply_events, AppliedEvent, TopologyEvent};
pub use graph::{Adjacency, Graph, NodeId};
pub use routing::{diff_tables, RouteChange, RouteEntry, RoutingTable, RoutingTableSet};
