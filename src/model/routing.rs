use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

use crate::error::RoutingError;
use crate::model::graph::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry {
    pub destination: NodeId,
    pub next_hop: NodeId,
    pub cost: f64,
    pub path: Vec<NodeId>,
}

/// Next-hop table of a single source. Only reachable destinations have an
/// entry; the source never routes to itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingTable {
    source: NodeId,
    routes: BTreeMap<NodeId, RouteEntry>,
}

impl RoutingTable {
    pub fn new(source: NodeId) -> Self {
        Self {
            source,
            routes: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, route: RouteEntry) {
        self.routes.insert(route.destination.clone(), route);
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn get(&self, destination: &str) -> Option<&RouteEntry> {
        self.routes.get(destination)
    }

    pub fn next_hop(&self, destination: &str) -> Option<&NodeId> {
        self.get(destination).map(|route| &route.next_hop)
    }

    pub fn cost(&self, destination: &str) -> Option<f64> {
        self.get(destination).map(|route| route.cost)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.values()
    }
}

/// Output of an all-sources build: successful tables plus the sources whose
/// computation failed. A failure never removes another source's table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutingTableSet {
    tables: BTreeMap<NodeId, RoutingTable>,
    #[serde(serialize_with = "serialize_failures")]
    failures: BTreeMap<NodeId, RoutingError>,
}

impl RoutingTableSet {
    pub(crate) fn insert_table(&mut self, table: RoutingTable) {
        self.failures.remove(table.source());
        self.tables.insert(table.source().clone(), table);
    }

    pub(crate) fn insert_failure(&mut self, source: NodeId, error: RoutingError) {
        self.tables.remove(&source);
        self.failures.insert(source, error);
    }

    pub fn table(&self, source: &str) -> Option<&RoutingTable> {
        self.tables.get(source)
    }

    pub fn failure(&self, source: &str) -> Option<&RoutingError> {
        self.failures.get(source)
    }

    pub fn tables(&self) -> impl Iterator<Item = &RoutingTable> {
        self.tables.values()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&NodeId, &RoutingError)> {
        self.failures.iter()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// All-or-nothing view: the failure of the lowest source id, if any.
    pub fn into_result(self) -> Result<BTreeMap<NodeId, RoutingTable>, RoutingError> {
        match self.failures.into_values().next() {
            Some(error) => Err(error),
            None => Ok(self.tables),
        }
    }
}

fn serialize_failures<S>(
    failures: &BTreeMap<NodeId, RoutingError>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(
        failures
            .iter()
            .map(|(source, error)| (source, error.to_string())),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum RouteChange {
    Added {
        source: NodeId,
        route: RouteEntry,
    },
    Removed {
        source: NodeId,
        route: RouteEntry,
    },
    Changed {
        source: NodeId,
        before: RouteEntry,
        after: RouteEntry,
    },
}

impl RouteChange {
    pub fn source(&self) -> &NodeId {
        match self {
            Self::Added { source, .. } | Self::Removed { source, .. } => source,
            Self::Changed { source, .. } => source,
        }
    }

    pub fn destination(&self) -> &NodeId {
        match self {
            Self::Added { route, .. } | Self::Removed { route, .. } => &route.destination,
            Self::Changed { after, .. } => &after.destination,
        }
    }
}

/// Route-level differences between two builds, ordered by source then
/// destination. A route counts as changed when its next hop or cost moved.
pub fn diff_tables(before: &RoutingTableSet, after: &RoutingTableSet) -> Vec<RouteChange> {
    let sources: BTreeSet<&NodeId> = before.tables.keys().chain(after.tables.keys()).collect();
    let mut changes = Vec::new();

    for source in sources {
        let old = before.tables.get(source);
        let new = after.tables.get(source);
        let destinations: BTreeSet<&NodeId> = old
            .into_iter()
            .chain(new)
            .flat_map(|table| table.routes.keys())
            .collect();

        for destination in destinations {
            let old_route = old.and_then(|table| table.routes.get(destination));
            let new_route = new.and_then(|table| table.routes.get(destination));
            match (old_route, new_route) {
                (None, Some(route)) => changes.push(RouteChange::Added {
                    source: source.clone(),
                    route: route.clone(),
                }),
                (Some(route), None) => changes.push(RouteChange::Removed {
                    source: source.clone(),
                    route: route.clone(),
                }),
                (Some(a), Some(b)) if a.next_hop != b.next_hop || a.cost != b.cost => {
                    changes.push(RouteChange::Changed {
                        source: source.clone(),
                        before: a.clone(),
                        after: b.clone(),
                    });
                }
                _ => {}
            }
        }
    }

    changes
}
