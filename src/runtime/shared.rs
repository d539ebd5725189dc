use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::model::events::{apply_events, AppliedEvent, TopologyEvent};
use crate::model::graph::Graph;
use crate::model::routing::{diff_tables, RouteChange, RoutingTableSet};
use crate::route_compute::{build_all_tables, RouteAlgorithm};

/// Result of one mutate-then-rebuild cycle: tables from before and after the
/// events plus the route-level differences between them.
#[derive(Debug, Clone, Serialize)]
pub struct TopologyUpdate {
    pub algorithm: RouteAlgorithm,
    pub applied: Vec<AppliedEvent>,
    pub before: RoutingTableSet,
    pub after: RoutingTableSet,
    pub changes: Vec<RouteChange>,
}

/// Graph handle shared between callers. Every operation holds the lock for
/// its whole duration, so algorithms never observe a half-applied event.
#[derive(Debug, Clone, Default)]
pub struct SharedTopology {
    graph: Arc<Mutex<Graph>>,
}

impl SharedTopology {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph: Arc::new(Mutex::new(graph)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Graph>> {
        self.graph
            .lock()
            .map_err(|_| anyhow::anyhow!("topology lock poisoned"))
    }

    pub fn snapshot(&self) -> Result<Graph> {
        Ok(self.lock()?.clone())
    }

    pub fn build_tables(&self, algorithm: RouteAlgorithm) -> Result<RoutingTableSet> {
        let graph = self.lock()?;
        Ok(build_all_tables(&graph, &algorithm))
    }

    pub fn apply_and_rebuild(
        &self,
        event: &TopologyEvent,
        algorithm: RouteAlgorithm,
    ) -> Result<TopologyUpdate> {
        self.apply_all_and_rebuild(std::slice::from_ref(event), algorithm)
    }

    /// Applies the events as one batch. If any event fails the shared graph
    /// keeps its previous state and the error is returned.
    pub fn apply_all_and_rebuild(
        &self,
        events: &[TopologyEvent],
        algorithm: RouteAlgorithm,
    ) -> Result<TopologyUpdate> {
        let mut graph = self.lock()?;
        let before = build_all_tables(&graph, &algorithm);

        let mut next = graph.clone();
        let applied = apply_events(&mut next, events)?;
        let after = build_all_tables(&next, &algorithm);
        *graph = next;

        let changes = diff_tables(&before, &after);
        info!(
            events = applied.len(),
            changes = changes.len(),
            %algorithm,
            "topology updated"
        );

        Ok(TopologyUpdate {
            algorithm,
            applied,
            before,
            after,
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::error::RoutingError;
    use crate::model::graph::NodeId;

    fn triangle() -> Graph {
        Graph::from_edges([("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 4.0)])
    }

    #[test]
    fn update_reports_before_after_and_changes() {
        let shared = SharedTopology::new(triangle());
        let update = shared
            .apply_and_rebuild(
                &TopologyEvent::update_weight("B", "C", 10.0),
                RouteAlgorithm::Dijkstra,
            )
            .expect("edge exists");

        assert_eq!(update.before.table("A").and_then(|t| t.cost("C")), Some(3.0));
        assert_eq!(update.after.table("A").and_then(|t| t.cost("C")), Some(4.0));
        assert!(update.changes.iter().any(|change| matches!(
            change,
            RouteChange::Changed { source, after, .. }
                if *source == "A" && after.next_hop == "C"
        )));
        assert_eq!(
            shared.snapshot().expect("lock").weight("B", "C"),
            Some(10.0)
        );
    }

    #[test]
    fn failed_batch_leaves_graph_untouched() {
        let shared = SharedTopology::new(triangle());
        let err = shared
            .apply_all_and_rebuild(
                &[
                    TopologyEvent::remove_edge("A", "B"),
                    TopologyEvent::update_weight("C", "A", 1.0),
                ],
                RouteAlgorithm::BellmanFord,
            )
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<RoutingError>(),
            Some(&RoutingError::EdgeNotFound {
                from: NodeId::from("C"),
                to: NodeId::from("A"),
            })
        );
        assert_eq!(shared.snapshot().expect("lock"), triangle());
    }

    #[test]
    fn concurrent_updates_are_serialized() {
        let shared = SharedTopology::new(triangle());
        let handles: Vec<_> = (0..4)
            .map(|idx| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared
                        .apply_and_rebuild(
                            &TopologyEvent::update_weight("A", "C", f64::from(idx + 1)),
                            RouteAlgorithm::Dijkstra,
                        )
                        .expect("edge exists")
                })
            })
            .collect();

        for handle in handles {
            let update = handle.join().expect("worker finished");
            assert_eq!(update.applied.len(), 1);
            assert!(update.after.is_complete());
        }
        let weight = shared.snapshot().expect("lock").weight("A", "C");
        assert!(matches!(weight, Some(w) if (1.0..=4.0).contains(&w)));
    }
}
