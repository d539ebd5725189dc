use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RoutingResult;
use crate::model::graph::{Graph, NodeId};

/// Topology mutation requested by a caller. Applied once, then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyEvent {
    RemoveEdge {
        source: NodeId,
        target: NodeId,
    },
    UpdateWeight {
        source: NodeId,
        target: NodeId,
        weight: f64,
    },
}

impl TopologyEvent {
    pub fn remove_edge(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::RemoveEdge {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn update_weight(source: impl Into<NodeId>, target: impl Into<NodeId>, weight: f64) -> Self {
        Self::UpdateWeight {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }

    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        match self {
            Self::RemoveEdge { source, target } | Self::UpdateWeight { source, target, .. } => {
                (source, target)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedEvent {
    pub event: TopologyEvent,
    /// Weight of the edge before the event; `None` when a removal hit no edge.
    pub previous_weight: Option<f64>,
    pub changed: bool,
}

/// Mutates the graph for one event. Routing tables are not refreshed here;
/// callers rebuild them explicitly.
pub fn apply_event(graph: &mut Graph, event: &TopologyEvent) -> RoutingResult<AppliedEvent> {
    let (previous_weight, changed) = match event {
        TopologyEvent::RemoveEdge { source, target } => {
            let removed = graph.remove_edge(source.as_str(), target.as_str());
            (removed, removed.is_some())
        }
        TopologyEvent::UpdateWeight {
            source,
            target,
            weight,
        } => {
            let previous = graph.update_weight(source.as_str(), target.as_str(), *weight)?;
            (Some(previous), previous != *weight)
        }
    };

    let (source, target) = event.endpoints();
    debug!(%source, %target, ?previous_weight, changed, "applied topology event");

    Ok(AppliedEvent {
        event: event.clone(),
        previous_weight,
        changed,
    })
}

/// Applies events in order and stops at the first failure. Events applied
/// before the failure stay applied.
pub fn apply_events<'a, I>(graph: &mut Graph, events: I) -> RoutingResult<Vec<AppliedEvent>>
where
    I: IntoIterator<Item = &'a TopologyEvent>,
{
    events
        .into_iter()
        .map(|event| apply_event(graph, event))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoutingError;

    fn triangle() -> Graph {
        Graph::from_edges([("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 4.0)])
    }

    #[test]
    fn remove_edge_is_idempotent() {
        let mut graph = triangle();
        let event = TopologyEvent::remove_edge("A", "B");

        let first = apply_event(&mut graph, &event).expect("remove succeeds");
        assert!(first.changed);
        assert_eq!(first.previous_weight, Some(1.0));

        let second = apply_event(&mut graph, &event).expect("second remove succeeds");
        assert!(!second.changed);
        assert_eq!(second.previous_weight, None);
        assert!(!graph.contains_edge("A", "B"));
    }

    #[test]
    fn update_weight_propagates_edge_not_found() {
        let mut graph = triangle();
        let before = graph.clone();
        let err = apply_event(&mut graph, &TopologyEvent::update_weight("C", "B", 1.0)).unwrap_err();
        assert!(matches!(err, RoutingError::EdgeNotFound { .. }));
        assert_eq!(graph, before);
    }

    #[test]
    fn apply_events_stops_at_first_failure() {
        let mut graph = triangle();
        let events = vec![
            TopologyEvent::update_weight("B", "C", 10.0),
            TopologyEvent::update_weight("X", "Y", 1.0),
            TopologyEvent::remove_edge("A", "C"),
        ];
        assert!(apply_events(&mut graph, &events).is_err());
        assert_eq!(graph.weight("B", "C"), Some(10.0));
        assert!(graph.contains_edge("A", "C"));
    }

    #[test]
    fn events_deserialize_from_tagged_yaml() {
        let raw = "- kind: remove_edge\n  source: A\n  target: B\n- kind: update_weight\n  source: B\n  target: C\n  weight: 10\n";
        let events: Vec<TopologyEvent> = serde_yaml::from_str(raw).expect("valid events");
        assert_eq!(
            events,
            vec![
                TopologyEvent::remove_edge("A", "B"),
                TopologyEvent::update_weight("B", "C", 10.0),
            ]
        );
    }
}
