//! Traffic-adjusted travel times layered over a [`NetworkGraph`].

use std::collections::HashMap;

use log::debug;

use super::TrafficSnapshot;
use crate::{EdgeAttributes, EdgeKey, NetworkGraph, NodeId};

/// Counts reported by [`TrafficOverlay::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    /// Directed edges whose time now comes from the snapshot.
    pub adjusted_edges: usize,
    /// Snapshot keys naming a pair with no edge in the graph.
    pub unmatched_keys: usize,
}

/// Replacement travel times for graph edges.
///
/// The overlay never mutates the graph it was applied to. A snapshot entry
/// for `(u, v)` replaces the time of every parallel edge from `u` to `v`;
/// lengths are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficOverlay {
    times: HashMap<(NodeId, NodeId), f64>,
}

impl TrafficOverlay {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the snapshot entries that match edges of `graph`.
    ///
    /// Entries for pairs without an edge are ignored and counted in
    /// [`OverlayStats::unmatched_keys`]. Applying the same snapshot again
    /// leaves the overlay unchanged.
    pub fn apply(&mut self, graph: &NetworkGraph, snapshot: &TrafficSnapshot) -> OverlayStats {
        let mut stats = OverlayStats::default();
        for ((source, target), seconds) in snapshot.iter() {
            let parallel = graph.edges_between(source, target).count();
            if parallel == 0 {
                stats.unmatched_keys += 1;
                continue;
            }
            self.times.insert((source, target), seconds);
            stats.adjusted_edges += parallel;
        }
        debug!(
            "traffic overlay adjusted {} edges, {} snapshot keys unmatched",
            stats.adjusted_edges, stats.unmatched_keys
        );
        stats
    }

    /// Overridden travel time for the pair, if any.
    pub fn time_for(&self, source: NodeId, target: NodeId) -> Option<f64> {
        self.times.get(&(source, target)).copied()
    }

    /// Number of overridden node pairs.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the overlay overrides nothing.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// A graph paired with an optional traffic overlay.
///
/// This is the weight view searched by [`crate::PathFinder`]: lengths always
/// come from the graph, times from the overlay when it has an entry.
///
/// # Examples
/// ```
/// use stopover_core::{
///     EdgeAttributes, EdgeKey, GeoPoint, NetworkGraph, NodeId, TrafficOverlay,
///     TrafficSnapshot, WeightedGraph,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = NetworkGraph::builder();
/// builder
///     .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))?
///     .add_node(NodeId(2), GeoPoint::new(0.0, 0.001))?;
/// let key = builder.add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(100.0, 10.0))?;
/// let graph = builder.build();
///
/// let snapshot = TrafficSnapshot::from_json_str(r#"{ "1,2": 25 }"#)?;
/// let mut overlay = TrafficOverlay::new();
/// overlay.apply(&graph, &snapshot);
///
/// let view = WeightedGraph::new(&graph, &overlay);
/// assert_eq!(view.attributes(key), Some(EdgeAttributes::new(100.0, 25.0)));
/// assert_eq!(WeightedGraph::unadjusted(&graph).edge_time(key), Some(10.0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WeightedGraph<'a> {
    graph: &'a NetworkGraph,
    overlay: Option<&'a TrafficOverlay>,
}

impl<'a> WeightedGraph<'a> {
    /// View `graph` through `overlay`.
    pub fn new(graph: &'a NetworkGraph, overlay: &'a TrafficOverlay) -> Self {
        Self {
            graph,
            overlay: Some(overlay),
        }
    }

    /// View `graph` with free-flow times only.
    pub fn unadjusted(graph: &'a NetworkGraph) -> Self {
        Self {
            graph,
            overlay: None,
        }
    }

    /// The underlying graph.
    pub fn graph(&self) -> &'a NetworkGraph {
        self.graph
    }

    /// The overlay in effect, if any.
    pub fn overlay(&self) -> Option<&'a TrafficOverlay> {
        self.overlay
    }

    /// Effective travel time of the edge identified by `key`.
    pub fn edge_time(&self, key: EdgeKey) -> Option<f64> {
        self.attributes(key).map(|attributes| attributes.time)
    }

    /// Effective attributes of the edge identified by `key`.
    pub fn attributes(&self, key: EdgeKey) -> Option<EdgeAttributes> {
        self.graph
            .edge(key)
            .map(|base| self.adjust(key.source, key.target, base))
    }

    pub(crate) fn adjust(
        &self,
        source: NodeId,
        target: NodeId,
        base: EdgeAttributes,
    ) -> EdgeAttributes {
        match self.overlay.and_then(|overlay| overlay.time_for(source, target)) {
            Some(time) => EdgeAttributes::new(base.length, time),
            None => base,
        }
    }
}
