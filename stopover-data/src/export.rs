//! On-disk graph export format.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use stopover_core::{EdgeAttributes, GeoPoint, GraphError, NetworkGraph, NodeId};

/// A node as stored in a graph export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Stable node identifier.
    pub id: u64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// A directed edge as stored in a graph export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Identifier of the tail node.
    pub source: u64,
    /// Identifier of the head node.
    pub target: u64,
    /// Length in metres.
    pub length: f64,
    /// Free-flow travel time in seconds.
    pub time: f64,
}

/// A road network export: `{ "nodes": [...], "edges": [...] }`.
///
/// Unknown fields are ignored so exports may carry extra attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Every node in the export.
    pub nodes: Vec<NodeRecord>,
    /// Every directed edge in the export.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// Counts of export records left out by [`GraphExport::clip`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ClipStats {
    pub(crate) nodes_dropped: usize,
    pub(crate) edges_dropped: usize,
}

impl GraphExport {
    /// Build the subgraph of nodes within `radius_m` metres of `center`.
    ///
    /// Edges are kept when both endpoints are kept. Records that would be
    /// invalid in any graph, such as malformed positions or edges naming a
    /// node missing from the export, fail even when they lie outside the
    /// radius.
    pub(crate) fn clip(
        &self,
        center: GeoPoint,
        radius_m: f64,
    ) -> Result<(NetworkGraph, ClipStats), GraphError> {
        let mut builder = NetworkGraph::builder();
        let mut stats = ClipStats::default();
        let mut kept = HashSet::new();

        for node in &self.nodes {
            let position = GeoPoint::new(node.lat, node.lon);
            if position.is_valid() && center.haversine_m(&position) > radius_m {
                stats.nodes_dropped += 1;
                continue;
            }
            builder.add_node(NodeId(node.id), position)?;
            kept.insert(node.id);
        }

        let known: HashSet<u64> = self.nodes.iter().map(|node| node.id).collect();
        for edge in &self.edges {
            let endpoints_kept = kept.contains(&edge.source) && kept.contains(&edge.target);
            let endpoints_known = known.contains(&edge.source) && known.contains(&edge.target);
            if !endpoints_kept && endpoints_known {
                stats.edges_dropped += 1;
                continue;
            }
            // Edges to nodes absent from the export are rejected by the
            // builder.
            builder.add_edge(
                NodeId(edge.source),
                NodeId(edge.target),
                EdgeAttributes::new(edge.length, edge.time),
            )?;
        }

        Ok((builder.build(), stats))
    }
}
