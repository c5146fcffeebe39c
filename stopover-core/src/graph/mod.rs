//! Road-network multigraph consumed by the planner.
//!
//! The graph is produced by a [`GraphProvider`](crate::GraphProvider) and is
//! read-only once built. Nodes carry a [`GeoPoint`]; directed edges carry a
//! `length` in metres and a `time` in seconds. Several parallel edges may join
//! the same pair of nodes, each identified by its [`EdgeKey`].

mod builder;
mod error;

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::GeoPoint;

pub use builder::NetworkGraphBuilder;
pub use error::GraphError;

/// Identifier of a graph vertex.
///
/// Identifiers are opaque to the planner; they are typically OpenStreetMap
/// node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Key of a directed edge: endpoints plus the index among parallel edges.
///
/// The parallel index is assigned on insertion and counts the edges that
/// already joined `source` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    /// Tail of the edge.
    pub source: NodeId,
    /// Head of the edge.
    pub target: NodeId,
    /// Position among edges sharing the same endpoints.
    pub parallel_index: u32,
}

/// Weights carried by every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttributes {
    /// Segment length in metres.
    pub length: f64,
    /// Free-flow travel time in seconds.
    pub time: f64,
}

impl EdgeAttributes {
    /// Construct edge attributes from a length and a travel time.
    pub const fn new(length: f64, time: f64) -> Self {
        Self { length, time }
    }
}

/// Borrowed view of a single edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView {
    /// Key of the edge.
    pub key: EdgeKey,
    /// Base attributes, unaffected by traffic overlays.
    pub attributes: EdgeAttributes,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeData {
    pub(crate) id: NodeId,
    pub(crate) position: GeoPoint,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeData {
    pub(crate) parallel_index: u32,
    pub(crate) attributes: EdgeAttributes,
}

pub(crate) type GraphStructure = DiGraph<NodeData, EdgeData>;

/// Weighted directed multigraph of road segments.
///
/// # Examples
/// ```
/// use stopover_core::{EdgeAttributes, GeoPoint, NetworkGraph, NodeId};
///
/// # fn main() -> Result<(), stopover_core::GraphError> {
/// let mut builder = NetworkGraph::builder();
/// builder
///     .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))?
///     .add_node(NodeId(2), GeoPoint::new(0.0, 0.001))?;
/// builder.add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(120.0, 15.0))?;
/// let graph = builder.build();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edges_between(NodeId(1), NodeId(2)).count(), 1);
/// assert_eq!(graph.edges_between(NodeId(2), NodeId(1)).count(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NetworkGraph {
    pub(crate) graph: GraphStructure,
    pub(crate) index: HashMap<NodeId, NodeIndex>,
    pub(crate) heuristic_scale: f64,
}

impl fmt::Debug for NetworkGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkGraph")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .finish_non_exhaustive()
    }
}

impl NetworkGraph {
    /// Start building a graph.
    pub fn builder() -> NetworkGraphBuilder {
        NetworkGraphBuilder::new()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges, parallel edges included.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Factor applied to great-circle estimates during heuristic search.
    ///
    /// It is the smallest `length / great-circle distance` ratio over all
    /// edges, capped at 1, so scaled estimates never exceed the true
    /// remaining length.
    pub fn heuristic_scale(&self) -> f64 {
        self.heuristic_scale
    }

    /// Whether `id` is a node of this graph.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Position of node `id`, if present.
    pub fn position(&self, id: NodeId) -> Option<GeoPoint> {
        self.node_index(id)
            .and_then(|ix| self.graph.node_weight(ix))
            .map(|node| node.position)
    }

    /// Iterate over all nodes with their positions.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, GeoPoint)> + '_ {
        self.graph
            .node_weights()
            .map(|node| (node.id, node.position))
    }

    /// Iterate over all directed edges.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView> + '_ {
        self.graph
            .edge_references()
            .filter_map(|edge| self.edge_view(edge.source(), edge.target(), edge.weight()))
    }

    /// Iterate over the parallel edges from `source` to `target`.
    ///
    /// Iteration order is unspecified; use [`EdgeKey::parallel_index`] to
    /// tell parallel edges apart.
    pub fn edges_between(
        &self,
        source: NodeId,
        target: NodeId,
    ) -> impl Iterator<Item = EdgeView> + '_ {
        self.node_index(source)
            .zip(self.node_index(target))
            .into_iter()
            .flat_map(move |(a, b)| self.graph.edges_connecting(a, b))
            .filter_map(|edge| self.edge_view(edge.source(), edge.target(), edge.weight()))
    }

    /// Attributes of the edge identified by `key`.
    pub fn edge(&self, key: EdgeKey) -> Option<EdgeAttributes> {
        self.edges_between(key.source, key.target)
            .find(|edge| edge.key.parallel_index == key.parallel_index)
            .map(|edge| edge.attributes)
    }

    pub(crate) fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    pub(crate) fn node_data(&self, ix: NodeIndex) -> Option<NodeData> {
        self.graph.node_weight(ix).copied()
    }

    pub(crate) fn structure(&self) -> &GraphStructure {
        &self.graph
    }

    fn edge_view(&self, source: NodeIndex, target: NodeIndex, data: &EdgeData) -> Option<EdgeView> {
        let source = self.graph.node_weight(source)?.id;
        let target = self.graph.node_weight(target)?.id;
        Some(EdgeView {
            key: EdgeKey {
                source,
                target,
                parallel_index: data.parallel_index,
            },
            attributes: data.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn parallel_graph() -> NetworkGraph {
        let mut builder = NetworkGraph::builder();
        builder
            .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))
            .and_then(|b| b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001)))
            .expect("nodes");
        builder
            .add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(100.0, 10.0))
            .expect("first edge");
        builder
            .add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(80.0, 30.0))
            .expect("parallel edge");
        builder.build()
    }

    #[rstest]
    fn parallel_edges_receive_increasing_indices(parallel_graph: NetworkGraph) {
        let mut indices: Vec<_> = parallel_graph
            .edges_between(NodeId(1), NodeId(2))
            .map(|edge| edge.key.parallel_index)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1]);
    }

    #[rstest]
    fn edge_lookup_uses_parallel_index(parallel_graph: NetworkGraph) {
        let key = EdgeKey {
            source: NodeId(1),
            target: NodeId(2),
            parallel_index: 1,
        };
        assert_eq!(
            parallel_graph.edge(key),
            Some(EdgeAttributes::new(80.0, 30.0))
        );
    }

    #[rstest]
    fn unknown_nodes_have_no_edges(parallel_graph: NetworkGraph) {
        assert_eq!(parallel_graph.edges_between(NodeId(9), NodeId(2)).count(), 0);
        assert!(parallel_graph.position(NodeId(9)).is_none());
    }

    #[rstest]
    fn reports_sizes(parallel_graph: NetworkGraph) {
        assert_eq!(parallel_graph.node_count(), 2);
        assert_eq!(parallel_graph.edge_count(), 2);
        assert_eq!(parallel_graph.edges().count(), 2);
        assert!(!parallel_graph.is_empty());
    }
}
