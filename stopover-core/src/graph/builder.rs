use std::collections::HashMap;

use log::debug;
use petgraph::graph::NodeIndex;

use super::{
    EdgeAttributes, EdgeData, EdgeKey, GraphError, GraphStructure, NetworkGraph, NodeData, NodeId,
};
use crate::GeoPoint;

/// Incremental, validating constructor for [`NetworkGraph`].
///
/// Graph providers add every node first and then the edges between them.
/// Edge weights must be finite and non-negative.
///
/// Edges shorter than the great-circle distance between their endpoints are
/// accepted. The builder tracks the smallest `length / distance` ratio so the
/// heuristic search can be scaled down to stay a lower bound.
#[derive(Debug, Default)]
pub struct NetworkGraphBuilder {
    graph: GraphStructure,
    index: HashMap<NodeId, NodeIndex>,
    min_stretch: Option<f64>,
}

impl NetworkGraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `position`.
    pub fn add_node(&mut self, id: NodeId, position: GeoPoint) -> Result<&mut Self, GraphError> {
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        if !position.is_valid() {
            return Err(GraphError::InvalidPosition {
                id,
                lat: position.lat,
                lon: position.lon,
            });
        }
        let ix = self.graph.add_node(NodeData { id, position });
        self.index.insert(id, ix);
        Ok(self)
    }

    /// Add a directed edge and return its key.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        attributes: EdgeAttributes,
    ) -> Result<EdgeKey, GraphError> {
        let a = self.endpoint(source, source, target)?;
        let b = self.endpoint(target, source, target)?;
        check_weight(source, target, "length", attributes.length)?;
        check_weight(source, target, "time", attributes.time)?;
        self.record_stretch(a, b, attributes.length);

        let existing = self.graph.edges_connecting(a, b).count();
        let parallel_index = u32::try_from(existing).unwrap_or(u32::MAX);
        self.graph.add_edge(
            a,
            b,
            EdgeData {
                parallel_index,
                attributes,
            },
        );
        Ok(EdgeKey {
            source,
            target,
            parallel_index,
        })
    }

    /// Add a pair of opposing edges with identical attributes.
    pub fn add_two_way_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        attributes: EdgeAttributes,
    ) -> Result<(EdgeKey, EdgeKey), GraphError> {
        let forward = self.add_edge(a, b, attributes)?;
        let backward = self.add_edge(b, a, attributes)?;
        Ok((forward, backward))
    }

    /// Freeze the builder into a read-only graph.
    pub fn build(self) -> NetworkGraph {
        let heuristic_scale = self.min_stretch.map_or(1.0, |stretch| stretch.min(1.0));
        if heuristic_scale < 1.0 {
            debug!(
                "edges shorter than their great-circle span; heuristic scaled by {heuristic_scale}"
            );
        }
        NetworkGraph {
            graph: self.graph,
            index: self.index,
            heuristic_scale,
        }
    }

    fn record_stretch(&mut self, a: NodeIndex, b: NodeIndex, length: f64) {
        let (Some(from), Some(to)) = (self.graph.node_weight(a), self.graph.node_weight(b)) else {
            return;
        };
        let span = from.position.haversine_m(&to.position);
        if span > 0.0 {
            let stretch = length / span;
            self.min_stretch = Some(self.min_stretch.map_or(stretch, |min| min.min(stretch)));
        }
    }

    fn endpoint(
        &self,
        id: NodeId,
        source: NodeId,
        target: NodeId,
    ) -> Result<NodeIndex, GraphError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(GraphError::UnknownEndpoint {
                source_node: source,
                target,
                missing: id,
            })
    }
}

fn check_weight(
    source: NodeId,
    target: NodeId,
    attribute: &'static str,
    value: f64,
) -> Result<(), GraphError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidWeight {
            source_node: source,
            target,
            attribute,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn two_nodes() -> NetworkGraphBuilder {
        let mut builder = NetworkGraphBuilder::new();
        builder
            .add_node(NodeId(1), GeoPoint::new(0.0, 0.0))
            .and_then(|b| b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001)))
            .expect("nodes");
        builder
    }

    #[rstest]
    fn rejects_duplicate_nodes() {
        let mut builder = two_nodes();
        let err = builder
            .add_node(NodeId(1), GeoPoint::new(1.0, 1.0))
            .expect_err("duplicate node");
        assert_eq!(err, GraphError::DuplicateNode(NodeId(1)));
    }

    #[rstest]
    fn rejects_invalid_positions() {
        let mut builder = NetworkGraphBuilder::new();
        let err = builder
            .add_node(NodeId(1), GeoPoint::new(120.0, 0.0))
            .expect_err("latitude out of range");
        assert!(matches!(err, GraphError::InvalidPosition { .. }));
    }

    #[rstest]
    fn rejects_edges_to_unknown_nodes() {
        let mut builder = two_nodes();
        let err = builder
            .add_edge(NodeId(1), NodeId(7), EdgeAttributes::new(1.0, 1.0))
            .expect_err("unknown target");
        assert_eq!(
            err,
            GraphError::UnknownEndpoint {
                source_node: NodeId(1),
                target: NodeId(7),
                missing: NodeId(7),
            }
        );
    }

    #[rstest]
    #[case(EdgeAttributes::new(-1.0, 1.0), "length")]
    #[case(EdgeAttributes::new(1.0, -0.5), "time")]
    #[case(EdgeAttributes::new(f64::NAN, 1.0), "length")]
    #[case(EdgeAttributes::new(1.0, f64::INFINITY), "time")]
    fn rejects_invalid_weights(#[case] attributes: EdgeAttributes, #[case] expected: &str) {
        let mut builder = two_nodes();
        let err = builder
            .add_edge(NodeId(1), NodeId(2), attributes)
            .expect_err("invalid weight");
        match err {
            GraphError::InvalidWeight { attribute, .. } => assert_eq!(attribute, expected),
            other => panic!("expected InvalidWeight, found {other:?}"),
        }
    }

    #[rstest]
    fn edges_at_least_as_long_as_their_span_keep_full_heuristic() {
        let mut builder = two_nodes();
        builder
            .add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(500.0, 1.0))
            .expect("long edge");
        assert_eq!(builder.build().heuristic_scale(), 1.0);
    }

    #[rstest]
    fn short_edges_scale_the_heuristic_down() {
        let mut builder = two_nodes();
        let span = GeoPoint::new(0.0, 0.0).haversine_m(&GeoPoint::new(0.0, 0.001));
        builder
            .add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(span / 4.0, 1.0))
            .expect("short edge");
        builder
            .add_edge(NodeId(2), NodeId(1), EdgeAttributes::new(span, 1.0))
            .expect("full edge");
        let scale = builder.build().heuristic_scale();
        assert!((scale - 0.25).abs() < 1e-9, "scale {scale}");
    }

    #[rstest]
    fn zero_length_edges_disable_the_heuristic() {
        let mut builder = two_nodes();
        builder
            .add_edge(NodeId(1), NodeId(2), EdgeAttributes::new(0.0, 1.0))
            .expect("zero-length edge");
        assert_eq!(builder.build().heuristic_scale(), 0.0);
    }

    #[rstest]
    fn two_way_edges_are_added_in_both_directions() {
        let mut builder = two_nodes();
        let (forward, backward) = builder
            .add_two_way_edge(NodeId(1), NodeId(2), EdgeAttributes::new(5.0, 1.0))
            .expect("two-way edge");
        assert_eq!(forward.source, NodeId(1));
        assert_eq!(backward.source, NodeId(2));
        let graph = builder.build();
        assert_eq!(graph.edge_count(), 2);
    }
}
