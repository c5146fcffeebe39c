use thiserror::Error;

use super::NodeId;

/// Errors returned by [`crate::NetworkGraphBuilder`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A node identifier was inserted twice.
    #[error("node {0} is already present in the graph")]
    DuplicateNode(NodeId),
    /// A node position was not a valid WGS84 coordinate.
    #[error("node {id} has an invalid position ({lat}, {lon})")]
    InvalidPosition {
        /// Offending node.
        id: NodeId,
        /// Latitude supplied for the node.
        lat: f64,
        /// Longitude supplied for the node.
        lon: f64,
    },
    /// An edge referenced a node that was never added.
    #[error("edge {source_node} -> {target} references unknown node {missing}")]
    UnknownEndpoint {
        /// Edge source.
        source_node: NodeId,
        /// Edge destination.
        target: NodeId,
        /// The endpoint that is not in the graph.
        missing: NodeId,
    },
    /// An edge weight was negative or not finite.
    #[error("edge {source_node} -> {target} has invalid {attribute} {value}")]
    InvalidWeight {
        /// Edge source.
        source_node: NodeId,
        /// Edge destination.
        target: NodeId,
        /// Attribute name, `length` or `time`.
        attribute: &'static str,
        /// Rejected value.
        value: f64,
    },
}
