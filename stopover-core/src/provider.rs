//! Source of road-network graphs.
//!
//! The planner asks a [`GraphProvider`] for the graph around the first
//! destination before resolving anything. Providers decide where the data comes
//! from (a pre-exported file, a database, a network service); the planner only
//! relies on the contract below.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::{GeoPoint, GraphError, NetworkGraph};

/// Errors from [`GraphProvider::fetch`].
#[derive(Debug, Error)]
pub enum GraphProviderError {
    /// The requested centre was not a valid coordinate.
    #[error("invalid graph centre {center}")]
    InvalidCenter {
        /// Rejected centre.
        center: GeoPoint,
    },
    /// The requested radius was negative or not finite.
    #[error("invalid graph radius {radius_m} m")]
    InvalidRadius {
        /// Rejected radius in metres.
        radius_m: f64,
    },
    /// The backing resource could not be read.
    #[error("failed to read graph source {path}")]
    Io {
        /// Location of the graph source.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The backing resource was not a decodable graph export.
    #[error("failed to decode graph source {path}")]
    Decode {
        /// Location of the graph source.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The decoded content violates graph invariants.
    #[error("graph source {path} describes an invalid graph")]
    InvalidGraph {
        /// Location of the graph source.
        path: Utf8PathBuf,
        /// Validation failure raised while building the graph.
        #[source]
        source: GraphError,
    },
}

/// Produce the road network around a point.
///
/// Implementations must only emit edges whose `length` is at least the
/// great-circle distance between their endpoints; heuristic-guided searches
/// rely on it to stay optimal.
///
/// Providers must be `Send + Sync` so a planner can be shared across threads.
///
/// # Examples
/// ```
/// use stopover_core::{GeoPoint, GraphProvider, GraphProviderError, NetworkGraph, NodeId};
///
/// struct SingleNode;
///
/// impl GraphProvider for SingleNode {
///     fn fetch(
///         &self,
///         center: GeoPoint,
///         _radius_m: f64,
///     ) -> Result<NetworkGraph, GraphProviderError> {
///         let mut builder = NetworkGraph::builder();
///         builder
///             .add_node(NodeId(1), center)
///             .map_err(|_| GraphProviderError::InvalidCenter { center })?;
///         Ok(builder.build())
///     }
/// }
///
/// let graph = SingleNode.fetch(GeoPoint::new(51.5, -0.1), 500.0)?;
/// assert_eq!(graph.node_count(), 1);
/// # Ok::<(), GraphProviderError>(())
/// ```
pub trait GraphProvider: Send + Sync {
    /// Return the graph of nodes within `radius_m` metres of `center`.
    fn fetch(&self, center: GeoPoint, radius_m: f64) -> Result<NetworkGraph, GraphProviderError>;
}

/// Check the arguments every provider receives.
///
/// Providers may call this first to reject malformed requests uniformly.
pub fn validate_fetch_area(center: GeoPoint, radius_m: f64) -> Result<(), GraphProviderError> {
    if !center.is_valid() {
        return Err(GraphProviderError::InvalidCenter { center });
    }
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(GraphProviderError::InvalidRadius { radius_m });
    }
    Ok(())
}
