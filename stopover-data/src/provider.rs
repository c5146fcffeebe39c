//! [`GraphProvider`] backed by a JSON graph export on disk.

use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use stopover_core::{
    GeoPoint, GraphProvider, GraphProviderError, NetworkGraph, validate_fetch_area,
};
use stopover_fs::open_utf8_file;

use crate::GraphExport;

/// Serve subgraphs of a pre-exported road network.
///
/// The export is read on every fetch, so edits to the file are picked up by
/// the next plan without restarting.
///
/// # Examples
/// ```no_run
/// use stopover_core::{GeoPoint, GraphProvider};
/// use stopover_data::JsonGraphProvider;
///
/// let provider = JsonGraphProvider::new("bangkok.graph.json");
/// let graph = provider.fetch(GeoPoint::new(13.7563, 100.5018), 1_000.0)?;
/// println!("{} nodes", graph.node_count());
/// # Ok::<(), stopover_core::GraphProviderError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonGraphProvider {
    path: Utf8PathBuf,
}

impl JsonGraphProvider {
    /// Read graphs from the export at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the export.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn read_export(&self) -> Result<GraphExport, GraphProviderError> {
        let file = open_utf8_file(&self.path).map_err(|source| GraphProviderError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|err| {
            if err.is_io() {
                GraphProviderError::Io {
                    path: self.path.clone(),
                    source: err.into(),
                }
            } else {
                GraphProviderError::Decode {
                    path: self.path.clone(),
                    source: err,
                }
            }
        })
    }
}

impl GraphProvider for JsonGraphProvider {
    fn fetch(&self, center: GeoPoint, radius_m: f64) -> Result<NetworkGraph, GraphProviderError> {
        validate_fetch_area(center, radius_m)?;
        let export = self.read_export()?;
        let invalid = |source| GraphProviderError::InvalidGraph {
            path: self.path.clone(),
            source,
        };
        let (graph, stats) = export.clip(center, radius_m).map_err(invalid)?;
        debug!(
            "clipped {} nodes and {} edges outside {radius_m} m of {center}",
            stats.nodes_dropped, stats.edges_dropped
        );
        info!(
            "loaded {} nodes and {} edges from {}",
            graph.node_count(),
            graph.edge_count(),
            self.path
        );
        Ok(graph)
    }
}
