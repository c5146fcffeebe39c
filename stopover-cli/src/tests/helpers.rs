//! Test helpers for writing plan requests and graph exports to disk.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use stopover_core::test_support::SquareGraph;
use stopover_core::{GeoPoint, PlanRequest};
use stopover_data::{EdgeRecord, GraphExport, NodeRecord};
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write file");
}

/// Temporary directory holding the files a `plan` invocation reads.
#[derive(Debug)]
pub(super) struct PlanFiles {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) request: Utf8PathBuf,
    pub(super) graph: Utf8PathBuf,
}

impl PlanFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let request = root.join("request.json");
        let graph = root.join("graph.json");
        Self {
            _dir: dir,
            root,
            request,
            graph,
        }
    }

    /// Write the unit square as a JSON graph export.
    pub(super) fn write_square_export(&self, square: &SquareGraph) {
        let nodes = square
            .graph
            .nodes()
            .map(|(id, pos)| NodeRecord {
                id: id.0,
                lat: pos.lat,
                lon: pos.lon,
            })
            .collect();
        let edges = square
            .graph
            .edges()
            .map(|edge| EdgeRecord {
                source: edge.key.source.0,
                target: edge.key.target.0,
                length: edge.attributes.length,
                time: edge.attributes.time,
            })
            .collect();
        let export = GraphExport { nodes, edges };
        let payload = serde_json::to_vec_pretty(&export).expect("serialise export");
        write_utf8(&self.graph, &payload);
    }

    pub(super) fn write_request(&self, destinations: Vec<GeoPoint>) {
        let request = PlanRequest::new(destinations);
        let payload = serde_json::to_vec_pretty(&request).expect("serialise request");
        write_utf8(&self.request, &payload);
    }
}
