//! Static traffic snapshot files.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufReader, Read};

use camino::Utf8Path;
use log::{info, warn};
use stopover_fs::open_optional_utf8_file;

use super::error::{CacheLoadError, SnapshotError};
use crate::NodeId;

/// Travel times keyed by directed node pair.
///
/// # Examples
/// ```
/// use stopover_core::{NodeId, TrafficSnapshot};
///
/// let snapshot = TrafficSnapshot::from_json_str(r#"{ "1,2": 42.5 }"#).unwrap();
/// assert_eq!(snapshot.get(NodeId(1), NodeId(2)), Some(42.5));
/// assert_eq!(snapshot.get(NodeId(2), NodeId(1)), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficSnapshot {
    times: HashMap<(NodeId, NodeId), f64>,
}

impl TrafficSnapshot {
    /// Load a snapshot from `path`.
    ///
    /// Returns `Ok(None)` and logs a warning when the file does not exist.
    /// Content that exists but cannot be decoded is a [`CacheLoadError`].
    pub fn load(path: &Utf8Path) -> Result<Option<Self>, CacheLoadError> {
        let file = open_optional_utf8_file(path).map_err(|source| CacheLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(file) = file else {
            warn!("traffic snapshot {path} not found; using free-flow travel times");
            return Ok(None);
        };

        let snapshot = Self::from_reader(BufReader::new(file)).map_err(|err| match err {
            SnapshotError::Parse(source) if source.is_io() => CacheLoadError::Io {
                path: path.to_path_buf(),
                source: source.into(),
            },
            source => CacheLoadError::Malformed {
                path: path.to_path_buf(),
                source,
            },
        })?;
        info!("loaded {} traffic entries from {path}", snapshot.len());
        Ok(Some(snapshot))
    }

    /// Decode a snapshot from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let raw: BTreeMap<String, f64> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    /// Decode a snapshot from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let raw: BTreeMap<String, f64> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Build a snapshot from `(source, destination, seconds)` triples.
    ///
    /// Later entries for the same pair replace earlier ones.
    pub fn from_entries<I>(entries: I) -> Result<Self, SnapshotError>
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut times = HashMap::new();
        for (source, target, seconds) in entries {
            check_time(&format!("{source},{target}"), seconds)?;
            times.insert((source, target), seconds);
        }
        Ok(Self { times })
    }

    /// Travel time recorded for the directed pair, if any.
    pub fn get(&self, source: NodeId, target: NodeId) -> Option<f64> {
        self.times.get(&(source, target)).copied()
    }

    /// Iterate over `((source, destination), seconds)` entries.
    pub fn iter(&self) -> impl Iterator<Item = ((NodeId, NodeId), f64)> + '_ {
        self.times.iter().map(|(pair, seconds)| (*pair, *seconds))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn from_raw(raw: BTreeMap<String, f64>) -> Result<Self, SnapshotError> {
        let mut times = HashMap::with_capacity(raw.len());
        for (key, seconds) in raw {
            let pair =
                parse_key(&key).ok_or_else(|| SnapshotError::InvalidKey { key: key.clone() })?;
            check_time(&key, seconds)?;
            times.insert(pair, seconds);
        }
        Ok(Self { times })
    }
}

fn parse_key(key: &str) -> Option<(NodeId, NodeId)> {
    let (source, target) = key.split_once(',')?;
    Some((NodeId(source.parse().ok()?), NodeId(target.parse().ok()?)))
}

fn check_time(key: &str, seconds: f64) -> Result<(), SnapshotError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(SnapshotError::InvalidTime {
            key: key.to_owned(),
            value: seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        (tmp, root)
    }

    #[rstest]
    fn decodes_pair_keys() {
        let snapshot =
            TrafficSnapshot::from_json_str(r#"{ "1,2": 30, "2,1": 12.5 }"#).expect("valid json");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(NodeId(1), NodeId(2)), Some(30.0));
        assert_eq!(snapshot.get(NodeId(2), NodeId(1)), Some(12.5));
    }

    #[rstest]
    #[case(r#"{ "1-2": 30 }"#)]
    #[case(r#"{ "1,": 30 }"#)]
    #[case(r#"{ "a,b": 30 }"#)]
    #[case(r#"{ "1, 2": 30 }"#)]
    fn rejects_malformed_keys(#[case] json: &str) {
        let err = TrafficSnapshot::from_json_str(json).expect_err("malformed key");
        assert!(matches!(err, SnapshotError::InvalidKey { .. }), "{err:?}");
    }

    #[rstest]
    #[case(r#"[1, 2, 3]"#)]
    #[case(r#"{ "1,2": "fast" }"#)]
    #[case(r#"{ not json"#)]
    fn rejects_non_object_payloads(#[case] json: &str) {
        let err = TrafficSnapshot::from_json_str(json).expect_err("malformed payload");
        assert!(matches!(err, SnapshotError::Parse(_)), "{err:?}");
    }

    #[rstest]
    fn rejects_negative_times() {
        let err = TrafficSnapshot::from_json_str(r#"{ "1,2": -4 }"#).expect_err("negative time");
        assert!(matches!(err, SnapshotError::InvalidTime { value, .. } if value == -4.0));
    }

    #[rstest]
    fn missing_file_is_a_no_op() {
        let (_tmp, root) = workspace();
        let loaded = TrafficSnapshot::load(&root.join("traffic.json")).expect("missing is fine");
        assert!(loaded.is_none());
    }

    #[rstest]
    fn malformed_file_is_fatal() {
        let (_tmp, root) = workspace();
        let path = root.join("traffic.json");
        std::fs::write(&path, b"{ \"1,2\": ").expect("write snapshot");

        let err = TrafficSnapshot::load(&path).expect_err("malformed file");
        match err {
            CacheLoadError::Malformed { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Malformed, found {other:?}"),
        }
    }

    #[rstest]
    fn loads_existing_file() {
        let (_tmp, root) = workspace();
        let path = root.join("traffic.json");
        std::fs::write(&path, br#"{ "10,11": 90 }"#).expect("write snapshot");

        let snapshot = TrafficSnapshot::load(&path)
            .expect("valid file")
            .expect("snapshot present");
        assert_eq!(snapshot.get(NodeId(10), NodeId(11)), Some(90.0));
    }
}
