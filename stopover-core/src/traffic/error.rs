use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while decoding traffic snapshot content.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload was not a JSON object of numbers.
    #[error("snapshot is not a JSON object of travel times: {0}")]
    Parse(#[from] serde_json::Error),
    /// A key did not follow the `<source>,<destination>` layout.
    #[error("snapshot key {key:?} is not of the form \"<source>,<destination>\"")]
    InvalidKey {
        /// Offending key.
        key: String,
    },
    /// A travel time was negative or not finite.
    #[error("snapshot entry {key:?} has invalid travel time {value}")]
    InvalidTime {
        /// Key of the offending entry.
        key: String,
        /// Rejected value in seconds.
        value: f64,
    },
}

/// Errors from [`crate::TrafficSnapshot::load`].
///
/// A missing file is not an error; these variants describe a snapshot that
/// exists but cannot be used.
#[derive(Debug, Error)]
pub enum CacheLoadError {
    /// The file exists but could not be read.
    #[error("failed to read traffic snapshot {path}: {source}")]
    Io {
        /// Location of the snapshot.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file was read but its content is malformed.
    #[error("traffic snapshot {path} is malformed: {source}")]
    Malformed {
        /// Location of the snapshot.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: SnapshotError,
    },
}
