//! Traffic snapshots and the non-destructive travel-time overlay.
//!
//! A snapshot maps `"<source>,<destination>"` keys to travel times in seconds.
//! Applying it never touches the base [`NetworkGraph`](crate::NetworkGraph);
//! the [`TrafficOverlay`] is consulted through a [`WeightedGraph`] instead,
//! so path searches on worker threads only ever see frozen data.

mod error;
mod overlay;
mod snapshot;

pub use error::{CacheLoadError, SnapshotError};
pub use overlay::{OverlayStats, TrafficOverlay, WeightedGraph};
pub use snapshot::TrafficSnapshot;
