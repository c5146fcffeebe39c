//! Graph sources for the Stopover route planner.
//!
//! Responsibilities:
//! - Read pre-exported road networks and serve them through
//!   [`stopover_core::GraphProvider`].
//! - Encapsulate the on-disk export format.
//!
//! Boundaries:
//! - Do not encode planning rules (live in `stopover-core`).
//! - File access goes through `stopover-fs` so paths stay UTF-8.
//!
//! Invariants:
//! - Providers hold no mutable state and are safe to share across threads.

#![forbid(unsafe_code)]

mod export;
mod provider;

pub use export::{EdgeRecord, GraphExport, NodeRecord};
pub use provider::JsonGraphProvider;
