//! Exhaustive visiting-order optimiser for Stopover.
//!
//! This crate provides [`ExhaustiveOptimiser`], the default implementation of
//! the [`RouteOptimiser`](stopover_core::RouteOptimiser) trait. With the first
//! stop fixed it computes one shortest path per ordered pair of stops, then
//! scores every permutation of the remaining stops by total length and keeps
//! the cheapest.
//!
//! Orderings are evaluated on the rayon thread pool. The winner is chosen by
//! total length and, on ties, by the lexicographically smallest ordering, so
//! parallel and sequential runs return the same plan.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod optimiser;
mod planner;

pub use optimiser::ExhaustiveOptimiser;
pub use planner::{ExhaustivePlanner, exhaustive_planner};

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
