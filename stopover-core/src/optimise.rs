//! Search over destination visiting orders.
//!
//! The [`RouteOptimiser`] trait is implemented by solver crates. It receives a
//! frozen [`WeightedGraph`], the resolved stops, and the limits that bound the
//! search, and returns the cheapest [`MultiStopPlan`] it finds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::{AssembleError, MultiStopPlan, NodeId, Strategy, WeightedGraph};

/// Default cap on resolved destinations.
pub const DEFAULT_MAX_DESTINATIONS: usize = 10;

/// Default cap on evaluated orderings (`10!`).
pub const DEFAULT_MAX_ORDERINGS: usize = 3_628_800;

/// Limits applied to a single optimisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimiserConfig {
    /// Maximum number of stops, the fixed start included.
    pub max_destinations: usize,
    /// Maximum number of orderings to evaluate.
    pub max_orderings: usize,
    /// Wall-clock budget; `None` waits for the search to finish.
    pub timeout: Option<Duration>,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self {
            max_destinations: DEFAULT_MAX_DESTINATIONS,
            max_orderings: DEFAULT_MAX_ORDERINGS,
            timeout: None,
        }
    }
}

/// Shared flag that stops an optimisation in progress.
///
/// Clones observe the same flag, so a token handed to another thread can
/// cancel a search running on the planner's workers.
///
/// # Examples
/// ```
/// use stopover_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let remote = token.clone();
/// remote.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Inputs to [`RouteOptimiser::optimise`].
#[derive(Debug, Clone, Copy)]
pub struct OptimiseRequest<'a> {
    /// Frozen graph and traffic overlay.
    pub view: WeightedGraph<'a>,
    /// Resolved stops; the first is the fixed departure point.
    pub stops: &'a [NodeId],
    /// Path search strategy for every leg.
    pub strategy: Strategy,
    /// Limits for this optimisation.
    pub config: &'a OptimiserConfig,
    /// Cancellation flag observed by every worker.
    pub cancel: &'a CancellationToken,
}

/// Errors from [`RouteOptimiser::optimise`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimiseError {
    /// No stops were supplied.
    #[error("no stops to optimise")]
    EmptyInput,
    /// Every ordering contained an unroutable leg.
    #[error("none of the {orderings} visiting orders can be routed")]
    NoFeasiblePlan {
        /// Number of orderings evaluated.
        orderings: usize,
    },
    /// More stops than the configured cap.
    #[error("{count} destinations exceed the limit of {limit}")]
    TooManyDestinations {
        /// Stops supplied.
        count: usize,
        /// Configured cap.
        limit: usize,
    },
    /// More orderings than the configured cap.
    #[error("{count} visiting orders exceed the limit of {limit}")]
    TooManyOrderings {
        /// Orderings required, saturating at `usize::MAX`.
        count: usize,
        /// Configured cap.
        limit: usize,
    },
    /// The cancellation token fired.
    #[error("optimisation was cancelled")]
    Cancelled,
    /// The configured timeout elapsed.
    #[error("optimisation timed out after {elapsed:?}")]
    TimedOut {
        /// Time spent before giving up.
        elapsed: Duration,
    },
    /// The winning routes could not be assembled into a plan.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Find the cheapest visiting order for a set of stops.
///
/// Implementations must keep the first stop fixed, return an empty plan for a
/// single stop, and reject an empty stop list with
/// [`OptimiseError::EmptyInput`]. Optimisers must be `Send + Sync` to be shared
/// by planners across threads.
pub trait RouteOptimiser: Send + Sync {
    /// Optimise `request`, producing a plan or an error.
    fn optimise(&self, request: &OptimiseRequest<'_>) -> Result<MultiStopPlan, OptimiseError>;
}

/// Number of orderings of `stops` with the first stop fixed.
///
/// Saturates at `usize::MAX`.
///
/// # Examples
/// ```
/// use stopover_core::ordering_count;
///
/// assert_eq!(ordering_count(1), 1);
/// assert_eq!(ordering_count(4), 6);
/// assert_eq!(ordering_count(11), 3_628_800);
/// ```
pub fn ordering_count(stops: usize) -> usize {
    (2..stops).fold(1_usize, |acc, n| acc.saturating_mul(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(5, 24)]
    fn counts_tail_permutations(#[case] stops: usize, #[case] expected: usize) {
        assert_eq!(ordering_count(stops), expected);
    }

    #[rstest]
    fn ordering_count_saturates() {
        assert_eq!(ordering_count(200), usize::MAX);
    }

    #[rstest]
    fn default_limits_allow_ten_stops() {
        let config = OptimiserConfig::default();
        assert_eq!(config.max_destinations, 10);
        assert!(ordering_count(config.max_destinations) <= config.max_orderings);
    }

    #[rstest]
    fn cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
