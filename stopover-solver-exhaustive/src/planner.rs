//! Planner wiring for the exhaustive optimiser.

use stopover_core::{GraphPlanner, GraphProvider, PlannerConfig};

use crate::ExhaustiveOptimiser;

/// A [`GraphPlanner`] that searches visiting orders exhaustively.
pub type ExhaustivePlanner<P> = GraphPlanner<P, ExhaustiveOptimiser>;

/// Build an [`ExhaustivePlanner`] over `provider`.
///
/// Orderings are evaluated in parallel.
///
/// # Examples
/// ```
/// use stopover_core::test_support::{MemoryGraphProvider, square_graph};
/// use stopover_core::{PlanRequest, Planner, PlannerConfig};
/// use stopover_solver_exhaustive::exhaustive_planner;
///
/// let square = square_graph();
/// let planner = exhaustive_planner(
///     MemoryGraphProvider::new(square.graph.clone()),
///     PlannerConfig::default(),
/// );
/// let request = PlanRequest::new(vec![square.position('A'), square.position('C')]);
/// let response = planner.plan(&request)?;
/// assert_eq!(response.order, vec![0, 1]);
/// # Ok::<(), stopover_core::PlanError>(())
/// ```
#[must_use]
pub fn exhaustive_planner<P>(provider: P, config: PlannerConfig) -> ExhaustivePlanner<P>
where
    P: GraphProvider,
{
    GraphPlanner::with_config(provider, ExhaustiveOptimiser::new(), config)
}
