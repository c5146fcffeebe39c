//! Exhaustive search over visiting orders.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::iter;
use std::sync::atomic::{self, AtomicUsize};
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, warn};
use rayon::prelude::*;
use stopover_core::{
    CancellationToken, MultiStopPlan, NodeId, OptimiseError, OptimiseRequest, PathFinder, Route,
    RouteAssembler, RouteOptimiser, Strategy, ordering_count,
};

/// Optimiser that scores every ordering of the stops after the first.
///
/// Legs are computed once per distinct ordered pair of stop nodes, then each
/// ordering is scored by summing leg lengths. Orderings that need an
/// unroutable leg are discarded. The cheapest ordering wins; ties go to the
/// ordering that comes first lexicographically.
///
/// # Examples
/// ```
/// use stopover_core::test_support::square_graph;
/// use stopover_core::{
///     CancellationToken, OptimiseRequest, OptimiserConfig, RouteOptimiser, Strategy,
///     WeightedGraph,
/// };
/// use stopover_solver_exhaustive::ExhaustiveOptimiser;
///
/// let square = square_graph();
/// let stops = [square.id('A'), square.id('C'), square.id('B'), square.id('D')];
/// let request = OptimiseRequest {
///     view: WeightedGraph::unadjusted(&square.graph),
///     stops: &stops,
///     strategy: Strategy::UniformCost,
///     config: &OptimiserConfig::default(),
///     cancel: &CancellationToken::new(),
/// };
/// let plan = ExhaustiveOptimiser::new().optimise(&request)?;
/// assert_eq!(plan.order(), &[0, 2, 1, 3]);
/// assert_eq!(plan.total_length(), 3.0);
/// # Ok::<(), stopover_core::OptimiseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExhaustiveOptimiser {
    parallel: bool,
}

impl Default for ExhaustiveOptimiser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExhaustiveOptimiser {
    /// Create an optimiser that evaluates orderings on the rayon pool.
    #[must_use]
    pub const fn new() -> Self {
        Self { parallel: true }
    }

    /// Create an optimiser that evaluates orderings on the calling thread.
    #[must_use]
    pub const fn sequential() -> Self {
        Self { parallel: false }
    }

    /// Whether orderings are evaluated in parallel.
    #[must_use]
    pub const fn is_parallel(self) -> bool {
        self.parallel
    }

    fn search(
        self,
        legs: &LegTable,
        stops: &[NodeId],
        budget: &Budget<'_>,
        discarded: &AtomicUsize,
    ) -> Result<Option<Candidate>, OptimiseError> {
        let positions = stops.len().saturating_sub(1);
        let orderings = (1..stops.len()).permutations(positions).enumerate();
        let evaluate = |(index, tail): (usize, Vec<usize>)| -> Result<_, OptimiseError> {
            budget.check()?;
            let candidate = legs
                .tour_length(stops, &tail)
                .map(|length| Candidate {
                    index,
                    length,
                    tail,
                });
            if candidate.is_none() {
                discarded.fetch_add(1, atomic::Ordering::Relaxed);
            }
            Ok(candidate)
        };

        if self.parallel {
            orderings
                .par_bridge()
                .map(evaluate)
                .try_reduce(|| None, |best, next| Ok(Candidate::better(best, next)))
        } else {
            orderings
                .map(evaluate)
                .try_fold(None, |best, next| next.map(|found| Candidate::better(best, found)))
        }
    }
}

impl RouteOptimiser for ExhaustiveOptimiser {
    fn optimise(&self, request: &OptimiseRequest<'_>) -> Result<MultiStopPlan, OptimiseError> {
        let budget = Budget::start(request.cancel, request.config.timeout);
        let stops = request.stops;
        if stops.is_empty() {
            return Err(OptimiseError::EmptyInput);
        }
        let limits = request.config;
        if stops.len() > limits.max_destinations {
            return Err(OptimiseError::TooManyDestinations {
                count: stops.len(),
                limit: limits.max_destinations,
            });
        }
        let orderings = ordering_count(stops.len());
        if orderings > limits.max_orderings {
            return Err(OptimiseError::TooManyOrderings {
                count: orderings,
                limit: limits.max_orderings,
            });
        }
        budget.check()?;

        let assembler = RouteAssembler::new(request.view.graph());
        if stops.len() == 1 {
            return assembler
                .assemble(vec![0], Vec::new())
                .map_err(OptimiseError::from);
        }

        let finder = PathFinder::new(request.view);
        let legs = LegTable::build(finder, stops, request.strategy, self.parallel, &budget)?;
        let discarded = AtomicUsize::new(0);
        let best = self.search(&legs, stops, &budget, &discarded)?;
        let discarded_count = discarded.into_inner();

        let Some(winner) = best else {
            warn!("all {orderings} visiting orders contain an unroutable leg");
            return Err(OptimiseError::NoFeasiblePlan { orderings });
        };
        if discarded_count > 0 {
            warn!(
                "discarded {discarded_count} of {orderings} visiting orders with unroutable legs"
            );
        }
        debug!(
            "evaluated {orderings} visiting orders of {} stops in {:?}; best is #{} at {:.1} m",
            stops.len(),
            budget.elapsed(),
            winner.index,
            winner.length
        );

        let routes = legs
            .routes(stops, &winner.tail)
            .ok_or(OptimiseError::NoFeasiblePlan { orderings })?;
        let order = iter::once(0).chain(winner.tail).collect();
        assembler
            .assemble(order, routes)
            .map_err(OptimiseError::from)
    }
}

/// Cancellation and deadline shared by every worker of one optimisation.
#[derive(Debug, Clone, Copy)]
struct Budget<'a> {
    cancel: &'a CancellationToken,
    started: Instant,
    timeout: Option<Duration>,
}

impl<'a> Budget<'a> {
    fn start(cancel: &'a CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            started: Instant::now(),
            timeout,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn check(&self) -> Result<(), OptimiseError> {
        if self.cancel.is_cancelled() {
            return Err(OptimiseError::Cancelled);
        }
        if let Some(limit) = self.timeout {
            let elapsed = self.elapsed();
            if elapsed >= limit {
                return Err(OptimiseError::TimedOut { elapsed });
            }
        }
        Ok(())
    }
}

/// Shortest route for every ordered pair of stop nodes that has one.
#[derive(Debug)]
struct LegTable {
    routes: HashMap<(NodeId, NodeId), Route>,
}

impl LegTable {
    fn build(
        finder: PathFinder<'_>,
        stops: &[NodeId],
        strategy: Strategy,
        parallel: bool,
        budget: &Budget<'_>,
    ) -> Result<Self, OptimiseError> {
        // The fixed start is never a leg target, unless a later stop shares
        // its node.
        let pairs: Vec<(NodeId, NodeId)> = stops
            .iter()
            .copied()
            .cartesian_product(stops.iter().skip(1).copied())
            .unique()
            .collect();
        let search = |&(origin, destination): &(NodeId, NodeId)| -> Result<_, OptimiseError> {
            budget.check()?;
            match finder.shortest_path(origin, destination, strategy) {
                Ok(route) => Ok(Some(((origin, destination), route))),
                Err(err) => {
                    warn!("leg {origin} -> {destination} is unroutable: {err}");
                    Ok(None)
                }
            }
        };

        let found: Vec<Option<((NodeId, NodeId), Route)>> = if parallel {
            pairs.par_iter().map(search).collect::<Result<_, OptimiseError>>()?
        } else {
            pairs.iter().map(search).collect::<Result<_, OptimiseError>>()?
        };
        debug!("computed {} legs between {} stops", pairs.len(), stops.len());
        Ok(Self {
            routes: found.into_iter().flatten().collect(),
        })
    }

    fn get(&self, origin: NodeId, destination: NodeId) -> Option<&Route> {
        self.routes.get(&(origin, destination))
    }

    /// Walk the stops in `tail` order from the fixed start.
    fn walk<'s>(
        &'s self,
        stops: &'s [NodeId],
        tail: &'s [usize],
    ) -> impl Iterator<Item = Option<&'s Route>> + 's {
        let start = stops.first().copied();
        tail.iter()
            .scan(start, move |previous, &position| {
                let origin = (*previous)?;
                let destination = stops.get(position).copied();
                *previous = destination;
                Some(destination.and_then(|target| self.get(origin, target)))
            })
    }

    #[expect(clippy::float_arithmetic, reason = "leg lengths are summed in metres")]
    fn tour_length(&self, stops: &[NodeId], tail: &[usize]) -> Option<f64> {
        let mut length = 0.0;
        for leg in self.walk(stops, tail) {
            length += leg?.length();
        }
        Some(length)
    }

    fn routes(&self, stops: &[NodeId], tail: &[usize]) -> Option<Vec<Route>> {
        let routes: Option<Vec<Route>> = self.walk(stops, tail).map(|leg| leg.cloned()).collect();
        routes.filter(|found| found.len() == tail.len())
    }
}

/// A feasible ordering and its score.
#[derive(Debug, Clone)]
struct Candidate {
    /// Position of the ordering in lexicographic enumeration.
    index: usize,
    length: f64,
    tail: Vec<usize>,
}

impl Candidate {
    fn beats(&self, other: &Self) -> bool {
        self.length
            .total_cmp(&other.length)
            .then(self.index.cmp(&other.index))
            == Ordering::Less
    }

    fn better(current: Option<Self>, next: Option<Self>) -> Option<Self> {
        match (current, next) {
            (Some(held), Some(challenger)) => {
                if challenger.beats(&held) {
                    Some(challenger)
                } else {
                    Some(held)
                }
            }
            (held, challenger) => held.or(challenger),
        }
    }
}
