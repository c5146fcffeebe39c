//! Criterion benchmarks for the exhaustive optimiser.
//!
//! Measures optimisation time for 4, 6 and 8 stops on a street grid, with
//! orderings evaluated in parallel and sequentially. The factorial growth of
//! the search dominates beyond a handful of stops.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package stopover-solver-exhaustive
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use stopover_core::{
    CancellationToken, OptimiseRequest, OptimiserConfig, RouteOptimiser, Strategy, WeightedGraph,
    ordering_count,
};
use stopover_solver_exhaustive::ExhaustiveOptimiser;


use bench_support::{BENCHMARK_SEED, benchmark_graph, random_stops};

/// Stop counts to benchmark, the departure point included.
const STOP_COUNTS: &[usize] = &[4, 6, 8];

/// Benchmark optimisation times for each stop count and evaluation mode.
fn bench_optimise_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimise_time");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));

    let graph = benchmark_graph();
    let config = OptimiserConfig::default();
    let cancel = CancellationToken::new();

    for &count in STOP_COUNTS {
        let stops = random_stops(count, BENCHMARK_SEED);
        let request = OptimiseRequest {
            view: WeightedGraph::unadjusted(&graph),
            stops: &stops,
            strategy: Strategy::HeuristicGuided,
            config: &config,
            cancel: &cancel,
        };
        let orderings = u64::try_from(ordering_count(count)).unwrap_or(u64::MAX);
        group.throughput(Throughput::Elements(orderings));

        for (mode, optimiser) in [
            ("parallel", ExhaustiveOptimiser::new()),
            ("sequential", ExhaustiveOptimiser::sequential()),
        ] {
            group.bench_with_input(BenchmarkId::new(mode, count), &request, |b, request| {
                b.iter(|| {
                    #[expect(
                        clippy::let_underscore_must_use,
                        reason = "Benchmarking optimise performance, result is discarded"
                    )]
                    let _ = optimiser.optimise(request);
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_optimise_times);
criterion_main!(benches);
