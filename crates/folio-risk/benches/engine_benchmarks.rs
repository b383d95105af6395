//! Benchmarks for the folio-risk engine components.
//!
//! Run with: cargo bench -p folio-risk

use std::collections::BTreeMap;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::{DMatrix, DVector};

use folio_core::Ticker;
use folio_risk::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn create_returns(assets: usize, observations: usize) -> BTreeMap<String, Vec<f64>> {
    (0..assets)
        .map(|a| {
            let series = (0..observations)
                .map(|t| {
                    let phase = (t * (a + 3)) as f64 * 0.37;
                    0.0004 + 0.01 * (a as f64 + 1.0).sqrt() * phase.sin()
                })
                .collect();
            (format!("A{:03}", a), series)
        })
        .collect()
}

fn create_tickers(assets: usize) -> Vec<Ticker> {
    (0..assets)
        .filter_map(|a| Ticker::new(format!("A{:03}", a)).ok())
        .collect()
}

fn create_covariance(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| {
        let vi = 0.01 * (1.0 + i as f64 * 0.1);
        let vj = 0.01 * (1.0 + j as f64 * 0.1);
        let corr = if i == j { 1.0 } else { 0.3 };
        vi * vj * corr
    })
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_returns_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("returns_statistics");

    for assets in [5, 20, 50] {
        let returns = create_returns(assets, 252);
        let tickers = create_tickers(assets);
        group.throughput(Throughput::Elements((assets * 252) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(assets), &returns, |b, returns| {
            b.iter(|| ReturnsStatistics::from_series(black_box(&tickers), black_box(returns)));
        });
    }

    group.finish();
}

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(20);

    let weights = DVector::from_element(4, 0.25);
    let mu = DVector::from_element(4, 0.0004);
    let cov = create_covariance(4);
    let source = ChaChaNormals::new(42);

    for paths in [100, 1_000, 10_000] {
        let params = SimulationParams {
            initial_investment: 10_000.0,
            num_simulations: paths,
            num_periods: 252,
        };
        group.throughput(Throughput::Elements((paths * 252) as u64));

        group.bench_with_input(BenchmarkId::new("sequential", paths), &params, |b, params| {
            let simulator = MonteCarloSimulator::new(EngineConfig::sequential());
            b.iter(|| simulator.simulate(&weights, &mu, &cov, black_box(params), &source));
        });
        group.bench_with_input(BenchmarkId::new("parallel", paths), &params, |b, params| {
            let simulator = MonteCarloSimulator::new(EngineConfig::new().with_threshold(1));
            b.iter(|| simulator.simulate(&weights, &mu, &cov, black_box(params), &source));
        });
    }

    group.finish();
}

fn bench_risk_parity(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk_parity");
    let optimizer = RiskParityOptimizer::default();

    for n in [3, 10, 30] {
        let cov = create_covariance(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &cov, |b, cov| {
            b.iter(|| optimizer.optimize(black_box(cov)));
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let values: Vec<f64> = (0..10_000)
        .map(|i| 10_000.0 + (i as f64 * 0.731).sin() * 500.0)
        .collect();

    c.bench_function("statistics_summary_10k", |b| {
        b.iter(|| StatisticsSummary::from_values(black_box(&values)));
    });
}

criterion_group!(
    benches,
    bench_returns_statistics,
    bench_simulation,
    bench_risk_parity,
    bench_summary
);
criterion_main!(benches);
