//! Criterion benchmarks for u-anneal.
//!
//! Uses synthetic systems (Sphere function, ring tour) to measure engine
//! overhead and the gain from incremental energy evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_anneal::anneal::{Annealer, Move, Schedule, System};
use u_anneal::replicate::{ReplicaCount, Replicator};

// ===========================================================================
// Sphere function: minimize sum(x_i^2)
// ===========================================================================

#[derive(Clone)]
struct Sphere {
    x: Vec<f64>,
}

struct Nudge {
    i: usize,
    dx: f64,
}

impl Move<Sphere> for Nudge {
    fn weight(&self) -> f64 {
        1.0
    }

    fn propose<R: Rng + ?Sized>(&mut self, system: &Sphere, rng: &mut R) {
        self.i = rng.random_range(0..system.x.len());
        self.dx = rng.random_range(-0.5..0.5);
    }

    fn apply(&mut self, system: &mut Sphere) {
        system.x[self.i] += self.dx;
    }

    fn revert(&mut self, system: &mut Sphere) {
        system.x[self.i] -= self.dx;
    }
}

impl System for Sphere {
    type Move = Nudge;

    fn size(&self) -> usize {
        self.x.len()
    }

    fn energy(&self) -> f64 {
        self.x.iter().map(|v| v * v).sum()
    }

    fn moves(&self) -> Vec<Nudge> {
        vec![Nudge { i: 0, dx: 0.0 }]
    }
}

// ===========================================================================
// Ring tour: cities on a circle, shortest closed tour
// ===========================================================================

#[derive(Clone)]
struct Ring {
    points: Vec<(f64, f64)>,
    tour: Vec<usize>,
    incremental: bool,
}

impl Ring {
    fn new(n: usize, incremental: bool) -> Self {
        let points = (0..n)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / n as f64;
                (a.cos(), a.sin())
            })
            .collect();
        // Stride permutation: a deliberately poor starting tour.
        let tour = (0..n).map(|k| (k * 7) % n).collect();
        Self {
            points,
            tour,
            incremental,
        }
    }

    fn city_at(&self, pos: usize, swap: Option<(usize, usize)>) -> usize {
        match swap {
            Some((i, j)) if pos == i => self.tour[j],
            Some((i, j)) if pos == j => self.tour[i],
            _ => self.tour[pos],
        }
    }

    fn edge(&self, k: usize, swap: Option<(usize, usize)>) -> f64 {
        let n = self.tour.len();
        let (ax, ay) = self.points[self.city_at(k, swap)];
        let (bx, by) = self.points[self.city_at((k + 1) % n, swap)];
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

struct SwapCities {
    i: usize,
    j: usize,
}

impl Move<Ring> for SwapCities {
    fn weight(&self) -> f64 {
        1.0
    }

    fn propose<R: Rng + ?Sized>(&mut self, system: &Ring, rng: &mut R) {
        let n = system.tour.len();
        self.i = rng.random_range(0..n);
        self.j = rng.random_range(0..n);
    }

    fn apply(&mut self, system: &mut Ring) {
        system.tour.swap(self.i, self.j);
    }

    fn revert(&mut self, system: &mut Ring) {
        system.tour.swap(self.i, self.j);
    }
}

impl System for Ring {
    type Move = SwapCities;

    fn size(&self) -> usize {
        self.tour.len()
    }

    fn energy(&self) -> f64 {
        (0..self.tour.len()).map(|k| self.edge(k, None)).sum()
    }

    fn moves(&self) -> Vec<SwapCities> {
        vec![SwapCities { i: 0, j: 0 }]
    }

    fn uses_energy_delta(&self) -> bool {
        self.incremental
    }

    fn energy_delta(&self, mv: &SwapCities) -> Option<f64> {
        if mv.i == mv.j {
            return Some(0.0);
        }
        let n = self.tour.len();
        let mut edges = vec![
            (mv.i + n - 1) % n,
            mv.i,
            (mv.j + n - 1) % n,
            mv.j,
        ];
        edges.sort_unstable();
        edges.dedup();
        let swap = Some((mv.i, mv.j));
        let before: f64 = edges.iter().map(|&k| self.edge(k, None)).sum();
        let after: f64 = edges.iter().map(|&k| self.edge(k, swap)).sum();
        Some(after - before)
    }
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_anneal_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("anneal_sphere");
    group.sample_size(10);

    for &dim in &[10usize, 50, 100] {
        let system = Sphere { x: vec![3.0; dim] };
        let schedule = Schedule::default()
            .with_initial_temperature(10.0)
            .with_final_temperature(0.01)
            .with_decay(0.8)
            .with_cycles_per_block(10);
        group.bench_with_input(
            BenchmarkId::from_parameter(dim),
            &(system, schedule),
            |b, (s, sch)| {
                b.iter(|| {
                    let result = Annealer::with_seed(s.clone(), *sch, 42)
                        .and_then(|a| a.anneal())
                        .map(|r| r.best_energy);
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_anneal_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("anneal_ring");
    group.sample_size(10);

    let schedule = Schedule::default()
        .with_initial_temperature(1.0)
        .with_final_temperature(0.001)
        .with_decay(0.85)
        .with_cycles_per_block(20);

    for &n in &[50usize, 200] {
        for incremental in [false, true] {
            let label = if incremental { "delta" } else { "full" };
            let system = Ring::new(n, incremental);
            group.bench_with_input(
                BenchmarkId::new(label, n),
                &system,
                |b, s| {
                    b.iter(|| {
                        let result = Annealer::with_seed(s.clone(), schedule, 42)
                            .and_then(|a| a.anneal())
                            .map(|r| r.best_energy);
                        black_box(result)
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_replicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("replicates_ring");
    group.sample_size(10);

    let schedule = Schedule::default()
        .with_initial_temperature(1.0)
        .with_final_temperature(0.01)
        .with_decay(0.8)
        .with_cycles_per_block(10);

    for &replicas in &[1usize, 4] {
        let replicator = Replicator::new(Ring::new(100, true), schedule)
            .and_then(|r| r.with_replicas(ReplicaCount::Fixed(replicas)))
            .map(|r| r.with_seed(42));
        let Ok(replicator) = replicator else {
            continue;
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(replicas),
            &replicator,
            |b, r| {
                b.iter(|| {
                    let best = r.run().ok().and_then(|run| run.into_best()).map(|b| b.best_energy);
                    black_box(best)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_anneal_sphere, bench_anneal_ring, bench_replicates);
criterion_main!(benches);
