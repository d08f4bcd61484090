//! Benchmark for trajectory prediction performance.

use bevy::prelude::*;
use bevy_aim_prediction::geometry::{Obstacle, SegmentWorld};
use bevy_aim_prediction::simulation::{BodyParameters, SimulationConfig, TrajectorySimulator, WorldConstants};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn simulator() -> TrajectorySimulator {
    let mut simulator = TrajectorySimulator::new(WorldConstants::default());
    simulator.init(BodyParameters::new(1.0, 0.1).with_restitution(0.8));
    simulator
}

/// Closed box with scattered baffles, so paths bounce repeatedly.
fn corridor(baffles: usize) -> SegmentWorld {
    let mut world = SegmentWorld::default().with_box(Vec2::new(-10.0, -5.0), Vec2::new(10.0, 5.0));
    for i in 0..baffles {
        let x = -8.0 + 16.0 * i as f32 / baffles.max(1) as f32;
        let y = if i % 2 == 0 { -5.0 } else { 5.0 };
        world.push(Obstacle::new(Vec2::new(x, y), Vec2::new(x, y * 0.2)));
    }
    world
}

fn benchmark_open_space(c: &mut Criterion) {
    let simulator = simulator();
    let open = SegmentWorld::default();

    let mut group = c.benchmark_group("Plot Open Space");

    for step_count in [30, 120, 500].iter() {
        let config = SimulationConfig::new(2.0, *step_count).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(step_count), step_count, |b, _| {
            b.iter(|| {
                simulator
                    .plot(black_box(Vec2::ZERO), black_box(Vec2::new(8.0, 6.0)), &config, &open)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_bouncing_corridor(c: &mut Criterion) {
    let simulator = simulator();

    let mut group = c.benchmark_group("Plot Bouncing Corridor");

    for baffles in [0, 16, 128].iter() {
        let world = corridor(*baffles);
        let config = SimulationConfig::new(3.0, 200).unwrap().with_max_bounces(20);

        group.bench_with_input(BenchmarkId::from_parameter(baffles), baffles, |b, _| {
            b.iter(|| {
                simulator
                    .plot(black_box(Vec2::ZERO), black_box(Vec2::new(15.0, 4.0)), &config, &world)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_open_space, benchmark_bouncing_corridor);
criterion_main!(benches);
