use criterion::{black_box, criterion_group, criterion_main, Criterion};

use islands_portfolio::ambient::boids::{seed_flock, step_boids, BoidConfig};
use islands_portfolio::procgen::terrain_height;
use islands_portfolio::world::layout::{default_roster, Archipelago};
use islands_portfolio::world::WorldConfig;

fn height_queries(c: &mut Criterion) {
    c.bench_function("terrain_height 1k samples", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for i in 0..1000 {
                let a = i as f32 * 0.037;
                let r = (i % 30) as f32;
                sum += terrain_height(black_box(a.cos() * r), black_box(a.sin() * r), 30.0, 1337);
            }
            sum
        })
    });
}

fn island_mesh(c: &mut Criterion) {
    let archipelago = match Archipelago::generate(&WorldConfig::default(), default_roster()) {
        Ok(archipelago) => archipelago,
        Err(err) => panic!("default layout rejected: {err}"),
    };
    c.bench_function("build hub mesh", |b| b.iter(|| black_box(&archipelago.hub).build_mesh()));
}

fn boid_step(c: &mut Criterion) {
    let config = BoidConfig::default();
    let mut flock = seed_flock(&config);
    c.bench_function("step 25 boids", |b| {
        b.iter(|| step_boids(black_box(&mut flock), &config, 1.0 / 60.0))
    });
}

criterion_group!(benches, height_queries, island_mesh, boid_step);
criterion_main!(benches);
