use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use neoncity_common::Ray;
use neoncity_layout::{CollisionResolver, LayoutConfig, generate, pick, seed};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_generate(rows: u32, cols: u32, iterations: usize) {
    let config = LayoutConfig {
        rows,
        cols,
        ..LayoutConfig::default()
    };
    let start = Instant::now();
    for i in 0..iterations {
        let mut rng = ChaCha8Rng::seed_from_u64(i as u64);
        let _ = black_box(generate(black_box(&config), &mut rng));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  generate ({rows}x{cols}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_seed(iterations: usize) {
    let start = Instant::now();
    let mut acc = 0.0;
    for i in 0..iterations {
        acc += seed(black_box(i as f32 * 16.0), black_box(-(i as f32) * 16.0));
    }
    black_box(acc);
    let elapsed = start.elapsed();
    println!("  seed ({iterations} evals): total {elapsed:?}");
}

fn bench_collision(iterations: usize) {
    let layout = generate(&LayoutConfig::default(), &mut ChaCha8Rng::seed_from_u64(1))
        .expect("default config is valid");
    let resolver = CollisionResolver::default();
    let start = Instant::now();
    for i in 0..iterations {
        let p = Vec3::new((i % 1264) as f32 - 632.0, 3.0, (i % 624) as f32 - 312.0);
        let _ = black_box(resolver.resolve(black_box(&layout), black_box(p)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  resolve ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_pick(iterations: usize) {
    let layout = generate(&LayoutConfig::default(), &mut ChaCha8Rng::seed_from_u64(1))
        .expect("default config is valid");
    let ray = Ray::new(Vec3::new(128.0, 2.0, 0.0), Vec3::new(-1.0, 0.0, 0.05));
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(pick::intersect(black_box(&layout), black_box(&ray)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  pick ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Layout Benchmarks ===\n");

    println!("Generation:");
    bench_generate(40, 80, 100);
    bench_generate(200, 200, 10);

    println!("\nSeed:");
    bench_seed(1_000_000);

    println!("\nPer-tick queries:");
    bench_collision(1_000_000);
    bench_pick(1000);

    println!("\n=== Done ===");
}
