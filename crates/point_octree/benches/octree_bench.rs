//! Benchmarks for point_octree: incremental build and bounded k-NN queries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use point_octree::{DVec3, PointOctree, QueryScratch};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform cloud in [-1, 1]³, fixed seed so runs are comparable.
fn random_cloud(count: usize, seed: u64) -> Vec<DVec3> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..count)
    .map(|_| {
      DVec3::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
      )
    })
    .collect()
}

fn build(points: &[DVec3]) -> PointOctree<u32> {
  let mut tree = PointOctree::new();
  tree.reserve(points.len());
  for (i, &p) in points.iter().enumerate() {
    tree.add_point(p, i as u32).expect("bench points are finite");
  }
  tree
}

/// Insert throughput at several cloud sizes.
fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("build");
  for count in [1_000, 10_000, 100_000] {
    let points = random_cloud(count, 1);
    group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
      b.iter(|| black_box(build(black_box(points))))
    });
  }
  group.finish();
}

/// k-NN with a reused scratch buffer (the allocation-free path).
fn bench_knn(c: &mut Criterion) {
  let points = random_cloud(100_000, 2);
  let tree = build(&points);
  let queries = random_cloud(1_024, 3);

  let mut group = c.benchmark_group("knn_100k");
  for k in [1, 8, 32] {
    group.bench_with_input(BenchmarkId::new("k", k), &k, |b, &k| {
      let mut scratch = QueryScratch::new();
      let mut out = Vec::with_capacity(k);
      b.iter(|| {
        for &q in &queries {
          tree.nearest_neighbors_into(q, 0.25, k, &mut scratch, &mut out);
          black_box(out.len());
        }
      })
    });
  }
  group.finish();
}

/// Same queries spread across rayon's pool.
fn bench_par_knn(c: &mut Criterion) {
  let points = random_cloud(100_000, 4);
  let tree = build(&points);
  let queries = random_cloud(16_384, 5);

  c.bench_function("par_knn_100k (k=8, 16k queries)", |b| {
    b.iter(|| black_box(tree.par_nearest_neighbors(black_box(&queries), 0.25, 8)))
  });
}

/// Coincident points: every query lands in one overfull leaf.
fn bench_degenerate(c: &mut Criterion) {
  let points = vec![DVec3::splat(0.5); 10_000];
  let tree = build(&points);

  c.bench_function("knn_coincident_10k (k=16)", |b| {
    b.iter(|| black_box(tree.nearest_neighbors(black_box(DVec3::splat(0.5)), 1.0, 16).len()))
  });
}

criterion_group!(benches, bench_build, bench_knn, bench_par_knn, bench_degenerate);
criterion_main!(benches);
