use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use point_index::kdtree::{KDTree, KDTreeBuilder, Splitter};
use point_index::{PointSet, ResultBuffer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::RTree;

fn load_data(seed: u64, npts: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..npts * 2).map(|_| rng.gen_range(0.0..1000.0)).collect()
}

fn construct_kdtree(points: PointSet<f64>, splitter: Splitter) -> KDTree<f64> {
    KDTreeBuilder::new(points)
        .splitter(splitter)
        .build()
        .unwrap()
}

fn construct_rstar(rows: Vec<[f64; 2]>) -> RTree<[f64; 2]> {
    RTree::bulk_load(rows)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let coords = load_data(42, 100_000);
    let points = PointSet::try_new(&coords, 2).unwrap();
    let rows: Vec<[f64; 2]> = coords.chunks(2).map(|p| [p[0], p[1]]).collect();

    c.bench_function("construction (sliding midpoint)", |b| {
        b.iter(|| construct_kdtree(points, Splitter::SlidingMidpoint))
    });

    c.bench_function("construction (longest median)", |b| {
        b.iter(|| construct_kdtree(points, Splitter::LongestMedian))
    });

    c.bench_function("construction (rstar bulk)", |b| {
        b.iter(|| construct_rstar(rows.to_vec()))
    });

    let tree = construct_kdtree(points, Splitter::SlidingMidpoint);
    let rstar_tree = construct_rstar(rows.to_vec());
    let query_coords = load_data(7, 1_000);
    let queries = PointSet::try_new(&query_coords, 2).unwrap();

    let mut group = c.benchmark_group("knn");
    for k in [1, 10] {
        group.bench_with_input(BenchmarkId::new("kdtree", k), &k, |b, &k| {
            let mut out = ResultBuffer::new();
            b.iter(|| tree.search_knn_batch(&queries, k, &mut out).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("rstar", k), &k, |b, &k| {
            b.iter(|| {
                queries
                    .iter()
                    .map(|q| rstar_tree.nearest_neighbor_iter(&[q[0], q[1]]).take(k).count())
                    .sum::<usize>()
            })
        });
    }
    group.finish();

    let ratio = tree.metric_scale(1.5);
    c.bench_function("aknn (kdtree, k = 10, e = 0.5)", |b| {
        let mut out = ResultBuffer::new();
        b.iter(|| {
            tree.search_aknn_batch(&queries, 10, ratio, &mut out)
                .unwrap()
        })
    });

    let r = 15.0;
    let r2 = tree.metric_scale(r);
    c.bench_function("radius (kdtree)", |b| {
        let mut out = ResultBuffer::new();
        b.iter(|| tree.search_radius_batch(&queries, r2, &mut out).unwrap())
    });

    c.bench_function("radius (rstar)", |b| {
        b.iter(|| {
            queries
                .iter()
                .map(|q| rstar_tree.locate_within_distance([q[0], q[1]], r2).count())
                .sum::<usize>()
        })
    });

    c.bench_function("box (kdtree)", |b| {
        b.iter(|| tree.search_box(&[400.0, 400.0], &[450.0, 450.0]).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
