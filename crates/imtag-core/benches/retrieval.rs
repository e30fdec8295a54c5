//! Benchmarks for vector lookup, image embedding and nearest-label search.
//!
//! Run with: cargo bench -p imtag-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imtag_core::vectors::write_store;
use imtag_core::{nearest_labels, ConfidenceTag, DistanceMetric, ImageEmbedder, Label, VectorStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIM: usize = 300;

fn random_labels(rng: &mut StdRng, count: usize) -> Vec<Label> {
    (0..count)
        .map(|i| {
            let vector = (0..DIM).map(|_| rng.gen_range(0.0f32..1.0)).collect();
            Label::new(format!("term_{i}"), vector)
        })
        .collect()
}

fn benchmark_nearest_labels(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let candidates = random_labels(&mut rng, 10_000);
    let queries: Vec<Vec<f32>> = random_labels(&mut rng, 16)
        .into_iter()
        .map(|l| l.vector)
        .collect();

    let mut group = c.benchmark_group("nearest_labels_10k");
    for metric in DistanceMetric::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(metric), &metric, |b, &metric| {
            b.iter(|| {
                let _ = nearest_labels(black_box(&candidates), black_box(&queries), 10, metric);
            })
        });
    }
    group.finish();
}

fn benchmark_store(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let labels = random_labels(&mut rng, 5_000);
    let dir = tempfile::tempdir().expect("tempdir");
    write_store(dir.path(), &labels).expect("write store");
    let store = VectorStore::open(dir.path()).expect("open store");

    c.bench_function("store_lookup", |b| {
        b.iter(|| {
            let _ = store.lookup(black_box("term_4321"));
        })
    });

    // A typical classifier output: ten tags, a couple unknown to the store.
    let tags: Vec<ConfidenceTag> = (0..10)
        .map(|i| {
            let term = if i % 5 == 4 {
                format!("unknown_{i}")
            } else {
                format!("term_{}", i * 97)
            };
            ConfidenceTag::new(term, 1.0 / (i + 1) as f32)
        })
        .collect();

    c.bench_function("embed_image_10_tags", |b| {
        b.iter(|| {
            let _ = ImageEmbedder::embed(black_box(&tags), &store);
        })
    });
}

criterion_group!(benches, benchmark_nearest_labels, benchmark_store);
criterion_main!(benches);
