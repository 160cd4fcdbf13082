//! Brute-force scan benchmark: similarity search + version resolution.
//! Measures QPS of the exact top-k scan over a synthetic corpus where every
//! SOP exists in several revisions.
//!
//! Usage: cargo bench --bench search_scan

use std::hint::black_box;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sopindex_core::{similarity_search, DocumentRecord, VectorIndex, VersionResolver};

const DOCUMENTS: usize = 2_000;
const REVISIONS: usize = 3;
const DIMENSION: usize = 384;
const QUERIES: usize = 200;
const K: usize = 8;

fn random_vector(rng: &mut StdRng) -> Vec<f32> {
    (0..DIMENSION).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);

    let build_start = Instant::now();
    let mut vectors = Vec::with_capacity(DOCUMENTS * REVISIONS);
    let mut records = Vec::with_capacity(DOCUMENTS * REVISIONS);
    for doc in 0..DOCUMENTS {
        for rev in 0..REVISIONS {
            vectors.push(random_vector(&mut rng));
            records.push(
                DocumentRecord::new(format!("SOP-{doc:05}"), "synthetic body")
                    .with_version(format!("{}.0", rev + 1))
                    .with_effective_date(format!("202{}-01-15", rev + 1)),
            );
        }
    }
    let index = VectorIndex::from_parts(vectors, records).expect("valid synthetic index");
    println!(
        "Built index: {} vectors x {} dims in {:.1}ms",
        index.len(),
        index.dimension(),
        build_start.elapsed().as_secs_f64() * 1000.0
    );

    let queries: Vec<Vec<f32>> = (0..QUERIES).map(|_| random_vector(&mut rng)).collect();
    let resolver = VersionResolver::default();

    let start = Instant::now();
    let mut survivors = 0usize;
    for query in &queries {
        let candidates = similarity_search(&index, query, K).expect("search");
        survivors += resolver.resolve(black_box(&candidates)).len();
    }
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "{} queries, k={}: {:.1} QPS, {:.3}ms/query, avg {:.2} families after resolution",
        QUERIES,
        K,
        QUERIES as f64 / elapsed,
        elapsed * 1000.0 / QUERIES as f64,
        survivors as f64 / QUERIES as f64
    );
}
