//! # Merkle Benchmarks
//!
//! Every block builds a fixed 256-leaf tree, whatever its slot count, so
//! build cost is flat in the number of transactions. Proofs are depth 8.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use pc_01_merkle::MerkleTree;
use rand::Rng;
use shared_types::BLOCK_CAPACITY;

fn random_leaves(count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| (0..162).map(|_| rng.gen()).collect())
        .collect()
}

/// Tree construction for partially and fully filled blocks.
pub fn bench_build_fixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-01-merkle-build");
    for filled in [1usize, 16, 128, BLOCK_CAPACITY] {
        let leaves = random_leaves(filled);
        group.throughput(Throughput::Elements(filled as u64));
        group.bench_with_input(BenchmarkId::from_parameter(filled), &leaves, |b, leaves| {
            b.iter(|| MerkleTree::build_fixed(black_box(leaves), BLOCK_CAPACITY))
        });
    }
    group.finish();
}

/// Proof extraction and verification against the root.
pub fn bench_proofs(c: &mut Criterion) {
    let leaves = random_leaves(BLOCK_CAPACITY);
    let tree = match MerkleTree::build_fixed(&leaves, BLOCK_CAPACITY) {
        Ok(tree) => tree,
        Err(e) => panic!("fixed tree over full block: {}", e),
    };
    let root = tree.root();

    let mut group = c.benchmark_group("pc-01-merkle-proof");
    group.bench_function("extract", |b| {
        b.iter(|| tree.proof(black_box(137)))
    });

    let proof = match tree.proof(137) {
        Ok(proof) => proof,
        Err(e) => panic!("proof of a filled slot: {}", e),
    };
    group.bench_function("verify_preimage", |b| {
        b.iter(|| proof.verify_preimage(black_box(&leaves[137]), &root))
    });
    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_build_fixed(c);
    bench_proofs(c);
}
