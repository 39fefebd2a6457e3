use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kchain_consensus::{config::TreeConfig, test_helpers::generate_random_tree, tree::BlockTree};
use rand::{SeedableRng, rngs::StdRng};

const BLOCKS: u64 = 10_000;

/// A single chain: every insertion moves the leader of every block in the tree
pub fn deep_chain_benchmark(c: &mut Criterion) {
    c.bench_function("insert deep chain", |b| {
        b.iter_batched(
            || BlockTree::with_config(TreeConfig::default().with_initial_capacity(BLOCKS as usize + 1)),
            |mut tree| {
                for id in 1..=BLOCKS {
                    black_box(tree.insert(id, id - 1).unwrap());
                }
                tree
            },
            BatchSize::LargeInput,
        )
    });
}

/// Random attachment points: most insertions stop after a few ancestors
pub fn bushy_tree_benchmark(c: &mut Criterion) {
    c.bench_function("insert bushy tree", |b| {
        b.iter_batched(|| StdRng::seed_from_u64(42), |mut rng| generate_random_tree(&mut rng, BLOCKS, 0.1), BatchSize::SmallInput)
    });
}

pub fn leader_query_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let tree = generate_random_tree(&mut rng, BLOCKS, 0.5);
    c.bench_function("leader query", |b| {
        b.iter(|| {
            for id in (0..=BLOCKS).step_by(97) {
                black_box(tree.leader(id).unwrap());
            }
        })
    });
}

criterion_group!(benches, deep_chain_benchmark, bushy_tree_benchmark, leader_query_benchmark);
criterion_main!(benches);
