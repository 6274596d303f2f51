//! Divide-and-conquer ranking benchmarks.
//!
//! Compares the full top-k pipeline (count, sort, truncate) with the
//! recursive maximum and the merge sort on pre-counted likes.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use tertulia_benches::{error::BenchSetupError, network::synthetic_likes, params::RankingBenchParams};
use tertulia_core::{PostLikes, count_likes_by_post, max_by_likes, sort_by_likes_desc, top_k};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 7;

/// `(likes, posts)` shapes to benchmark.
const SHAPES: &[(usize, u64)] = &[(1_000, 100), (100_000, 1_000), (100_000, 50_000)];

/// Posts kept by the top-k benchmark.
const TOP: usize = 10;

fn ranking_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("ranking");
    group.sample_size(20);

    for &(like_count, post_count) in SHAPES {
        let params = RankingBenchParams {
            like_count,
            post_count,
        };
        let likes = synthetic_likes(like_count, post_count, SEED)?;
        let counted: Vec<PostLikes> = count_likes_by_post(&likes)
            .into_iter()
            .map(|(post, total)| PostLikes::new(post, total))
            .collect();

        group.bench_with_input(BenchmarkId::new("top_k", &params), &likes, |b, likes| {
            b.iter(|| top_k(likes, TOP));
        });
        group.bench_with_input(BenchmarkId::new("sort_desc", &params), &counted, |b, counted| {
            b.iter(|| sort_by_likes_desc(counted));
        });
        group.bench_with_input(BenchmarkId::new("max", &params), &counted, |b, counted| {
            b.iter(|| max_by_likes(counted));
        });
    }

    group.finish();
    Ok(())
}

fn ranking(c: &mut Criterion) {
    if let Err(err) = ranking_impl(c) {
        panic!("ranking benchmark setup failed: {err}");
    }
}

criterion_group!(benches, ranking);
criterion_main!(benches);
