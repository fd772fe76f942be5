//! Benchmarks for parsing, filtering, branch walking and rendering.
//!
//! Run with: `cargo bench`

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use deepseek_reader::branch::{rewalk_branch, walk_conversation, BranchSelector, NodeStore};
use deepseek_reader::model::Conversation;
use deepseek_reader::parser::parse_str;
use deepseek_reader::render::{DocumentRenderer, RenderOptions, Theme};
use deepseek_reader::search::{filter, DateRange, SortOrder};

#[path = "../tests/generators/mod.rs"]
mod generators;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [10, 100, 1000] {
        let values: Vec<_> = (0..size)
            .map(|i| {
                generators::conversation_value(&generators::ConversationConfig {
                    id: format!("conv-{i:05}"),
                    parents: vec![0, 1, 1, 3],
                    ..generators::ConversationConfig::default()
                })
            })
            .collect();
        let data = serde_json::Value::Array(values).to_string();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_str", size), &data, |b, data| {
            b.iter(|| black_box(parse_str(data)));
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [100, 1000, 10000] {
        let conversations: Vec<Arc<Conversation>> = generators::many(size, &[0, 1, 1])
            .into_iter()
            .map(Arc::new)
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("title", size), &conversations, |b, list| {
            b.iter(|| black_box(filter(list, "python", DateRange::default()).len()));
        });
        group.bench_with_input(BenchmarkId::new("content", size), &conversations, |b, list| {
            b.iter(|| black_box(filter(list, "keyword7", DateRange::default()).len()));
        });
        group.bench_with_input(BenchmarkId::new("sort_title", size), &conversations, |b, list| {
            b.iter(|| {
                let mut sorted = list.clone();
                SortOrder::Title.sort(&mut sorted);
                black_box(sorted)
            });
        });
    }

    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");

    for (depth, fan_out) in [(4, 2), (6, 3), (3, 10)] {
        let conversation = generators::tree(&generators::balanced_parents(depth, fan_out));
        let label = format!("{depth}x{fan_out}");

        group.bench_with_input(BenchmarkId::new("fresh", &label), &conversation, |b, conversation| {
            let store = NodeStore::new(&conversation.mapping);
            b.iter(|| {
                let mut selector = BranchSelector::new();
                black_box(walk_conversation(&store, &mut selector))
            });
        });

        group.bench_with_input(BenchmarkId::new("rewalk_top", &label), &conversation, |b, conversation| {
            let store = NodeStore::new(&conversation.mapping);
            let mut selector = BranchSelector::new();
            let mut path = walk_conversation(&store, &mut selector);
            let Some(top) = path.branch_points().first().map(|bp| bp.identity.clone()) else {
                return;
            };
            b.iter(|| {
                if !selector.next(&top) {
                    selector.set_selected(&top, 0);
                }
                black_box(rewalk_branch(&store, &mut path, &top, &mut selector))
            });
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let conversation = generators::tree(&generators::balanced_parents(5, 2));
    let store = NodeStore::new(&conversation.mapping);
    let mut selector = BranchSelector::new();
    let path = walk_conversation(&store, &mut selector);

    c.bench_function("render/uncached", |b| {
        b.iter(|| {
            let mut renderer = DocumentRenderer::new(Theme::default(), RenderOptions::default());
            renderer.set_query("answer");
            black_box(renderer.render(&conversation, &path, None).lines.len())
        });
    });

    c.bench_function("render/cached", |b| {
        let mut renderer = DocumentRenderer::new(Theme::default(), RenderOptions::default());
        renderer.set_query("answer");
        b.iter(|| black_box(renderer.render(&conversation, &path, None).lines.len()));
    });
}

criterion_group!(benches, bench_parse, bench_filter, bench_walk, bench_render);
criterion_main!(benches);
