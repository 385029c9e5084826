//! Query Engine Performance Benchmarks
//!
//! Measures the pure filter/sort/partition pass the task list re-runs on every
//! control change, and a repository round trip for comparison:
//! - neutral query over growing collections
//! - search plus category filter
//! - in-memory repository listing with a query

use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use taskdeck::query;
use taskdeck::{
    InMemoryTaskRepository, SortDirection, Task, TaskId, TaskQuery, TaskRepository,
};
use tokio::runtime::Runtime;

const CATEGORIES: [&str; 4] = ["Errands", "Work", "Home", "Study"];
const WORDS: [&str; 6] = ["Buy", "Call", "Write", "Fix", "Read", "Plan"];

fn sample_tasks(n: usize) -> Vec<Task> {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            // Scatter creation times so sorting has work to do.
            let offset = (i * 7919 % n.max(1)) as i64;
            let mut task = Task::new(
                TaskId::parse(format!("01012025-b{:06}", i)).unwrap(),
                format!("{} item {}", WORDS[i % WORDS.len()], i),
                CATEGORIES[i % CATEGORIES.len()],
                base + Duration::seconds(offset),
            );
            task.completed = i % 3 == 0;
            task
        })
        .collect()
}

/// Benchmark the neutral query: no filter, sort only
fn bench_neutral_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_neutral");

    for size in [100usize, 1_000, 10_000] {
        let tasks = sample_tasks(size);
        let query = TaskQuery::new();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &tasks, |b, tasks| {
            b.iter(|| black_box(query::apply(black_box(tasks), &query)))
        });
    }

    group.finish();
}

/// Benchmark search plus category filter in both directions
fn bench_filtered_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_filtered");
    let tasks = sample_tasks(5_000);

    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let query = TaskQuery::new()
            .with_search("buy")
            .with_category("Errands")
            .with_direction(direction);

        group.bench_function(direction.to_string(), |b| {
            b.iter(|| black_box(query::filter_and_sort(black_box(&tasks), &query)))
        });
    }

    group.finish();
}

/// Benchmark listing through the in-memory repository
fn bench_repository_list(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let repo = InMemoryTaskRepository::with_tasks(sample_tasks(5_000));
    let query = TaskQuery::new().with_search("item 4");

    c.bench_function("in_memory_list_with_query", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(repo.list(Some(&query)).await.unwrap()) })
    });
}

criterion_group!(
    benches,
    bench_neutral_query,
    bench_filtered_query,
    bench_repository_list
);
criterion_main!(benches);
