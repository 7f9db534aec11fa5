use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use filecast::monitor::diff::file_diff;

fn lines(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("line number {i}")).collect()
}

fn bench_file_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_diff");
    for n in [10usize, 100, 500] {
        let old = lines(n);
        let mut new = old.clone();
        new[n / 2] = "changed".to_string();
        new.push("appended".to_string());

        group.bench_with_input(BenchmarkId::new("one_change", n), &n, |b, _| {
            b.iter(|| file_diff(black_box(Some(old.as_slice())), black_box(&new)))
        });
    }
    group.bench_function("first_seen", |b| {
        let current = lines(100);
        b.iter(|| file_diff(None, black_box(&current)))
    });
    group.finish();
}

criterion_group!(benches, bench_file_diff);
criterion_main!(benches);
