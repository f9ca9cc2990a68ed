use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rbcursor::{OrderedMap, OrderedSet, Rank, Sequence};
use std::collections::{BTreeMap, BTreeSet};
use std::hint::black_box;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_upsert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_upsert_random");

    group.bench_function(BenchmarkId::new("OrderedMap", N), |b| {
        b.iter(|| {
            let mut map = OrderedMap::new();
            for &k in &keys {
                map.upsert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let os_map: OrderedMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let mut group = c.benchmark_group("map_get_random");

    group.bench_function(BenchmarkId::new("OrderedMap", N), |b| {
        b.iter(|| {
            for k in &keys {
                black_box(os_map.get(k));
            }
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            for k in &keys {
                black_box(bt_map.get(k));
            }
        });
    });

    group.finish();
}

fn bench_map_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("OrderedMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<OrderedMap<i64, i64>>(),
            |mut map| {
                for k in &keys {
                    black_box(map.discard(k));
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for k in &keys {
                    black_box(map.remove(k));
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

// ─── Set Benchmarks ─────────────────────────────────────────────────────────

fn bench_set_insert_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let mut group = c.benchmark_group("set_insert_ordered");

    group.bench_function(BenchmarkId::new("OrderedSet", N), |b| {
        b.iter(|| {
            let mut set = OrderedSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

fn bench_set_iter(c: &mut Criterion) {
    let keys = random_keys(N);
    let os_set: OrderedSet<i64> = keys.iter().copied().collect();
    let bt_set: BTreeSet<i64> = keys.iter().copied().collect();
    let mut group = c.benchmark_group("set_iter");

    group.bench_function(BenchmarkId::new("OrderedSet", N), |b| {
        b.iter(|| os_set.iter().sum::<i64>());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| bt_set.iter().sum::<i64>());
    });

    group.finish();
}

fn bench_set_union(c: &mut Criterion) {
    let a: Vec<i64> = random_keys(N);
    let b: Vec<i64> = random_keys(2 * N).split_off(N);
    let (os_a, os_b): (OrderedSet<i64>, OrderedSet<i64>) = (a.iter().copied().collect(), b.iter().copied().collect());
    let (bt_a, bt_b): (BTreeSet<i64>, BTreeSet<i64>) = (a.iter().copied().collect(), b.iter().copied().collect());
    let mut group = c.benchmark_group("set_union");

    group.bench_function(BenchmarkId::new("OrderedSet", N), |bench| {
        bench.iter(|| &os_a | &os_b);
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |bench| {
        bench.iter(|| &bt_a | &bt_b);
    });

    group.finish();
}

// ─── Rank Benchmarks ────────────────────────────────────────────────────────

/// Positional access: cursor offsets and rank lookups against the linear walk a `BTreeSet` needs.
fn bench_rank_access(c: &mut Criterion) {
    let keys = random_keys(N);
    let os_set: OrderedSet<i64> = keys.iter().copied().collect();
    let bt_set: BTreeSet<i64> = keys.iter().copied().collect();
    let ranks: Vec<usize> = keys.iter().map(|&k| k.unsigned_abs() as usize % os_set.len()).take(1_000).collect();
    let mut group = c.benchmark_group("rank_access");

    group.bench_function(BenchmarkId::new("OrderedSet::cursor_offset", N), |b| {
        b.iter(|| {
            for &rank in &ranks {
                black_box((os_set.begin() + rank as isize).element().ok());
            }
        });
    });

    group.bench_function(BenchmarkId::new("OrderedSet::cursor_at", N), |b| {
        b.iter(|| {
            for &rank in &ranks {
                black_box(os_set.cursor_at(Rank(rank)).map(|cursor| cursor.element().ok()));
            }
        });
    });

    group.bench_function(BenchmarkId::new("OrderedSet::rank_of", N), |b| {
        b.iter(|| {
            for k in keys.iter().take(1_000) {
                black_box(os_set.rank_of(k));
            }
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet::iter_nth", N), |b| {
        b.iter(|| {
            for &rank in &ranks {
                black_box(bt_set.iter().nth(rank));
            }
        });
    });

    group.finish();
}

// ─── Sequence Benchmarks ────────────────────────────────────────────────────

fn bench_sequence_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_push");

    group.bench_function(BenchmarkId::new("Sequence", N), |b| {
        b.iter(|| {
            let mut sequence = Sequence::new();
            for i in 0..N as i64 {
                sequence.push(i);
            }
            sequence
        });
    });

    group.bench_function(BenchmarkId::new("Vec", N), |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for i in 0..N as i64 {
                vec.push(i);
            }
            vec
        });
    });

    group.finish();
}

fn bench_sequence_cursor_walk(c: &mut Criterion) {
    let sequence: Sequence<i64> = ordered_keys(N).into_iter().collect();
    let mut group = c.benchmark_group("sequence_cursor_walk");

    group.bench_function(BenchmarkId::new("Sequence::cursor", N), |b| {
        b.iter(|| {
            let mut cursor = sequence.begin();
            let mut sum = 0i64;
            while let Ok(value) = cursor.value() {
                sum += value;
                let _ = cursor.advance();
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("Sequence::iter", N), |b| {
        b.iter(|| sequence.iter().sum::<i64>());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_map_upsert_random,
    bench_map_get_random,
    bench_map_remove_random,
    bench_set_insert_ordered,
    bench_set_iter,
    bench_set_union,
    bench_rank_access,
    bench_sequence_push,
    bench_sequence_cursor_walk,
);
criterion_main!(benches);
