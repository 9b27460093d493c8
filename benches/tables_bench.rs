use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;
use tiered_dict::tables::{Insert, Tables};
use tiered_dict::{DynProtocol, Value};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> Value<DynProtocol> {
    Value::from(format!("k{:016x}", n))
}

fn bench_insert_probe_vs_known_absent(c: &mut Criterion) {
    let p = DynProtocol;
    for (name, mode) in [
        ("tables::insert_probe_100k", Insert::Probe),
        ("tables::insert_known_absent_100k", Insert::KnownAbsent),
    ] {
        c.bench_function(name, |b| {
            b.iter_batched(
                Tables::<DynProtocol>::new,
                |mut t| {
                    for (i, x) in lcg(1).take(100_000).enumerate() {
                        let k = key(x);
                        let class = k.classify(&p).unwrap();
                        t.insert(k, class, Value::Int(i as i64), mode, &p).unwrap();
                    }
                    black_box(t)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_lookup_miss_10k(c: &mut Criterion) {
    let p = DynProtocol;
    let mut t = Tables::<DynProtocol>::with_capacity(100_000);
    for (i, x) in lcg(2).take(100_000).enumerate() {
        let k = key(x);
        let class = k.classify(&p).unwrap();
        t.insert(k, class, Value::Int(i as i64), Insert::Probe, &p).unwrap();
    }
    let probes: Vec<_> = lcg(3)
        .take(10_000)
        .map(|x| {
            let k = key(x);
            let class = k.classify(&p).unwrap();
            (k, class)
        })
        .collect();
    c.bench_function("tables::lookup_miss_10k", |b| {
        b.iter(|| {
            for (k, class) in &probes {
                black_box(t.lookup(k, class, &p).unwrap());
            }
        })
    });
}

fn bench_entries_100k(c: &mut Criterion) {
    let p = DynProtocol;
    let mut t = Tables::<DynProtocol>::new();
    for (i, x) in lcg(4).take(100_000).enumerate() {
        t.insert(Value::Int(x as i64), value_class(x), Value::Int(i as i64), Insert::Probe, &p)
            .unwrap();
    }
    c.bench_function("tables::entries_rank_order_100k", |b| {
        b.iter(|| black_box(t.entries()))
    });
}

fn value_class(x: u64) -> tiered_dict::KeyClass {
    tiered_dict::KeyClass::Int(x as i64)
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_probe_vs_known_absent, bench_lookup_miss_10k, bench_entries_100k
}
criterion_main!(benches);
