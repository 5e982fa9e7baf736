//! Microbenchmarks for `RepairSet`'s insert/remove/pick operations in
//! isolation from the rest of the engine.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use bvsls_core::RepairSet;
use bvsls_term::NodeId;

fn bench_insert_remove_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair_set/insert_remove_cycle");
    for &n in &[16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut set = RepairSet::new();
                for i in 0..n as u32 {
                    set.insert(NodeId(i));
                }
                for i in 0..n as u32 {
                    set.remove(NodeId(i));
                }
                criterion::black_box(&set);
            });
        });
    }
    group.finish();
}

fn bench_random_pick(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair_set/random_pick");
    for &n in &[16usize, 256, 4096] {
        let mut set = RepairSet::new();
        for i in 0..n as u32 {
            set.insert(NodeId(i));
        }
        let mut rng = StdRng::seed_from_u64(1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| criterion::black_box(set.pick(&mut rng)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert_remove_cycle, bench_random_pick);
criterion_main!(benches);
