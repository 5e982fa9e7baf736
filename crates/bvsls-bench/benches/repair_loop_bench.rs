//! End-to-end repair loop throughput: moves/sec across a handful of
//! representative formulas, mirroring the teacher's per-subsystem
//! benchmark split (`malloc_bench`, `string_bench`, ...).

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use bvsls_core::{ConfigUpdate, Engine};
use bvsls_eval::RandomOracle;
use bvsls_term::Terms;

fn build_xor_chain(width: u32, depth: usize) -> Terms {
    let mut t = Terms::new();
    let x = t.mk_bv_var(width, "x");
    let mut acc = x;
    for i in 0..depth {
        let k = (0x9e37_79b9u64.wrapping_mul(i as u64 + 1)) & t.term(x).sort.mask();
        acc = t.mk_bv_xor(vec![acc, t.mk_bv_const(width, k)]);
    }
    t.assert(t.mk_bv_eq(acc, t.mk_bv_const(width, 0)));
    t
}

fn build_add_chain(width: u32, depth: usize) -> Terms {
    let mut t = Terms::new();
    let x = t.mk_bv_var(width, "x");
    let mut acc = x;
    for i in 0..depth {
        acc = t.mk_bv_add(vec![acc, t.mk_bv_const(width, i as u64 + 1)]);
    }
    t.assert(t.mk_bv_eq(acc, t.mk_bv_const(width, 0)));
    t
}

fn run_to_completion(mut terms: Terms, seed: u64) -> u64 {
    terms.init();
    let mut engine = Engine::new(terms);
    engine.updt_params(ConfigUpdate { random_seed: Some(seed), ..ConfigUpdate::default() }).unwrap();
    let mut oracle = RandomOracle::new(StdRng::seed_from_u64(seed));
    engine.init_eval(&mut oracle);
    engine.run();
    engine.stats().moves
}

fn bench_xor_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair_loop/xor_chain");
    for depth in [4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| criterion::black_box(run_to_completion(build_xor_chain(32, depth), 42)));
        });
    }
    group.finish();
}

fn bench_add_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair_loop/add_chain");
    for depth in [4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| criterion::black_box(run_to_completion(build_add_chain(32, depth), 42)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_xor_chain, bench_add_chain);
criterion_main!(benches);
