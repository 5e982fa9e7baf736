#![no_main]
use libfuzzer_sys::fuzz_target;

use bvsls_core::{ConfigUpdate, Engine};
use bvsls_eval::RandomOracle;
use bvsls_term::{NodeId, Terms};
use rand::SeedableRng;
use rand::rngs::StdRng;

const WIDTH: u32 = 8;

/// Builds a small random DAG from fuzzer bytes: each byte picks an
/// operator and indices into a growing stack of already-built node ids,
/// then a final assertion ties two of them together. Exercises the
/// scheduler's robustness (no panics, no infinite loop beyond the move
/// budget) over arbitrary shared-subterm shapes, not any particular
/// formula's satisfiability.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let mut t = Terms::new();
    let x = t.mk_bv_var(WIDTH, "x");
    let mut stack: Vec<NodeId> = vec![x, t.mk_bv_const(WIDTH, data[0] as u64)];

    for &byte in &data[1..data.len() - 4] {
        if stack.len() < 2 {
            break;
        }
        let a = stack[byte as usize % stack.len()];
        let b = stack[(byte as usize / 2) % stack.len()];
        let node = match byte % 6 {
            0 => t.mk_bv_and(vec![a, b]),
            1 => t.mk_bv_or(vec![a, b]),
            2 => t.mk_bv_xor(vec![a, b]),
            3 => t.mk_bv_add(vec![a, b]),
            4 => t.mk_bv_sub(a, b),
            _ => t.mk_bv_not(a),
        };
        stack.push(node);
        if stack.len() > 64 {
            break;
        }
    }

    let tail = &data[data.len() - 4..];
    let target = t.mk_bv_const(WIDTH, u32::from_le_bytes(tail.try_into().unwrap()) as u64);
    let root = stack[stack.len() - 1];
    t.assert(t.mk_bv_eq(root, target));
    t.init();

    let mut engine = Engine::new(t);
    engine.updt_params(ConfigUpdate { max_repairs: Some(5_000), ..ConfigUpdate::default() }).unwrap();
    let mut oracle = RandomOracle::new(StdRng::seed_from_u64(u64::from_le_bytes(
        data[..8].try_into().unwrap(),
    )));
    engine.init_eval(&mut oracle);
    let _ = engine.run();
});
