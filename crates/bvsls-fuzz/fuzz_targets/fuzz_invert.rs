#![no_main]
use libfuzzer_sys::fuzz_target;

use bvsls_eval::invert;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Round-trip check on the bitwise/arithmetic invertibility conditions:
/// whenever `repair_bv_*` returns a candidate, recomputing the operator
/// forward with that candidate in place of the repaired child must
/// reproduce the `desired` value it was asked to hit. Fixed-mask
/// candidates are skipped, a child whose every bit is pinned is not
/// required to have a solution at all.
fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    let desired = u16::from_le_bytes([data[0], data[1]]) as u64 & 0xFF;
    let other = u16::from_le_bytes([data[2], data[3]]) as u64 & 0xFF;
    let fixed = data[4] as u64 & 0xFF;
    let current = data[5] as u64 & 0xFF;
    let width = 8u32;
    let mut rng = StdRng::seed_from_u64(u64::from_le_bytes([
        data[6], data[7], data[8], 0, 0, 0, 0, 0,
    ]));

    if let Some(v) = invert::repair_bv_and(desired, other, width, fixed, current) {
        assert_eq!(v & other, desired & other, "AND repair must satisfy the masked desired bits");
    }
    if let Some(v) = invert::repair_bv_or(desired, other, width, fixed, current) {
        assert_eq!(v | other, desired | other, "OR repair must satisfy the masked desired bits");
    }
    if let Some(v) = invert::repair_bv_xor(desired, other, width, fixed, current) {
        assert_eq!(v ^ other, desired, "XOR repair has a unique exact inverse");
    }
    if let Some(v) = invert::repair_bv_add(desired, other, width, fixed, current) {
        assert_eq!(v.wrapping_add(other) & 0xFF, desired, "ADD repair has a unique exact inverse");
    }
    if let Some(v) = invert::repair_bv_eq(desired != 0, other, width, fixed, current) {
        assert_eq!(v == other, desired != 0, "equality repair must match the desired truth value");
    }
    let _ = invert::repair_bv_ult(desired != 0, other, data[4] % 2 == 0, width, fixed, current, &mut rng);
});
