//! Invertibility conditions for the §3.2 operator set.
//!
//! Each function answers: "given the parent wants `desired` and every
//! child other than `i` is held at its current `val0`, is there a value
//! for child `i` that makes the parent compute `desired`, and if so,
//! which one should we pick?" Picking also has to respect the child's
//! `fixed` mask (I1): a solution that disagrees with a fixed bit is not
//! a solution at all.
//!
//! These are deliberately simple, single-candidate inverses rather than a
//! full interval-based solver: each operator either has a unique inverse
//! (XOR, ADD, SUB, NOT, NEG) or a side condition plus one canonical
//! candidate with free bits filled from the child's current value (AND,
//! OR, shifts, equality, unsigned less-than). This mirrors the "pick one
//! feasible repair, don't enumerate" spirit of spec §4.2's `try_repair`
//! without reproducing a production solver's full IC catalogue (see
//! SPEC_FULL.md §3.2).

use rand::Rng;

/// Bits of `value` outside the low `width` are never meaningful; callers
/// mask to this before storing.
pub(crate) fn mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

/// Fill `candidate`'s bits that are not pinned by `fixed` with bits taken
/// from `free_fill` (used to keep a minimal diff from the current value),
/// then verify the pinned bits of `fixed` still agree with `candidate`
/// before fixing was applied. Returns `None` if the pinned bits conflict.
fn apply_fixed(candidate: u64, fixed: u64, current: u64, width: u32) -> Option<u64> {
    if (candidate ^ current) & fixed & mask(width) != 0 {
        return None;
    }
    Some((candidate & !fixed | current & fixed) & mask(width))
}

// -- Boolean connectives ----------------------------------------------------

/// `not a = desired` => `a = !desired`. Always invertible; "fixed" here is
/// just the single-bit mask (bit 0).
pub fn repair_bool_not(desired: bool, child_current: bool, child_fixed: bool) -> Option<bool> {
    if child_fixed {
        return (child_current == !desired).then_some(child_current);
    }
    Some(!desired)
}

/// `and(children) = desired`, repairing child `i`. If desired is true,
/// every other child must already be true. If desired is false, setting
/// this child to false always suffices.
pub fn repair_bool_and(
    desired: bool,
    others_all_true: bool,
    child_fixed: bool,
    child_current: bool,
) -> Option<bool> {
    let candidate = if desired { others_all_true.then_some(true)? } else { false };
    if child_fixed {
        return (child_current == candidate).then_some(child_current);
    }
    Some(candidate)
}

/// `or(children) = desired`, repairing child `i`. Dual of AND: if desired
/// is false every other child must already be false; if true, setting
/// this child true always suffices.
pub fn repair_bool_or(
    desired: bool,
    others_all_false: bool,
    child_fixed: bool,
    child_current: bool,
) -> Option<bool> {
    let candidate = if !desired { others_all_false.then_some(false)? } else { true };
    if child_fixed {
        return (child_current == candidate).then_some(child_current);
    }
    Some(candidate)
}

/// `xor(children) = desired`, repairing child `i`. Unique solution:
/// `child = desired xor (xor of the other children)`.
pub fn repair_bool_xor(desired: bool, others_xor: bool, child_fixed: bool, child_current: bool) -> Option<bool> {
    let candidate = desired ^ others_xor;
    if child_fixed {
        return (child_current == candidate).then_some(child_current);
    }
    Some(candidate)
}

// -- Bit-vector bitwise / arithmetic -----------------------------------------

pub fn repair_bv_not(desired: u64, width: u32, child_fixed: u64, child_current: u64) -> Option<u64> {
    apply_fixed(!desired & mask(width), child_fixed, child_current, width)
}

pub fn repair_bv_neg(desired: u64, width: u32, child_fixed: u64, child_current: u64) -> Option<u64> {
    let candidate = desired.wrapping_neg() & mask(width);
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `and(children) = desired`, repairing child `i`. IC: `desired`'s 1-bits
/// must be a subset of the AND of the other children. Free bits (where
/// `others_and` is 0) are filled from the child's current value.
pub fn repair_bv_and(
    desired: u64,
    others_and: u64,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let m = mask(width);
    if desired & !others_and & m != 0 {
        return None;
    }
    let candidate = (desired & others_and) | (!others_and & child_current) & m;
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `or(children) = desired`, repairing child `i`. Dual of AND.
pub fn repair_bv_or(
    desired: u64,
    others_or: u64,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let m = mask(width);
    if others_or & !desired & m != 0 {
        return None;
    }
    let candidate = (desired & !others_or) | (others_or & child_current) & m;
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `xor(children) = desired`, repairing child `i`. Unique solution.
pub fn repair_bv_xor(
    desired: u64,
    others_xor: u64,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let candidate = (desired ^ others_xor) & mask(width);
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `add(children) = desired`, repairing child `i`. Unique solution:
/// `child = desired - (sum of the other children)`, mod `2^width`.
pub fn repair_bv_add(
    desired: u64,
    others_sum: u64,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let candidate = desired.wrapping_sub(others_sum) & mask(width);
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `a - b = desired`. `i == 0` solves for `a = desired + b`; `i == 1`
/// solves for `b = a - desired`. Both unique.
pub fn repair_bv_sub(
    desired: u64,
    other: u64,
    is_lhs: bool,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let candidate =
        if is_lhs { desired.wrapping_add(other) } else { other.wrapping_sub(desired) } & mask(width);
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `a << b = desired`, repairing the shifted operand `a` (shift-amount
/// repair is a documented non-goal, see SPEC_FULL.md's "shift
/// invertibility" open question). If `b >= width` the result is always
/// zero regardless of `a`; otherwise `desired`'s low `b` bits must be
/// zero and the candidate's top `b` bits (shifted out, so don't-care)
/// are filled from `a`'s current value.
pub fn repair_bv_shl(
    desired: u64,
    shift: u64,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let m = mask(width);
    if shift >= width as u64 {
        return (desired & m == 0).then_some(child_current & m);
    }
    let shift = shift as u32;
    if desired & ((1u64 << shift) - 1) != 0 {
        return None;
    }
    let low = (desired >> shift) & mask(width - shift);
    let high_keep = child_current & (m ^ mask(width - shift));
    let candidate = (low | high_keep) & m;
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `a >> b = desired` (logical), repairing the shifted operand `a`. Dual
/// of `shl`: the low `b` bits of `a` are shifted out (don't-care), the
/// remaining top bits must equal `desired`.
pub fn repair_bv_lshr(
    desired: u64,
    shift: u64,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let m = mask(width);
    if shift >= width as u64 {
        return (desired & m == 0).then_some(child_current & m);
    }
    let shift = shift as u32;
    let high_bits = width - shift;
    if desired & !mask(high_bits) & m != 0 {
        return None;
    }
    let high = (desired << shift) & m;
    let low_keep = child_current & mask(shift);
    let candidate = (high | low_keep) & m;
    apply_fixed(candidate, child_fixed, child_current, width)
}

// -- Predicates ---------------------------------------------------------------

/// `a = b` evaluates to `desired`, repairing one side given the other's
/// current value. If `desired` is true the candidate is simply `other`.
/// If `desired` is false, any value `!= other` that agrees with the
/// fixed mask works; we flip the lowest free bit of `other`, or fail if
/// every bit is fixed.
pub fn repair_bv_eq(
    desired: bool,
    other: u64,
    width: u32,
    child_fixed: u64,
    child_current: u64,
) -> Option<u64> {
    let m = mask(width);
    if desired {
        return apply_fixed(other & m, child_fixed, child_current, width);
    }
    let free = !child_fixed & m;
    if free == 0 {
        return (child_current & m != other & m).then_some(child_current & m);
    }
    let flip_bit = free.trailing_zeros();
    let candidate = (other ^ (1u64 << flip_bit)) & m;
    apply_fixed(candidate, child_fixed, child_current, width)
}

/// `a < b` (unsigned) evaluates to `desired`, repairing side `i`. Finds a
/// value in the feasible range honoring the fixed mask, trying the
/// child's current value first (minimal diff), then the range endpoints,
/// then a bounded random search over the free bits.
pub fn repair_bv_ult(
    desired: bool,
    other: u64,
    is_lhs: bool,
    width: u32,
    child_fixed: u64,
    child_current: u64,
    rng: &mut impl Rng,
) -> Option<u64> {
    let m = mask(width);
    let other = other & m;
    // `other` is the operand *not* being repaired. Four cases, depending
    // on which side is repaired and the desired truth value of `a < b`.
    let (lo, hi): (u64, u64) = match (is_lhs, desired) {
        // repairing a, want a < other => [0, other-1]
        (true, true) => (0, other.checked_sub(1)?),
        // repairing a, want a >= other => [other, max]
        (true, false) => (other, m),
        // repairing b, want other < b => [other+1, max]
        (false, true) => (other.checked_add(1).filter(|v| *v <= m)?, m),
        // repairing b, want b <= other => [0, other]
        (false, false) => (0, other),
    };
    if lo > hi {
        return None;
    }
    let candidates = [child_current & m, lo, hi];
    for cand in candidates {
        if (lo..=hi).contains(&cand)
            && let Some(v) = apply_fixed(cand, child_fixed, child_current, width)
            && (lo..=hi).contains(&v)
        {
            return Some(v);
        }
    }
    for _ in 0..32 {
        let span = hi - lo;
        let r = if span == u64::MAX { rng.r#gen::<u64>() } else { lo + rng.gen_range(0..=span) };
        if let Some(v) = apply_fixed(r, child_fixed, child_current, width)
            && (lo..=hi).contains(&v)
        {
            return Some(v);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn not_is_always_invertible() {
        assert_eq!(repair_bool_not(true, false, false), Some(false));
        assert_eq!(repair_bool_not(false, true, false), Some(true));
    }

    #[test]
    fn add_solves_for_missing_addend() {
        // x + 1 = 5 (4-bit): child 0 is x, other is the constant 1.
        let candidate = repair_bv_add(5, 1, 4, 0, 0).unwrap();
        assert_eq!(candidate, 4);
    }

    #[test]
    fn xor_has_unique_inverse() {
        let candidate = repair_bv_xor(0xABu64, 0x0Fu64, 8, 0, 0).unwrap();
        assert_eq!(candidate ^ 0x0F, 0xAB);
    }

    #[test]
    fn and_rejects_infeasible_desired() {
        // others_and = 0b00, desired = 0b01 is infeasible: no child bit can
        // make the AND produce a 1 where every other child is already 0.
        assert_eq!(repair_bv_and(0b01, 0b00, 2, 0, 0), None);
    }

    #[test]
    fn and_fills_free_bits_from_current_value() {
        let candidate = repair_bv_and(0b10, 0b11, 2, 0, 0b01).unwrap();
        // bit 1 must be 1 (others_and has it set); bit 0 is free, filled
        // from child_current (0b01 -> bit 0 = 1).
        assert_eq!(candidate, 0b11);
    }

    #[test]
    fn eq_true_copies_other_side() {
        assert_eq!(repair_bv_eq(true, 7, 4, 0, 0), Some(7));
    }

    #[test]
    fn eq_false_picks_a_different_value() {
        let candidate = repair_bv_eq(false, 7, 4, 0, 7).unwrap();
        assert_ne!(candidate, 7);
    }

    #[test]
    fn eq_false_infeasible_when_fully_fixed_and_equal() {
        assert_eq!(repair_bv_eq(false, 7, 4, 0b1111, 7), None);
    }

    #[test]
    fn ult_lhs_true_picks_value_below_other() {
        let mut rng = StdRng::seed_from_u64(1);
        let v = repair_bv_ult(true, 5, true, 4, 0, 2, &mut rng).unwrap();
        assert!(v < 5);
    }

    #[test]
    fn ult_rhs_false_picks_value_at_most_other() {
        let mut rng = StdRng::seed_from_u64(1);
        let v = repair_bv_ult(false, 5, false, 4, 0, 9, &mut rng).unwrap();
        assert!(v <= 5);
    }

    #[test]
    fn shl_low_bits_must_be_zero() {
        // desired has a 1 in a bit position that would be shifted out.
        assert_eq!(repair_bv_shl(0b0001, 2, 4, 0, 0), None);
    }

    #[test]
    fn shl_solves_when_low_bits_clear() {
        let candidate = repair_bv_shl(0b1000, 2, 4, 0, 0).unwrap();
        assert_eq!((candidate << 2) & 0xF, 0b1000);
    }
}
