//! The initial-bit capability consumed by `init_eval`/`reinit_eval`.
//!
//! Spec §9 design notes: "expose the oracle as a capability `(node,
//! bit_index) -> bool`... do not bake the 98/2 split into the Evaluator
//! itself." [`Oracle`] is that capability; [`RandomOracle`] and
//! [`KeepMostlyOracle`] are the two instances the engine needs (a fresh
//! random start, and a restart that keeps most of the prior assignment).

use bvsls_term::NodeId;
use rand::Rng;

/// Supplies one bit of a fresh assignment for `(node, bit_index)`.
/// Boolean nodes are always queried with `bit_index == 0`.
pub trait Oracle {
    fn bit(&mut self, n: NodeId, bit_index: u32) -> bool;
}

/// Uniform-random assignment, used for the very first `init_eval`.
pub struct RandomOracle<R> {
    rng: R,
}

impl<R: Rng> RandomOracle<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Oracle for RandomOracle<R> {
    fn bit(&mut self, _n: NodeId, _bit_index: u32) -> bool {
        self.rng.gen_bool(0.5)
    }
}

/// Restart oracle (spec §4.4 step 2): fixed bits keep their fixed value,
/// unfixed bits keep the prior assignment with probability `p_keep` and
/// are otherwise randomized. Built from a snapshot of the prior value
/// state so it has no live dependency on the `Evaluator` being rebuilt.
pub struct KeepMostlyOracle<R> {
    prev_bits0: Vec<u64>,
    prev_fixed: Vec<u64>,
    p_keep: f64,
    rng: R,
}

impl<R: Rng> KeepMostlyOracle<R> {
    pub fn new(prev_bits0: Vec<u64>, prev_fixed: Vec<u64>, p_keep: f64, rng: R) -> Self {
        Self { prev_bits0, prev_fixed, p_keep, rng }
    }
}

impl<R: Rng> Oracle for KeepMostlyOracle<R> {
    fn bit(&mut self, n: NodeId, bit_index: u32) -> bool {
        let idx = n.index();
        let fixed = self.prev_fixed.get(idx).copied().unwrap_or(0);
        let prior = self.prev_bits0.get(idx).copied().unwrap_or(0);
        if fixed & (1u64 << bit_index) != 0 {
            return prior & (1u64 << bit_index) != 0;
        }
        if self.rng.gen_bool(self.p_keep) {
            prior & (1u64 << bit_index) != 0
        } else {
            self.rng.gen_bool(0.5)
        }
    }
}
