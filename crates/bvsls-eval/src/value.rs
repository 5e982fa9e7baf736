//! Per-node value state (spec §3 "Value state"): `val0`/`val1` and the
//! `fixed` mask, kept in side tables indexed by [`bvsls_term::NodeId`]
//! rather than inline on the node, so `bvsls-term`'s arena stays small.

use bvsls_term::NodeId;

/// Owns every node's current (`val0`) and recomputed-from-children
/// (`val1`) value, plus the bits/bit the problem statement fixes.
///
/// Boolean nodes use only index 0 of the bit-vector-shaped storage
/// (`bits0`/`bits1`/`fixed` hold a single-bit value in their low bit);
/// this keeps one array family instead of duplicating storage per sort,
/// matching the teacher's preference for one side table per concern
/// (`frankenlibc-core`'s `MallocState` keeps one `HashMap` per concern
/// rather than per size class).
#[derive(Debug, Clone)]
pub struct ValueState {
    bits0: Vec<u64>,
    bits1: Vec<u64>,
    fixed: Vec<u64>,
    /// The value each fixed bit was locked to, recorded once by
    /// [`ValueState::lock_bits`] and never touched again. Kept separate
    /// from `bits0` so a debug-build invariant check (spec §8's I1,
    /// "fixed bits never change") has something independent to compare
    /// the live value against.
    locked: Vec<u64>,
    eval1_valid: Vec<bool>,
}

impl ValueState {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            bits0: vec![0; num_nodes],
            bits1: vec![0; num_nodes],
            fixed: vec![0; num_nodes],
            locked: vec![0; num_nodes],
            eval1_valid: vec![false; num_nodes],
        }
    }

    pub fn len(&self) -> usize {
        self.bits0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits0.is_empty()
    }

    #[inline]
    pub fn bval0(&self, n: NodeId) -> bool {
        self.bits0[n.index()] & 1 != 0
    }

    #[inline]
    pub fn bval1(&self, n: NodeId) -> bool {
        self.bits1[n.index()] & 1 != 0
    }

    #[inline]
    pub fn wval0(&self, n: NodeId) -> u64 {
        self.bits0[n.index()]
    }

    #[inline]
    pub fn wval1(&self, n: NodeId) -> u64 {
        self.bits1[n.index()]
    }

    pub fn set_bval0(&mut self, n: NodeId, v: bool) {
        self.bits0[n.index()] = v as u64;
    }

    pub fn set_wval0(&mut self, n: NodeId, v: u64) {
        self.bits0[n.index()] = v;
    }

    pub fn set_bval1(&mut self, n: NodeId, v: bool) {
        self.bits1[n.index()] = v as u64;
        self.eval1_valid[n.index()] = true;
    }

    pub fn set_wval1(&mut self, n: NodeId, v: u64) {
        self.bits1[n.index()] = v;
        self.eval1_valid[n.index()] = true;
    }

    pub fn is_fixed0(&self, n: NodeId) -> bool {
        self.fixed[n.index()] & 1 != 0
    }

    pub fn fixed_mask(&self, n: NodeId) -> u64 {
        self.fixed[n.index()]
    }

    /// The value `n`'s fixed bits were locked to (spec I1's "the fixed
    /// value"); bits outside the fixed mask are meaningless.
    pub fn locked_value(&self, n: NodeId) -> u64 {
        self.locked[n.index()]
    }

    /// Fix `mask`'s bits of `n` to `value` and write that value into
    /// `bits0` immediately: fixedness and the current value must agree
    /// the instant a bit becomes fixed (spec I1). Idempotent-safe: OR
    /// additional fixed bits in rather than clearing any that were
    /// already fixed (fixedness only ever grows during `init_fixed`'s
    /// propagation).
    pub fn lock_bits(&mut self, n: NodeId, mask: u64, value: u64) {
        let idx = n.index();
        self.fixed[idx] |= mask;
        self.locked[idx] = (self.locked[idx] & !mask) | (value & mask);
        self.bits0[idx] = (self.bits0[idx] & !mask) | (value & mask);
    }

    pub fn can_eval1(&self, n: NodeId) -> bool {
        self.eval1_valid[n.index()]
    }

    /// Raw current-value array, used only to build a restart snapshot
    /// (see [`crate::oracle::KeepMostlyOracle`]).
    pub fn bits0_raw(&self) -> &[u64] {
        &self.bits0
    }

    /// Raw fixed-mask array, used only to build a restart snapshot.
    pub fn fixed_raw(&self) -> &[u64] {
        &self.fixed
    }

    pub fn reset(&mut self, num_nodes: usize) {
        self.bits0 = vec![0; num_nodes];
        self.bits1 = vec![0; num_nodes];
        self.fixed = vec![0; num_nodes];
        self.locked = vec![0; num_nodes];
        self.eval1_valid = vec![false; num_nodes];
    }
}
