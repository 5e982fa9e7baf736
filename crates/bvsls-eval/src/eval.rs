//! The Evaluator (spec component C2): per-node `val0`/`val1`, fixed-bit
//! propagation, and invertibility-based local repair.
//!
//! `Evaluator` deliberately does not own a [`Terms`]: every method that
//! needs DAG structure takes `terms: &Terms` as a parameter (mirroring
//! spec §4.2's external-contract framing), which keeps `Engine` free to
//! own both side by side without a self-referential struct.

use bvsls_term::{Node, NodeId, Op, Sort, Terms};
use rand::Rng;

use crate::invert::{self, mask};
use crate::oracle::Oracle;
use crate::value::ValueState;

/// Value state, fixed-bit masks, and invertibility-based repair for one
/// search. Constructed fresh at `Engine::init_eval` and rebuilt (not
/// mutated in place) at every restart.
#[derive(Debug, Clone)]
pub struct Evaluator {
    state: ValueState,
}

impl Evaluator {
    pub fn new(terms: &Terms) -> Self {
        Self { state: ValueState::new(terms.len()) }
    }

    // -- reads --------------------------------------------------------------

    pub fn bval0(&self, n: NodeId) -> bool {
        self.state.bval0(n)
    }

    pub fn wval0(&self, n: NodeId) -> u64 {
        self.state.wval0(n)
    }

    /// Leaves have no children, so their recomputed value is defined to
    /// equal their current value; this makes a leaf trivially always
    /// "correct" and keeps repair pressure where it belongs: on internal
    /// nodes with something to recompute.
    pub fn bval1(&self, terms: &Terms, n: NodeId) -> bool {
        if terms.term(n).children.is_empty() { self.state.bval0(n) } else { self.state.bval1(n) }
    }

    pub fn wval1(&self, terms: &Terms, n: NodeId) -> u64 {
        if terms.term(n).children.is_empty() { self.state.wval0(n) } else { self.state.wval1(n) }
    }

    pub fn is_fixed0(&self, n: NodeId) -> bool {
        self.state.is_fixed0(n)
    }

    pub fn fixed_mask(&self, n: NodeId) -> u64 {
        self.state.fixed_mask(n)
    }

    /// The value `n`'s fixed bits were locked to at `init_fixed` time
    /// (spec I1's "the fixed value"); used by debug-build invariant
    /// checks to confirm those bits never drifted.
    pub fn locked_value(&self, n: NodeId) -> u64 {
        self.state.locked_value(n)
    }

    /// Snapshot of every node's current value and fixed mask, for
    /// building a [`crate::oracle::KeepMostlyOracle`] before a restart
    /// resets this Evaluator's state.
    pub fn snapshot(&self) -> (Vec<u64>, Vec<u64>) {
        (self.state.bits0_raw().to_vec(), self.state.fixed_raw().to_vec())
    }

    pub fn can_eval1(&self, terms: &Terms, n: NodeId) -> bool {
        terms.term(n).children.is_empty() || self.state.can_eval1(n)
    }

    /// Overwrite `n`'s current value (spec §4.2 `set`; used by the
    /// scheduler to push a false assertion's desired value to true).
    pub fn set(&mut self, n: NodeId, v: bool) {
        self.state.set_bval0(n, v);
    }

    // -- initialization -------------------------------------------------------

    /// Assign an initial `val0` to every node via `oracle` for leaves,
    /// computed bottom-up for internal nodes, then populate every node's
    /// `val1` (which, for a freshly derived internal node, trivially
    /// equals `val0`: nothing has diverged yet). Callers (first init and
    /// every restart alike) must follow this with [`Evaluator::init_fixed`]
    /// so fixed constants override whatever the oracle guessed for them.
    pub fn init_eval(&mut self, terms: &Terms, oracle: &mut dyn Oracle) {
        self.state.reset(terms.len());
        for id in terms.all_ids() {
            let node = terms.term(id);
            match &node.op {
                Op::BoolConst(v) => self.state.set_bval0(id, *v),
                Op::BvConst(v) => self.state.set_wval0(id, *v),
                Op::BoolVar(_) => {
                    let v = oracle.bit(id, 0);
                    self.state.set_bval0(id, v);
                }
                Op::BvVar(_) => {
                    let width = node.sort.width();
                    let mut v = 0u64;
                    for bit in 0..width {
                        if oracle.bit(id, bit) {
                            v |= 1u64 << bit;
                        }
                    }
                    self.state.set_wval0(id, v);
                }
                _ => {
                    if node.sort.is_bool() {
                        let v = eval_bool_from_children0(terms, &self.state, id);
                        self.state.set_bval0(id, v);
                    } else {
                        let v = eval_word_from_children0(terms, &self.state, id, node.sort.width());
                        self.state.set_wval0(id, v);
                    }
                }
            }
        }
        for id in terms.all_ids() {
            self.recompute_val1(terms, id);
        }
    }

    /// Derive the `fixed` mask by propagating hard constraints from
    /// asserted equalities: `assert(x = c)` (or `assert(not(x = c))` does
    /// *not* fix anything, only a positive equality against a fully
    /// evaluated other side does) fixes every bit of `x` that the other
    /// side pins down. This is intentionally a narrow, sound subset of
    /// what a production Evaluator would propagate (spec §4.2 leaves the
    /// details to the Evaluator); it is enough to realize spec §8's
    /// literal "fixed by construction" scenario (`x = 5`).
    ///
    /// Must run after [`Evaluator::init_eval`]: it overrides whatever the
    /// oracle guessed for now-fixed leaves, then re-derives every
    /// internal node's `val0`/`val1` bottom-up so the new leaf values are
    /// reflected everywhere above them (an assertion like `x = 5` must
    /// come out *true* once `x` is pinned to 5, not just once `x`'s bits
    /// are pinned).
    pub fn init_fixed(&mut self, terms: &Terms) {
        for &a in terms.assertions() {
            self.propagate_fixed_from_assertion(terms, a, true);
        }
        for id in terms.all_ids() {
            let node = terms.term(id);
            if node.children.is_empty() {
                continue;
            }
            if node.sort.is_bool() {
                let v = eval_bool_from_children0(terms, &self.state, id);
                self.state.set_bval0(id, v);
            } else {
                let v = eval_word_from_children0(terms, &self.state, id, node.sort.width());
                self.state.set_wval0(id, v);
            }
        }
        for id in terms.all_ids() {
            self.recompute_val1(terms, id);
        }
    }

    fn propagate_fixed_from_assertion(&mut self, terms: &Terms, n: NodeId, polarity: bool) {
        let node = terms.term(n);
        match &node.op {
            Op::Not => {
                self.propagate_fixed_from_assertion(terms, node.children[0], !polarity);
            }
            Op::And if polarity => {
                for &c in &node.children {
                    self.propagate_fixed_from_assertion(terms, c, true);
                }
            }
            Op::Or if !polarity => {
                for &c in &node.children {
                    self.propagate_fixed_from_assertion(terms, c, false);
                }
            }
            Op::BvEq if polarity => {
                self.fix_if_const(terms, node.children[0], node.children[1]);
                self.fix_if_const(terms, node.children[1], node.children[0]);
            }
            Op::BoolVar(_) if polarity => {
                self.state.lock_bits(n, 1, 1);
            }
            _ => {}
        }
    }

    /// If `other` is a constant, every bit of `var` (when `var` is itself
    /// a bare variable leaf) is fixed to that constant's value.
    fn fix_if_const(&mut self, terms: &Terms, var: NodeId, other: NodeId) {
        let var_node = terms.term(var);
        let other_node = terms.term(other);
        match (&var_node.op, &other_node.op) {
            (Op::BvVar(_), Op::BvConst(v)) => {
                self.state.lock_bits(var, mask(var_node.sort.width()), *v);
            }
            (Op::BoolVar(_), Op::BoolConst(v)) => {
                self.state.lock_bits(var, 1, *v as u64);
            }
            _ => {}
        }
    }

    // -- repair -----------------------------------------------------------------

    /// Recompute `n`'s `val1` from its children's current `val0` and
    /// store it. Leaves are skipped: their `val1` is defined on read
    /// (see `bval1`/`wval1`) and never cached.
    pub fn recompute_val1(&mut self, terms: &Terms, n: NodeId) {
        let node = terms.term(n);
        if node.children.is_empty() {
            return;
        }
        if node.sort.is_bool() {
            let v = eval_bool_from_children0(terms, &self.state, n);
            self.state.set_bval1(n, v);
        } else {
            let v = eval_word_from_children0(terms, &self.state, n, node.sort.width());
            self.state.set_wval1(n, v);
        }
    }

    /// Attempt to change `n.children[i]` so that `n`'s `val1` becomes its
    /// `val0`. On success, also refreshes `n`'s cached `val1` to reflect
    /// the new child (spec §4.2: "so that `n`'s `val1` becomes its
    /// `val0`" is the postcondition this call establishes, not just a
    /// side effect the scheduler has to trigger separately).
    pub fn try_repair(&mut self, terms: &Terms, n: NodeId, i: usize, rng: &mut impl Rng) -> bool {
        let node = terms.term(n);
        let child = node.children[i];
        let child_node = terms.term(child);
        let width = child_node.sort.width();
        let child_current = if child_node.sort.is_bool() {
            self.state.bval0(child) as u64
        } else {
            self.state.wval0(child)
        };
        let child_fixed =
            if child_node.sort.is_bool() { self.state.fixed_mask(child) & 1 } else { self.state.fixed_mask(child) };

        let new_val = self.invert_one(node, i, width, child_fixed, child_current, rng);

        match new_val {
            Some(v) if v != child_current => {
                if child_node.sort.is_bool() {
                    self.state.set_bval0(child, v != 0);
                } else {
                    self.state.set_wval0(child, v);
                }
                self.recompute_val1(terms, n);
                true
            }
            _ => false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn invert_one(
        &self,
        node: &Node,
        i: usize,
        width: u32,
        child_fixed: u64,
        child_current: u64,
        rng: &mut impl Rng,
    ) -> Option<u64> {
        let children = &node.children;
        let nth_bool = |k: usize| self.state.bval0(children[k]);
        let nth_word = |k: usize| self.state.wval0(children[k]);

        match &node.op {
            Op::Not => invert::repair_bool_not(self.state.bval0(node.id), child_current != 0, child_fixed != 0)
                .map(|b| b as u64),
            Op::And => {
                let others_all_true = children.iter().enumerate().all(|(k, _)| k == i || nth_bool(k));
                invert::repair_bool_and(
                    self.state.bval0(node.id),
                    others_all_true,
                    child_fixed != 0,
                    child_current != 0,
                )
                .map(|b| b as u64)
            }
            Op::Or => {
                let others_all_false = children.iter().enumerate().all(|(k, _)| k == i || !nth_bool(k));
                invert::repair_bool_or(
                    self.state.bval0(node.id),
                    others_all_false,
                    child_fixed != 0,
                    child_current != 0,
                )
                .map(|b| b as u64)
            }
            Op::Xor => {
                let others_xor =
                    children.iter().enumerate().fold(false, |acc, (k, _)| if k == i { acc } else { acc ^ nth_bool(k) });
                invert::repair_bool_xor(self.state.bval0(node.id), others_xor, child_fixed != 0, child_current != 0)
                    .map(|b| b as u64)
            }
            Op::BvNot => invert::repair_bv_not(self.state.wval0(node.id), width, child_fixed, child_current),
            Op::BvNeg => invert::repair_bv_neg(self.state.wval0(node.id), width, child_fixed, child_current),
            Op::BvAnd => {
                let others =
                    children.iter().enumerate().fold(mask(width), |acc, (k, _)| if k == i { acc } else { acc & nth_word(k) });
                invert::repair_bv_and(self.state.wval0(node.id), others, width, child_fixed, child_current)
            }
            Op::BvOr => {
                let others = children.iter().enumerate().fold(0u64, |acc, (k, _)| if k == i { acc } else { acc | nth_word(k) });
                invert::repair_bv_or(self.state.wval0(node.id), others, width, child_fixed, child_current)
            }
            Op::BvXor => {
                let others = children.iter().enumerate().fold(0u64, |acc, (k, _)| if k == i { acc } else { acc ^ nth_word(k) });
                invert::repair_bv_xor(self.state.wval0(node.id), others, width, child_fixed, child_current)
            }
            Op::BvAdd => {
                let others = children
                    .iter()
                    .enumerate()
                    .fold(0u64, |acc, (k, _)| if k == i { acc } else { acc.wrapping_add(nth_word(k)) });
                invert::repair_bv_add(self.state.wval0(node.id), others, width, child_fixed, child_current)
            }
            Op::BvSub => {
                let other = nth_word(1 - i);
                invert::repair_bv_sub(self.state.wval0(node.id), other, i == 0, width, child_fixed, child_current)
            }
            Op::BvShl => {
                if i == 1 {
                    None
                } else {
                    invert::repair_bv_shl(self.state.wval0(node.id), nth_word(1), width, child_fixed, child_current)
                }
            }
            Op::BvLshr => {
                if i == 1 {
                    None
                } else {
                    invert::repair_bv_lshr(self.state.wval0(node.id), nth_word(1), width, child_fixed, child_current)
                }
            }
            Op::BvEq => {
                let other = nth_word(1 - i);
                invert::repair_bv_eq(self.state.bval0(node.id), other, width, child_fixed, child_current)
            }
            Op::BvUlt => {
                let other = nth_word(1 - i);
                invert::repair_bv_ult(self.state.bval0(node.id), other, i == 0, width, child_fixed, child_current, rng)
            }
            op => unreachable!("leaf operator {op:?} has no children to repair"),
        }
    }

    /// Recompute `n`'s `val0` from children (set `val0 := val1`),
    /// leaving any of `n`'s own fixed bits untouched.
    pub fn repair_up(&mut self, terms: &Terms, n: NodeId) {
        let node = terms.term(n);
        self.recompute_val1(terms, n);
        if node.sort.is_bool() {
            if !self.state.is_fixed0(n) {
                self.state.set_bval0(n, self.state.bval1(n));
            }
        } else {
            let fixed = self.state.fixed_mask(n);
            let merged = (self.state.wval1(n) & !fixed) | (self.state.wval0(n) & fixed);
            self.state.set_wval0(n, merged);
        }
    }

    /// Topologically ordered (ascending node id, which is already a valid
    /// topological order since a node can only reference already-created
    /// children) view of every node reachable from `assertions`, used by
    /// model extraction.
    pub fn sort_assertions(&self, terms: &Terms) -> Vec<NodeId> {
        let mut reachable = vec![false; terms.len()];
        let mut stack: Vec<NodeId> = terms.assertions().to_vec();
        while let Some(id) = stack.pop() {
            if reachable[id.index()] {
                continue;
            }
            reachable[id.index()] = true;
            stack.extend(terms.term(id).children.iter().copied());
        }
        terms.all_ids().filter(|id| reachable[id.index()]).collect()
    }
}

fn eval_bool_from_children0(terms: &Terms, state: &ValueState, id: NodeId) -> bool {
    let node = terms.term(id);
    let children = &node.children;
    match &node.op {
        Op::BoolConst(v) => *v,
        Op::BoolVar(_) => state.bval0(id),
        Op::Not => !state.bval0(children[0]),
        Op::And => children.iter().all(|&c| state.bval0(c)),
        Op::Or => children.iter().any(|&c| state.bval0(c)),
        Op::Xor => children.iter().fold(false, |acc, &c| acc ^ state.bval0(c)),
        Op::BvEq => state.wval0(children[0]) == state.wval0(children[1]),
        Op::BvUlt => state.wval0(children[0]) < state.wval0(children[1]),
        op => unreachable!("non-bool op {op:?} in eval_bool_from_children0"),
    }
}

fn eval_word_from_children0(terms: &Terms, state: &ValueState, id: NodeId, width: u32) -> u64 {
    let node = terms.term(id);
    let children = &node.children;
    let m = mask(width);
    match &node.op {
        Op::BvConst(v) => *v & m,
        Op::BvVar(_) => state.wval0(id),
        Op::BvNot => !state.wval0(children[0]) & m,
        Op::BvNeg => state.wval0(children[0]).wrapping_neg() & m,
        Op::BvAnd => children.iter().fold(m, |acc, &c| acc & state.wval0(c)),
        Op::BvOr => children.iter().fold(0, |acc, &c| acc | state.wval0(c)),
        Op::BvXor => children.iter().fold(0, |acc, &c| acc ^ state.wval0(c)),
        Op::BvAdd => children.iter().fold(0u64, |acc, &c| acc.wrapping_add(state.wval0(c))) & m,
        Op::BvSub => state.wval0(children[0]).wrapping_sub(state.wval0(children[1])) & m,
        Op::BvShl => {
            let b = state.wval0(children[1]);
            if b >= width as u64 { 0 } else { (state.wval0(children[0]) << b) & m }
        }
        Op::BvLshr => {
            let b = state.wval0(children[1]);
            if b >= width as u64 { 0 } else { (state.wval0(children[0]) >> b) & m }
        }
        op => unreachable!("non-bitvec op {op:?} in eval_word_from_children0"),
    }
}

/// Sort accessors used only inside this module; kept free-standing so
/// `eval_bool_from_children0`/`eval_word_from_children0` don't need a
/// `Sort` import at every call site.
trait SortExt {
    fn is_bool(self) -> bool;
}

impl SortExt for Sort {
    fn is_bool(self) -> bool {
        matches!(self, Sort::Bool)
    }
}
