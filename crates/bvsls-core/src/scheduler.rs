//! The repair loop (spec component C4): picks a node from `down`/`up`,
//! checks correctness, dispatches a down or up repair move, and keeps
//! the two sets consistent with the state machine in spec §4.4.

use rand::Rng;

use bvsls_eval::Evaluator;
use bvsls_term::{NodeId, Terms};

use crate::config::{Config, Stats};
use crate::repair_set::RepairSets;
use crate::trace::{TraceSink, pp_expr};

/// `search`'s result: SAT (both sets drained) or unknown (budget
/// exhausted or the host's cancellation predicate fired). SLS is
/// incomplete, so there is no "unsat" outcome (spec §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sat,
    Unknown,
}

/// Populate `down`/`up` from scratch against the Evaluator's current
/// assignment (spec §4.4 "Initialization"). Used both for the very
/// first search and after every restart.
pub fn initialize(terms: &Terms, ev: &mut Evaluator, sets: &mut RepairSets) {
    sets.reset();
    for &a in terms.assertions() {
        if !ev.bval0(a) {
            ev.set(a, true);
            sets.down.insert(a);
        }
    }
    for id in terms.all_ids() {
        if terms.is_assertion(id) {
            continue;
        }
        if ev.can_eval1(terms, id) && !eval_is_correct(terms, ev, id) {
            sets.down.insert(id);
        }
    }
}

/// The main loop. Runs until `down` and `up` are both empty (SAT), the
/// per-search move budget is exhausted, or `inc()` returns false
/// (cancellation). Checked before every move, never mid-move (spec §5:
/// "a move is atomic w.r.t. observability").
///
/// `max_repairs` (spec §4.4 Termination) is a *per-search* budget: a
/// restart must be able to resume the loop rather than immediately
/// re-exhausting a cumulative counter, so this tracks how many moves
/// this particular call has made, leaving `stats.moves`'s running total
/// untouched for `Stats`'s reporting purposes.
pub fn search(
    terms: &Terms,
    ev: &mut Evaluator,
    sets: &mut RepairSets,
    stats: &mut Stats,
    cfg: &Config,
    rng: &mut impl Rng,
    sink: &mut dyn TraceSink,
    mut inc: impl FnMut() -> bool,
) -> Outcome {
    let start = stats.moves;
    loop {
        let (from_down, picked) = next_to_repair(sets, rng);
        let Some(e) = picked else {
            return Outcome::Sat;
        };
        if !inc() {
            return Outcome::Unknown;
        }
        if stats.moves - start >= cfg.max_repairs {
            return Outcome::Unknown;
        }
        stats.moves += 1;

        let correct = eval_is_correct(terms, ev, e);
        trace_move(terms, ev, sink, from_down, e, correct);

        if correct {
            if from_down { sets.down.remove(e) } else { sets.up.remove(e) };
            continue;
        }
        let changed = if from_down {
            try_repair_down(terms, ev, sets, e, rng)
        } else {
            try_repair_up(terms, ev, sets, e)
        };
        debug_check_invariants(terms, ev, sets, changed);
    }
}

/// Spec §8's testable invariants, checked after every move but only in
/// debug builds (the teacher's `debug_assert!`-guarded style of
/// defensive layout checks, e.g. `frankenlibc-core`'s allocator
/// bookkeeping): I1 fixed bits never drift from their locked value, I2
/// every node that isn't correct sits in `down` or `up`, I3 a node whose
/// `val0` just changed has every direct parent in `up`.
fn debug_check_invariants(terms: &Terms, ev: &Evaluator, sets: &RepairSets, changed: Option<NodeId>) {
    if !cfg!(debug_assertions) {
        return;
    }
    for id in terms.all_ids() {
        let fixed = ev.fixed_mask(id);
        if fixed != 0 {
            let node = terms.term(id);
            let current = if node.sort.is_bool() { ev.bval0(id) as u64 } else { ev.wval0(id) };
            debug_assert_eq!(
                current & fixed,
                ev.locked_value(id) & fixed,
                "I1 violated: node {id:?}'s fixed bits drifted from their locked value"
            );
        }
        if ev.can_eval1(terms, id) && !eval_is_correct(terms, ev, id) {
            debug_assert!(
                sets.down.contains(id) || sets.up.contains(id),
                "I2 violated: incorrect node {id:?} is in neither down nor up"
            );
        }
    }
    if let Some(id) = changed {
        for &p in terms.parents(id) {
            debug_assert!(sets.up.contains(p), "I3 violated: parent {p:?} of changed node {id:?} not in up");
        }
    }
}

/// `down` is drained before `up` is ever considered (spec I4).
fn next_to_repair(sets: &RepairSets, rng: &mut impl Rng) -> (bool, Option<NodeId>) {
    if let Some(id) = sets.down.pick(rng) {
        (true, Some(id))
    } else if let Some(id) = sets.up.pick(rng) {
        (false, Some(id))
    } else {
        (false, None)
    }
}

/// `eval_is_correct` (spec §4.4): false whenever `val1` isn't defined
/// yet; otherwise bit-for-bit (or boolean) equality of `val0`/`val1`.
pub fn eval_is_correct(terms: &Terms, ev: &Evaluator, e: NodeId) -> bool {
    if !ev.can_eval1(terms, e) {
        return false;
    }
    let sort = terms.term(e).sort;
    if sort.is_bool() {
        ev.bval0(e) == ev.bval1(terms, e)
    } else if sort.is_bitvec() {
        ev.wval0(e) == ev.wval1(terms, e)
    } else {
        unreachable!("eval_is_correct on a non-Bool, non-bit-vector sort")
    }
}

/// Returns the child whose `val0` changed, or `None` if no child could
/// be repaired and `e` fell through to the `up` set instead.
fn try_repair_down(terms: &Terms, ev: &mut Evaluator, sets: &mut RepairSets, e: NodeId, rng: &mut impl Rng) -> Option<NodeId> {
    let n = terms.term(e).children.len();
    if n > 0 {
        let start = rng.gen_range(0..n);
        for k in 0..n {
            let i = (start + k) % n;
            if try_repair_child(terms, ev, sets, e, i, rng) {
                return Some(terms.term(e).children[i]);
            }
        }
    }
    sets.down.remove(e);
    sets.up.insert(e);
    None
}

fn try_repair_child(terms: &Terms, ev: &mut Evaluator, sets: &mut RepairSets, e: NodeId, i: usize, rng: &mut impl Rng) -> bool {
    let child = terms.term(e).children[i];
    if !ev.try_repair(terms, e, i, rng) {
        return false;
    }
    sets.down.insert(child);
    for &p in terms.parents(child) {
        sets.up.insert(p);
    }
    true
}

/// Returns `Some(e)` when `e`'s `val0` was recomputed in place, or
/// `None` when `e` was an assertion and simply moved back into `down`.
fn try_repair_up(terms: &Terms, ev: &mut Evaluator, sets: &mut RepairSets, e: NodeId) -> Option<NodeId> {
    sets.up.remove(e);
    if terms.is_assertion(e) {
        sets.down.insert(e);
        None
    } else {
        ev.repair_up(terms, e);
        for &p in terms.parents(e) {
            sets.up.insert(p);
        }
        Some(e)
    }
}

fn trace_move(terms: &Terms, ev: &Evaluator, sink: &mut dyn TraceSink, from_down: bool, e: NodeId, correct: bool) {
    if sink.verbosity() < 20 {
        return;
    }
    let sort = terms.term(e).sort;
    let (bool_value, word_value) =
        if sort.is_bool() { (Some(ev.bval0(e)), None) } else { (None, Some(ev.wval0(e))) };
    sink.move_record(from_down, e, pp_expr(terms, e), bool_value, word_value, correct);
}
