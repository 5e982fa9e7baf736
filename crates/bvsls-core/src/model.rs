//! Model extraction (spec component C5): read uninterpreted-constant
//! values out of the Evaluator once `run()` has returned SAT.

use bvsls_eval::Evaluator;
use bvsls_term::{Op, Terms};

/// One uninterpreted constant's value in a satisfying assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelValue {
    Bool(bool),
    BitVec { width: u32, value: u64 },
}

impl std::fmt::Display for ModelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelValue::Bool(b) => write!(f, "{b}"),
            ModelValue::BitVec { value, .. } => write!(f, "{value}"),
        }
    }
}

/// The satisfying assignment: one entry per uninterpreted constant
/// reachable from an assertion, in the order `sort_assertions` yields
/// them (spec §4.5: "Non-constant nodes are not included").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    entries: Vec<(String, ModelValue)>,
}

impl Model {
    pub fn get(&self, name: &str) -> Option<ModelValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ModelValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract the model from the current value state. Only valid right
    /// after `run()` returned SAT; the Evaluator's assignment is
    /// otherwise mid-search and not guaranteed to satisfy anything.
    pub fn extract(terms: &Terms, ev: &Evaluator) -> Self {
        let mut entries = Vec::new();
        for id in ev.sort_assertions(terms) {
            let node = terms.term(id);
            match &node.op {
                Op::BoolVar(name) => entries.push((name.clone(), ModelValue::Bool(ev.bval0(id)))),
                Op::BvVar(name) => {
                    entries.push((name.clone(), ModelValue::BitVec { width: node.sort.width(), value: ev.wval0(id) }))
                }
                _ => {}
            }
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bvsls_eval::RandomOracle;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn extract_includes_only_uninterpreted_constants() {
        let mut t = Terms::new();
        let x = t.mk_bv_var(4, "x");
        let y = t.mk_bv_const(4, 1);
        let sum = t.mk_bv_add(vec![x, y]);
        t.assert(t.mk_bv_eq(sum, t.mk_bv_const(4, 5)));
        t.init();

        let mut ev = Evaluator::new(&t);
        let mut oracle = RandomOracle::new(StdRng::seed_from_u64(1));
        ev.init_eval(&t, &mut oracle);
        ev.init_fixed(&t);

        let model = Model::extract(&t, &ev);
        assert_eq!(model.len(), 1);
        assert!(model.get("x").is_some());
    }
}
