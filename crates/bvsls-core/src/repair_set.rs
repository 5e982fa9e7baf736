//! `RepairSets` (spec component C3): the `down`/`up` index sets the
//! scheduler drains, in O(1) insert/remove/contains/random-pick.
//!
//! Implemented as a dense `Vec<NodeId>` plus an `id -> position` side
//! table, with swap-on-remove — the structure spec §9 names directly
//! ("A swap-on-remove dense array plus an id->position map satisfies
//! this and is exactly what the source uses").

use bvsls_term::NodeId;
use rand::Rng;

/// One of the two membership sets (`down` or `up`). `elem_at` with a
/// uniformly random index gives every member equal selection
/// probability, independent of insertion/removal history.
#[derive(Debug, Clone, Default)]
pub struct RepairSet {
    dense: Vec<NodeId>,
    position: std::collections::HashMap<NodeId, usize>,
}

impl RepairSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.position.contains_key(&id)
    }

    /// Idempotent: inserting an already-present id is a no-op.
    pub fn insert(&mut self, id: NodeId) {
        if self.position.contains_key(&id) {
            return;
        }
        self.position.insert(id, self.dense.len());
        self.dense.push(id);
    }

    /// Idempotent: removing an absent id is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        let Some(pos) = self.position.remove(&id) else { return };
        let last = self.dense.len() - 1;
        self.dense.swap(pos, last);
        self.dense.pop();
        if pos < self.dense.len() {
            self.position.insert(self.dense[pos], pos);
        }
    }

    pub fn elem_at(&self, k: usize) -> NodeId {
        self.dense[k]
    }

    /// Uniformly random member, or `None` if empty.
    pub fn pick(&self, rng: &mut impl Rng) -> Option<NodeId> {
        if self.dense.is_empty() {
            return None;
        }
        Some(self.dense[rng.gen_range(0..self.dense.len())])
    }

    pub fn reset(&mut self) {
        self.dense.clear();
        self.position.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dense.iter().copied()
    }
}

/// The two sets the scheduler maintains side by side.
#[derive(Debug, Clone, Default)]
pub struct RepairSets {
    pub down: RepairSet,
    pub up: RepairSet,
}

impl RepairSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.down.reset();
        self.up.reset();
    }

    pub fn is_empty(&self) -> bool {
        self.down.is_empty() && self.up.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn insert_remove_contains_roundtrip() {
        let mut s = RepairSet::new();
        let a = NodeId(0);
        let b = NodeId(1);
        s.insert(a);
        s.insert(b);
        assert_eq!(s.len(), 2);
        assert!(s.contains(a) && s.contains(b));
        s.remove(a);
        assert!(!s.contains(a));
        assert!(s.contains(b));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut s = RepairSet::new();
        let a = NodeId(3);
        s.insert(a);
        s.insert(a);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn remove_absent_is_a_no_op() {
        let mut s = RepairSet::new();
        s.remove(NodeId(9));
        assert!(s.is_empty());
    }

    #[test]
    fn swap_remove_keeps_remaining_members_reachable_by_position_map() {
        let mut s = RepairSet::new();
        for i in 0..5 {
            s.insert(NodeId(i));
        }
        s.remove(NodeId(2));
        assert_eq!(s.len(), 4);
        for i in [0, 1, 3, 4] {
            assert!(s.contains(NodeId(i)));
        }
        // Every remaining id's recorded position must point at itself in
        // the dense array (this is what a stale position map would break).
        for k in 0..s.len() {
            let id = s.elem_at(k);
            assert!(s.contains(id));
        }
    }

    #[test]
    fn pick_is_none_when_empty() {
        let s = RepairSet::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(s.pick(&mut rng), None);
    }

    #[test]
    fn pick_covers_every_member_over_many_draws() {
        let mut s = RepairSet::new();
        for i in 0..8 {
            s.insert(NodeId(i));
        }
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(s.pick(&mut rng).unwrap());
        }
        assert_eq!(seen.len(), 8);
    }
}
