//! The expression DAG: node arena, assertion set, and parent index.
//!
//! Construction happens through `Terms`'s `mk_*` methods, which hash-cons
//! nodes so that syntactically identical subterms share one id — this is
//! what makes the DAG a DAG rather than a tree, and it is what the
//! scheduler's repair-set propagation relies on (a shared subterm has
//! more than one parent, and a repair to it must wake all of them).

use std::collections::HashMap;

use crate::node::{Node, NodeId, Op, Symbol};
use crate::sort::{MAX_WIDTH, Sort};

/// Owns the node arena, the assertion set, and (after [`Terms::init`]) the
/// parent index. Nodes are append-only and ids are dense, so every side
/// table in the rest of the crate can be a plain `Vec` indexed by
/// `NodeId::index()`.
#[derive(Debug, Default)]
pub struct Terms {
    nodes: Vec<Node>,
    assertions: Vec<NodeId>,
    is_assertion: Vec<bool>,
    parents: Vec<Vec<NodeId>>,
    /// Keyed on sort as well as op/children: `Op::BvConst`/`BvVar` don't
    /// carry their width, and `BoolVar`/`BvVar` carry only a name, so two
    /// nodes with the same op and children but different widths (e.g.
    /// `mk_bv_const(4, 5)` vs `mk_bv_const(8, 5)`) must not collide.
    cache: HashMap<(Sort, Op, Vec<NodeId>), NodeId>,
    initialized: bool,
}

impl Terms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn term(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All node ids, in creation order (leaves first by construction,
    /// since a node can only reference children that already exist).
    pub fn all_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn assertions(&self) -> &[NodeId] {
        &self.assertions
    }

    pub fn is_assertion(&self, n: NodeId) -> bool {
        self.is_assertion.get(n.index()).copied().unwrap_or(false)
    }

    /// Direct parents of `n`. Empty before [`Terms::init`] has run.
    pub fn parents(&self, n: NodeId) -> &[NodeId] {
        self.parents.get(n.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finalize the parent index. Must be called once, after all
    /// assertions have been added and before the engine is handed this
    /// `Terms` (mirrors the external contract in spec §4.1/§6: `init()`
    /// "must be called before `init_eval`").
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.parents = vec![Vec::new(); self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                self.parents[child.index()].push(node.id);
            }
        }
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn push(&mut self, sort: Sort, op: Op, children: Vec<NodeId>) -> NodeId {
        debug_assert!(!self.initialized, "cannot add nodes after Terms::init()");
        if let Some(arity) = op.fixed_arity() {
            debug_assert_eq!(children.len(), arity, "wrong arity for {op:?}");
        }
        let key = (sort, op.clone(), children.clone());
        if let Some(&id) = self.cache.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { id, sort, op, children });
        self.cache.insert(key, id);
        id
    }

    // -- leaves -----------------------------------------------------------

    pub fn mk_bool_const(&mut self, v: bool) -> NodeId {
        self.push(Sort::Bool, Op::BoolConst(v), Vec::new())
    }

    pub fn mk_bool_var(&mut self, name: impl Into<Symbol>) -> NodeId {
        self.push(Sort::Bool, Op::BoolVar(name.into()), Vec::new())
    }

    pub fn mk_bv_const(&mut self, width: u32, value: u64) -> NodeId {
        assert!((1..=MAX_WIDTH).contains(&width), "width out of range: {width}");
        let masked = value & Sort::BitVec(width).mask();
        self.push(Sort::BitVec(width), Op::BvConst(masked), Vec::new())
    }

    pub fn mk_bv_var(&mut self, width: u32, name: impl Into<Symbol>) -> NodeId {
        assert!((1..=MAX_WIDTH).contains(&width), "width out of range: {width}");
        self.push(Sort::BitVec(width), Op::BvVar(name.into()), Vec::new())
    }

    // -- boolean connectives ------------------------------------------------

    pub fn mk_not(&mut self, a: NodeId) -> NodeId {
        self.assert_sort(a, Sort::Bool);
        self.push(Sort::Bool, Op::Not, vec![a])
    }

    pub fn mk_and(&mut self, children: Vec<NodeId>) -> NodeId {
        self.mk_bool_nary(Op::And, children)
    }

    pub fn mk_or(&mut self, children: Vec<NodeId>) -> NodeId {
        self.mk_bool_nary(Op::Or, children)
    }

    pub fn mk_xor(&mut self, children: Vec<NodeId>) -> NodeId {
        self.mk_bool_nary(Op::Xor, children)
    }

    fn mk_bool_nary(&mut self, op: Op, children: Vec<NodeId>) -> NodeId {
        assert!(!children.is_empty(), "{op:?} requires at least one child");
        for &c in &children {
            self.assert_sort(c, Sort::Bool);
        }
        self.push(Sort::Bool, op, children)
    }

    /// `not(eq(a, b))`, built directly: the Evaluator only ever inverts
    /// `BvEq` (see `SPEC_FULL.md` §3.2), so disequality is sugar at the
    /// construction layer rather than its own operator.
    pub fn mk_bv_ne(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let eq = self.mk_bv_eq(a, b);
        self.mk_not(eq)
    }

    // -- bit-vector bitwise / arithmetic ------------------------------------

    pub fn mk_bv_not(&mut self, a: NodeId) -> NodeId {
        let w = self.bv_width(a);
        self.push(Sort::BitVec(w), Op::BvNot, vec![a])
    }

    pub fn mk_bv_neg(&mut self, a: NodeId) -> NodeId {
        let w = self.bv_width(a);
        self.push(Sort::BitVec(w), Op::BvNeg, vec![a])
    }

    pub fn mk_bv_and(&mut self, children: Vec<NodeId>) -> NodeId {
        self.mk_bv_nary(Op::BvAnd, children)
    }

    pub fn mk_bv_or(&mut self, children: Vec<NodeId>) -> NodeId {
        self.mk_bv_nary(Op::BvOr, children)
    }

    pub fn mk_bv_xor(&mut self, children: Vec<NodeId>) -> NodeId {
        self.mk_bv_nary(Op::BvXor, children)
    }

    pub fn mk_bv_add(&mut self, children: Vec<NodeId>) -> NodeId {
        self.mk_bv_nary(Op::BvAdd, children)
    }

    fn mk_bv_nary(&mut self, op: Op, children: Vec<NodeId>) -> NodeId {
        assert!(!children.is_empty(), "{op:?} requires at least one child");
        let w = self.bv_width(children[0]);
        for &c in &children[1..] {
            assert_eq!(self.bv_width(c), w, "width mismatch in {op:?}");
        }
        self.push(Sort::BitVec(w), op, children)
    }

    pub fn mk_bv_sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let w = self.bv_binop_width(a, b);
        self.push(Sort::BitVec(w), Op::BvSub, vec![a, b])
    }

    pub fn mk_bv_shl(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let w = self.bv_binop_width(a, b);
        self.push(Sort::BitVec(w), Op::BvShl, vec![a, b])
    }

    pub fn mk_bv_lshr(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let w = self.bv_binop_width(a, b);
        self.push(Sort::BitVec(w), Op::BvLshr, vec![a, b])
    }

    pub fn mk_bv_eq(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.bv_binop_width(a, b);
        self.push(Sort::Bool, Op::BvEq, vec![a, b])
    }

    pub fn mk_bv_ult(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.bv_binop_width(a, b);
        self.push(Sort::Bool, Op::BvUlt, vec![a, b])
    }

    // -- assertions ----------------------------------------------------------

    /// Mark `n` (must be `Bool`-sorted) as an assertion.
    pub fn assert(&mut self, n: NodeId) {
        self.assert_sort(n, Sort::Bool);
        debug_assert!(!self.initialized, "cannot add assertions after Terms::init()");
        if self.is_assertion.len() <= n.index() {
            self.is_assertion.resize(n.index() + 1, false);
        }
        if !self.is_assertion[n.index()] {
            self.is_assertion[n.index()] = true;
            self.assertions.push(n);
        }
    }

    // -- helpers ---------------------------------------------------------------

    fn bv_width(&self, n: NodeId) -> u32 {
        match self.term(n).sort {
            Sort::BitVec(w) => w,
            Sort::Bool => panic!("expected bit-vector sort at node {:?}", n),
        }
    }

    fn bv_binop_width(&self, a: NodeId, b: NodeId) -> u32 {
        let w = self.bv_width(a);
        assert_eq!(self.bv_width(b), w, "width mismatch");
        w
    }

    fn assert_sort(&self, n: NodeId, sort: Sort) {
        assert_eq!(self.term(n).sort, sort, "sort mismatch at node {:?}", n);
    }
}
