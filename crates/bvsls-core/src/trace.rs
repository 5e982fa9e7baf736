//! Tracing (spec §6): a restart-summary line at verbosity >= 2, a
//! per-move line at verbosity >= 20. The teacher has no `tracing`
//! dependency; it defines its own structured record types and a
//! writer path (`frankenlibc-core`'s `AllocatorLogRecord`/
//! `AllocatorLogLevel`), so this module follows the same shape instead
//! of pulling in an external logging framework.

use std::fmt;
use std::io::Write;

use bvsls_term::{NodeId, Op, Terms};

/// One tracing event. `RestartSummary` is emitted at verbosity >= 2,
/// `Move` at verbosity >= 20 (spec §6).
#[derive(Debug, Clone)]
pub enum TraceRecord {
    RestartSummary { restarts: u64, repair_down: usize, repair_up: usize },
    Move { from_down: bool, node: NodeId, expr: String, bool_value: Option<bool>, word_value: Option<u64>, was_correct: bool },
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceRecord::RestartSummary { restarts, repair_down, repair_up } => {
                write!(f, "(bvsls :restarts {restarts} :repair-down {repair_down} :repair-up {repair_up})")
            }
            TraceRecord::Move { from_down, node, expr, bool_value, word_value, was_correct } => {
                let set = if *from_down { 'd' } else { 'u' };
                let flag = if *was_correct { 'C' } else { 'U' };
                let value: String = match (bool_value, word_value) {
                    (Some(b), _) => b.to_string(),
                    (None, Some(w)) => w.to_string(),
                    (None, None) => "?".to_string(),
                };
                write!(f, "{set} #{} {expr} {value} {flag}", node.0)
            }
        }
    }
}

/// Where trace records go. [`NullSink`] drops everything (default, zero
/// overhead path); [`WriterSink`] formats per spec §6 and writes to any
/// `io::Write` at a given verbosity threshold.
pub trait TraceSink {
    fn verbosity(&self) -> u32;
    fn emit(&mut self, record: TraceRecord);

    fn restart_summary(&mut self, restarts: u64, repair_down: usize, repair_up: usize) {
        if self.verbosity() >= 2 {
            self.emit(TraceRecord::RestartSummary { restarts, repair_down, repair_up });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn move_record(
        &mut self,
        from_down: bool,
        node: NodeId,
        expr: String,
        bool_value: Option<bool>,
        word_value: Option<u64>,
        was_correct: bool,
    ) {
        if self.verbosity() >= 20 {
            self.emit(TraceRecord::Move { from_down, node, expr, bool_value, word_value, was_correct });
        }
    }
}

/// Drops every record; the default sink when no tracing is wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn verbosity(&self) -> u32 {
        0
    }

    fn emit(&mut self, _record: TraceRecord) {}
}

/// Formats records exactly per spec §6 and writes one line per record.
pub struct WriterSink<W> {
    verbosity: u32,
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(verbosity: u32, out: W) -> Self {
        Self { verbosity, out }
    }
}

impl<W: Write> TraceSink for WriterSink<W> {
    fn verbosity(&self) -> u32 {
        self.verbosity
    }

    fn emit(&mut self, record: TraceRecord) {
        let _ = writeln!(self.out, "{record}");
    }
}

/// A minimal, bounded-depth pretty-printer for debug dumps and move
/// traces (spec §6: `pp-expr`). Leaves print their name/value; internal
/// nodes print `(op child...)` one level deep rather than fully
/// expanding shared subterms, which would blow up on a DAG.
pub fn pp_expr(terms: &Terms, id: NodeId) -> String {
    let node = terms.term(id);
    match &node.op {
        Op::BoolConst(v) => v.to_string(),
        Op::BvConst(v) => v.to_string(),
        Op::BoolVar(name) | Op::BvVar(name) => name.clone(),
        op => {
            let args: Vec<String> = node.children.iter().map(|c| format!("#{}", c.0)).collect();
            format!("({} {})", op_symbol(op), args.join(" "))
        }
    }
}

fn op_symbol(op: &Op) -> &'static str {
    match op {
        Op::Not => "not",
        Op::And => "and",
        Op::Or => "or",
        Op::Xor => "xor",
        Op::BvNot => "bvnot",
        Op::BvNeg => "bvneg",
        Op::BvAnd => "bvand",
        Op::BvOr => "bvor",
        Op::BvXor => "bvxor",
        Op::BvAdd => "bvadd",
        Op::BvSub => "bvsub",
        Op::BvShl => "bvshl",
        Op::BvLshr => "bvlshr",
        Op::BvEq => "=",
        Op::BvUlt => "bvult",
        Op::BoolConst(_) | Op::BoolVar(_) | Op::BvConst(_) | Op::BvVar(_) => {
            unreachable!("leaves are handled before op_symbol is called")
        }
    }
}
