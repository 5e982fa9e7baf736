//! The Evaluator collaborator (spec component C2): value state, fixed-bit
//! propagation, and invertibility-based local repair.
//!
//! This is the largest collaborator by design (spec §2 puts it at ~55%
//! of the core's budget): it owns the only place that understands how
//! to run an operator forward (`val1` recomputation) and how to invert
//! it (`try_repair`'s per-operator invertibility conditions, §3.2).

#![deny(unsafe_code)]

pub mod eval;
pub mod invert;
pub mod oracle;
pub mod value;

pub use eval::Evaluator;
pub use oracle::{KeepMostlyOracle, Oracle, RandomOracle};
pub use value::ValueState;
