//! The expression DAG collaborator (spec component C1, "Terms").
//!
//! Owns the arena of shared expression nodes, the assertion set, and the
//! child-to-parents index the scheduler walks during repair propagation.
//! This crate has no notion of a current assignment or of repair — that
//! lives in `bvsls-eval` and `bvsls-core` respectively.

#![deny(unsafe_code)]

pub mod node;
pub mod sort;
pub mod terms;

pub use node::{Node, NodeId, Op, Symbol};
pub use sort::Sort;
pub use terms::Terms;
