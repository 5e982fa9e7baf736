//! The repair-set scheduler, model extraction, config/stats, and the
//! public [`Engine`] facade (spec components C3-C6).
//!
//! This crate is the one external callers actually depend on: it wires
//! `bvsls-term`'s DAG and `bvsls-eval`'s invertibility-based repair
//! through the two-direction scheduler described in spec §4.4 and
//! exposes the surface listed in spec §6.

#![deny(unsafe_code)]

pub mod config;
pub mod model;
pub mod repair_set;
pub mod scheduler;
pub mod trace;

mod engine;

pub use config::{Config, ConfigError, ConfigUpdate, Stats};
pub use engine::Engine;
pub use model::{Model, ModelValue};
pub use repair_set::{RepairSet, RepairSets};
pub use scheduler::Outcome;
pub use trace::{NullSink, TraceRecord, TraceSink, WriterSink};
