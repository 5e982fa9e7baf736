//! The public `Engine` facade (spec §6): owns `Terms`, the `Evaluator`,
//! the repair sets, config/stats, and the tracing sink, and wires them
//! through the scheduler's repair loop and restart discipline.

use rand::SeedableRng;
use rand::rngs::StdRng;

use bvsls_eval::{Evaluator, KeepMostlyOracle, Oracle};
use bvsls_term::Terms;

use crate::config::{Config, ConfigError, ConfigUpdate, Stats};
use crate::model::Model;
use crate::repair_set::RepairSets;
use crate::scheduler::{self, Outcome};
use crate::trace::{NullSink, TraceSink};

/// The engine is constructed over a term universe, initialized, primed
/// with a starting assignment, then run; `model()` is only meaningful
/// after `run()` returned `Outcome::Sat` (spec §6).
pub struct Engine {
    terms: Terms,
    ev: Evaluator,
    sets: RepairSets,
    cfg: Config,
    stats: Stats,
    rng: StdRng,
    sink: Box<dyn TraceSink>,
}

impl Engine {
    /// `new(expr_context) -> Engine` (spec §6).
    pub fn new(terms: Terms) -> Self {
        let ev = Evaluator::new(&terms);
        Self {
            ev,
            sets: RepairSets::new(),
            cfg: Config::default(),
            stats: Stats::default(),
            rng: StdRng::seed_from_u64(0),
            sink: Box::new(NullSink),
            terms,
        }
    }

    /// Finalize `Terms` (builds the parent index). Must be called before
    /// [`Engine::init_eval`] (spec §6).
    pub fn init(&mut self) {
        self.terms.init();
    }

    /// Install the initial-bit oracle, prime value state, derive fixed
    /// bits, and rebuild the repair sets against that assignment (spec
    /// §6; spec §4.4 "Initialization").
    pub fn init_eval(&mut self, oracle: &mut dyn Oracle) {
        self.rng = StdRng::seed_from_u64(self.cfg.random_seed);
        self.ev.init_eval(&self.terms, oracle);
        self.ev.init_fixed(&self.terms);
        scheduler::initialize(&self.terms, &mut self.ev, &mut self.sets);
    }

    /// Configure tunables (spec §6 `updt_params`); rejects invalid
    /// values through [`ConfigError`] rather than clamping.
    pub fn updt_params(&mut self, patch: ConfigUpdate) -> Result<(), ConfigError> {
        self.cfg.update(patch)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = sink;
    }

    pub fn terms(&self) -> &Terms {
        &self.terms
    }

    /// Main entry point (spec §6, "equivalent to the source's call
    /// operator"). Runs the repair loop, restarting with a keep-mostly
    /// reseed on `Unknown` until either a definite `Sat` or the restart
    /// budget/cancellation predicate ends the search.
    pub fn run(&mut self) -> Outcome {
        self.run_with(|| true)
    }

    /// Same as [`Engine::run`], but consulting a host-supplied
    /// cancellation predicate between moves and between restarts (spec
    /// §5, §7 "Cancellation").
    pub fn run_with(&mut self, mut inc: impl FnMut() -> bool) -> Outcome {
        self.stats.reset();
        loop {
            let outcome = scheduler::search(
                &self.terms,
                &mut self.ev,
                &mut self.sets,
                &mut self.stats,
                &self.cfg,
                &mut self.rng,
                self.sink.as_mut(),
                &mut inc,
            );
            if outcome == Outcome::Sat {
                return Outcome::Sat;
            }
            if self.stats.restarts >= self.cfg.max_restarts || !inc() {
                return Outcome::Unknown;
            }
            self.restart();
        }
    }

    /// Spec §4.4 "Restart": reseed the assignment through a keep-mostly
    /// oracle (fixed bits keep their fixed value, unfixed bits keep the
    /// prior assignment with probability `p_keep`, else randomize), then
    /// rebuild the repair sets.
    fn restart(&mut self) {
        self.stats.restarts += 1;
        self.sink.restart_summary(self.stats.restarts, self.sets.down.len(), self.sets.up.len());

        let (prev_bits0, prev_fixed) = self.ev.snapshot();
        let mut oracle = KeepMostlyOracle::new(prev_bits0, prev_fixed, self.cfg.p_keep, &mut self.rng);
        self.ev.init_eval(&self.terms, &mut oracle);
        self.ev.init_fixed(&self.terms);
        scheduler::initialize(&self.terms, &mut self.ev, &mut self.sets);
    }

    /// Model extraction (spec §6, §4.5); only meaningful after `run()`
    /// returned `Outcome::Sat`.
    pub fn model(&self) -> Model {
        Model::extract(&self.terms, &self.ev)
    }

    /// Debug dump of node id, value, and repair-set membership (spec §6
    /// `display`).
    pub fn display(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        for id in self.terms.all_ids() {
            let node = self.terms.term(id);
            let membership =
                if self.sets.down.contains(id) { "down" } else if self.sets.up.contains(id) { "up" } else { "idle" };
            let value = if node.sort.is_bool() {
                self.ev.bval0(id).to_string()
            } else {
                self.ev.wval0(id).to_string()
            };
            writeln!(out, "#{} {} = {value} [{membership}]", id.0, crate::trace::pp_expr(&self.terms, id))?;
        }
        Ok(())
    }
}
