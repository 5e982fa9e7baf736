//! JSON/markdown conformance reports over a batch of scenario runs,
//! shaped like the teacher's `ConformanceReport`
//! (`frankenlibc-harness::report`): one machine-readable artifact plus
//! a human-readable rendering of the same data.

use serde::{Deserialize, Serialize};

use crate::scenarios::ScenarioOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReportEntry {
    pub name: String,
    pub spec_section: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
    pub moves: u64,
    pub restarts: u64,
    pub model_failures: Vec<String>,
}

impl From<&ScenarioOutcome> for ScenarioReportEntry {
    fn from(o: &ScenarioOutcome) -> Self {
        Self {
            name: o.name.to_string(),
            spec_section: o.spec_section.to_string(),
            expected: format!("{:?}", o.expected),
            actual: format!("{:?}", o.actual),
            passed: o.passed(),
            moves: o.moves,
            restarts: o.restarts,
            model_failures: o.model_failures.clone(),
        }
    }
}

/// Whole-batch conformance report: pass/fail counts plus every scenario's
/// individual entry, in the order scenarios were run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub version: &'static str,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub entries: Vec<ScenarioReportEntry>,
}

impl ConformanceReport {
    pub fn from_outcomes(outcomes: &[ScenarioOutcome]) -> Self {
        let entries: Vec<ScenarioReportEntry> = outcomes.iter().map(ScenarioReportEntry::from).collect();
        let passed = entries.iter().filter(|e| e.passed).count();
        Self { version: "v1", total: entries.len(), failed: entries.len() - passed, passed, entries }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// A short human-readable table, one line per scenario, matching the
    /// `PASS`/`FAIL` style of the teacher's traceability matrix output.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# bvsls conformance report\n\n{}/{} scenarios passed\n\n", self.passed, self.total));
        out.push_str("| scenario | spec | expected | actual | moves | restarts | result |\n");
        out.push_str("|---|---|---|---|---|---|---|\n");
        for e in &self.entries {
            let result = if e.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                e.name, e.spec_section, e.expected, e.actual, e.moves, e.restarts, result
            ));
            for failure in &e.model_failures {
                out.push_str(&format!("|   model mismatch: {failure} | | | | | | |\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::run_all;

    #[test]
    fn report_round_trips_through_json() {
        let outcomes = run_all();
        let report = ConformanceReport::from_outcomes(&outcomes);
        let json = report.to_json().unwrap();
        let parsed: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total, report.total);
        assert_eq!(parsed.passed, report.passed);
    }

    #[test]
    fn all_literal_scenarios_pass() {
        let outcomes = run_all();
        let report = ConformanceReport::from_outcomes(&outcomes);
        assert!(report.all_passed(), "{}", report.to_markdown());
    }
}
