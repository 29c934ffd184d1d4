use serde::Serialize;
use std::fmt;

/// One counterexample variable assignment, already rendered for display.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub var: String,
    pub value: String,
}

/// Outcome of a single proof obligation.
///
/// `Unknown` is a genuine third verdict (solver incompleteness or timeout),
/// kept distinct from refutation rather than folded into failure.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Proven,
    Refuted { counterexample: Vec<Assignment> },
    Unknown { reason: String },
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Proven => "PROVEN",
            Verdict::Refuted { .. } => "REFUTED",
            Verdict::Unknown { .. } => "UNKNOWN",
        }
    }

    pub fn is_proven(&self) -> bool {
        matches!(self, Verdict::Proven)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved obligation: the claim metadata plus its verdict and wall time.
#[derive(Debug, Clone, Serialize)]
pub struct ObligationOutcome {
    pub id: String,
    pub title: String,
    /// Specification narration carried over from the obligation.
    #[serde(skip)]
    pub spec_lines: Vec<String>,
    pub goal: String,
    pub verdict: Verdict,
    pub elapsed_ms: u128,
}

/// Ordered verdicts for the whole suite. The aggregate is an AND-reduction:
/// no obligation's verdict affects another's evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub outcomes: Vec<ObligationOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallVerdict {
    AllProven,
    Refuted,
    Inconclusive,
}

impl OverallVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallVerdict::AllProven => "ALL_PROVEN",
            OverallVerdict::Refuted => "REFUTED",
            OverallVerdict::Inconclusive => "INCONCLUSIVE",
        }
    }
}

impl fmt::Display for OverallVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SuiteReport {
    /// Any refutation dominates; otherwise any unknown makes the run
    /// inconclusive; otherwise every claim is proven.
    pub fn overall(&self) -> OverallVerdict {
        let mut saw_unknown = false;
        for outcome in &self.outcomes {
            match &outcome.verdict {
                Verdict::Refuted { .. } => return OverallVerdict::Refuted,
                Verdict::Unknown { .. } => saw_unknown = true,
                Verdict::Proven => {}
            }
        }
        if saw_unknown {
            OverallVerdict::Inconclusive
        } else {
            OverallVerdict::AllProven
        }
    }

    pub fn all_proven(&self) -> bool {
        self.overall() == OverallVerdict::AllProven
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, verdict: Verdict) -> ObligationOutcome {
        ObligationOutcome {
            id: id.to_string(),
            title: id.to_string(),
            spec_lines: vec![],
            goal: String::new(),
            verdict,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn overall_is_and_reduction() {
        let report = SuiteReport {
            outcomes: vec![
                outcome("a", Verdict::Proven),
                outcome("b", Verdict::Proven),
            ],
        };
        assert_eq!(report.overall(), OverallVerdict::AllProven);
        assert!(report.all_proven());
    }

    #[test]
    fn refutation_dominates_unknown() {
        let report = SuiteReport {
            outcomes: vec![
                outcome("a", Verdict::Unknown { reason: "timeout".into() }),
                outcome(
                    "b",
                    Verdict::Refuted {
                        counterexample: vec![Assignment {
                            var: "x".into(),
                            value: "-1.0".into(),
                        }],
                    },
                ),
                outcome("c", Verdict::Proven),
            ],
        };
        assert_eq!(report.overall(), OverallVerdict::Refuted);
        assert!(!report.all_proven());
    }

    #[test]
    fn unknown_alone_is_inconclusive_not_refuted() {
        let report = SuiteReport {
            outcomes: vec![
                outcome("a", Verdict::Proven),
                outcome("b", Verdict::Unknown { reason: "unknown".into() }),
            ],
        };
        assert_eq!(report.overall(), OverallVerdict::Inconclusive);
    }

    #[test]
    fn verdict_serializes_with_status_tag() {
        let verdict = Verdict::Refuted {
            counterexample: vec![Assignment {
                var: "FONT_SCALE".into(),
                value: "-0.5".into(),
            }],
        };
        let json = serde_json::to_value(&verdict).expect("serialize verdict");
        assert_eq!(json["status"], "refuted");
        assert_eq!(json["counterexample"][0]["var"], "FONT_SCALE");
    }
}
