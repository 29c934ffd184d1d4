use std::time::Instant;

use tracing::{debug, info};

use shaderproof_smt::solver::{Model, SatResult, SmtSolver};

use crate::obligation::ProofObligation;
use crate::result::{Assignment, ObligationOutcome, SuiteReport, Verdict};

/// Run every obligation in sequence against one solver backend.
///
/// Each obligation gets a clean solver state and fresh variables; one
/// `check_sat_with_model` call resolves it. A refutation never aborts the
/// remaining obligations; the aggregate verdict is computed only after every
/// obligation has resolved. Only a backend error (lost solver process, bad
/// encoding) ends the run early.
pub fn run_suite<S: SmtSolver>(
    solver: &mut S,
    obligations: &[ProofObligation],
) -> Result<SuiteReport, S::Error> {
    let mut outcomes = Vec::with_capacity(obligations.len());

    for obligation in obligations {
        let started = Instant::now();
        solver.reset()?;

        for (name, sort) in &obligation.vars {
            solver.declare_var(name, sort)?;
        }
        for constraint in &obligation.negation {
            debug!(id = %obligation.id, "asserting negation constraint");
            solver.assert(constraint)?;
        }

        let var_refs = obligation.var_refs();
        let (sat, model) = solver.check_sat_with_model(&var_refs)?;
        let elapsed_ms = started.elapsed().as_millis();

        let verdict = match sat {
            SatResult::Unsat => Verdict::Proven,
            SatResult::Sat => Verdict::Refuted {
                counterexample: assignments(model, obligation),
            },
            SatResult::Unknown(reason) => Verdict::Unknown { reason },
        };
        info!(
            id = %obligation.id,
            verdict = verdict.as_str(),
            elapsed_ms,
            "obligation resolved"
        );

        outcomes.push(ObligationOutcome {
            id: obligation.id.clone(),
            title: obligation.title.clone(),
            spec_lines: obligation.spec_lines.clone(),
            goal: obligation.goal.clone(),
            verdict,
            elapsed_ms,
        });
    }

    Ok(SuiteReport { outcomes })
}

/// Render the model in the obligation's declaration order. A backend may omit
/// values it could not evaluate; those variables are simply skipped.
fn assignments(model: Option<Model>, obligation: &ProofObligation) -> Vec<Assignment> {
    let Some(model) = model else {
        return Vec::new();
    };
    obligation
        .vars
        .iter()
        .filter_map(|(name, _)| {
            model.values.get(name).map(|value| Assignment {
                var: name.clone(),
                value: value.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;

    use shaderproof_smt::solver::ModelValue;
    use shaderproof_smt::sorts::SmtSort;
    use shaderproof_smt::terms::SmtTerm;

    use crate::result::OverallVerdict;

    /// Scripted backend: returns one canned answer per check, in order.
    struct ScriptedSolver {
        script: Vec<SatResult>,
        checks: usize,
        resets: usize,
        model_value: Option<ModelValue>,
    }

    impl ScriptedSolver {
        fn new(script: Vec<SatResult>) -> Self {
            Self {
                script,
                checks: 0,
                resets: 0,
                model_value: None,
            }
        }

        fn with_model_value(mut self, value: ModelValue) -> Self {
            self.model_value = Some(value);
            self
        }
    }

    impl SmtSolver for ScriptedSolver {
        type Error = io::Error;

        fn declare_var(&mut self, _name: &str, _sort: &SmtSort) -> Result<(), Self::Error> {
            Ok(())
        }

        fn assert(&mut self, _term: &SmtTerm) -> Result<(), Self::Error> {
            Ok(())
        }

        fn check_sat(&mut self) -> Result<SatResult, Self::Error> {
            let result = self
                .script
                .get(self.checks)
                .cloned()
                .unwrap_or(SatResult::Unsat);
            self.checks += 1;
            Ok(result)
        }

        fn check_sat_with_model(
            &mut self,
            var_names: &[(&str, &SmtSort)],
        ) -> Result<(SatResult, Option<Model>), Self::Error> {
            let result = self.check_sat()?;
            if result != SatResult::Sat {
                return Ok((result, None));
            }
            let mut values = HashMap::new();
            if let (Some(value), Some((name, _))) = (&self.model_value, var_names.first()) {
                values.insert(name.to_string(), value.clone());
            }
            Ok((SatResult::Sat, Some(Model { values })))
        }

        fn reset(&mut self) -> Result<(), Self::Error> {
            self.resets += 1;
            Ok(())
        }
    }

    fn two_obligations() -> Vec<ProofObligation> {
        vec![
            ProofObligation {
                id: "first".into(),
                title: "First claim".into(),
                spec_lines: vec![],
                goal: "first goal".into(),
                vars: vec![("x".to_string(), SmtSort::Real)],
                negation: vec![SmtTerm::var("x").lt(SmtTerm::real(0, 1))],
            },
            ProofObligation {
                id: "second".into(),
                title: "Second claim".into(),
                spec_lines: vec![],
                goal: "second goal".into(),
                vars: vec![("y".to_string(), SmtSort::Bool)],
                negation: vec![SmtTerm::var("y")],
            },
        ]
    }

    #[test]
    fn unsat_negation_proves_the_claim() -> Result<(), io::Error> {
        let mut solver = ScriptedSolver::new(vec![SatResult::Unsat, SatResult::Unsat]);
        let report = run_suite(&mut solver, &two_obligations())?;

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes.iter().all(|o| o.verdict.is_proven()));
        assert_eq!(report.overall(), OverallVerdict::AllProven);
        Ok(())
    }

    #[test]
    fn sat_negation_refutes_with_counterexample() -> Result<(), io::Error> {
        let mut solver = ScriptedSolver::new(vec![SatResult::Sat, SatResult::Unsat])
            .with_model_value(ModelValue::Real(-1, 2));
        let report = run_suite(&mut solver, &two_obligations())?;

        match &report.outcomes[0].verdict {
            Verdict::Refuted { counterexample } => {
                assert_eq!(counterexample.len(), 1);
                assert_eq!(counterexample[0].var, "x");
                assert_eq!(counterexample[0].value, "-0.5");
            }
            other => panic!("expected refutation, got {other:?}"),
        }
        assert_eq!(report.overall(), OverallVerdict::Refuted);
        Ok(())
    }

    #[test]
    fn refutation_does_not_abort_remaining_obligations() -> Result<(), io::Error> {
        let mut solver = ScriptedSolver::new(vec![SatResult::Sat, SatResult::Unsat]);
        let report = run_suite(&mut solver, &two_obligations())?;

        assert_eq!(report.outcomes.len(), 2, "second obligation still ran");
        assert!(report.outcomes[1].verdict.is_proven());
        assert_eq!(solver.resets, 2, "each obligation starts from a clean state");
        Ok(())
    }

    #[test]
    fn unknown_is_surfaced_distinctly() -> Result<(), io::Error> {
        let mut solver = ScriptedSolver::new(vec![
            SatResult::Unknown("solver timeout".into()),
            SatResult::Unsat,
        ]);
        let report = run_suite(&mut solver, &two_obligations())?;

        match &report.outcomes[0].verdict {
            Verdict::Unknown { reason } => assert_eq!(reason, "solver timeout"),
            other => panic!("expected unknown, got {other:?}"),
        }
        assert_eq!(report.overall(), OverallVerdict::Inconclusive);
        Ok(())
    }
}
