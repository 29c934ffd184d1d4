use shaderproof_smt::sorts::SmtSort;
use shaderproof_smt::terms::SmtTerm;

/// One independent proof obligation: a universal claim about a shader fix,
/// carried as the claim's *negation* encoded as a constraint set.
///
/// An obligation is built once, submitted to the decision procedure exactly
/// once, and never mutated. UNSAT on the negation proves the claim for all
/// values of the declared variables; SAT yields a concrete counterexample.
#[derive(Debug, Clone)]
pub struct ProofObligation {
    /// Stable identifier used in reports and machine output.
    pub id: String,
    /// Human-readable claim title.
    pub title: String,
    /// Specification narration printed before the verdict.
    pub spec_lines: Vec<String>,
    /// One-sentence statement of the universal claim being verified.
    pub goal: String,
    /// Fresh symbolic variables, declared per obligation.
    pub vars: Vec<(String, SmtSort)>,
    /// The negated claim, conjoined. UNSAT here means the claim holds.
    pub negation: Vec<SmtTerm>,
}

impl ProofObligation {
    /// Variable list in the borrowed form the solver interface expects.
    pub fn var_refs(&self) -> Vec<(&str, &SmtSort)> {
        self.vars
            .iter()
            .map(|(name, sort)| (name.as_str(), sort))
            .collect()
    }
}
