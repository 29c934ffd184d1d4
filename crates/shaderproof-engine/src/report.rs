//! Text rendering for suite reports. Pure formatting over the verdict list;
//! nothing here talks to a solver.

use std::fmt::Write;

use crate::result::{ObligationOutcome, OverallVerdict, SuiteReport, Verdict};

const RULE: &str = "============================================================";

/// Render the full console narration: banner, one section per obligation,
/// and the final aggregate verdict.
pub fn render_text(report: &SuiteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "FORMAL VERIFICATION OF MATRIX SHADER FIXES");
    let _ = writeln!(out, "{RULE}");

    for outcome in &report.outcomes {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- {} ---", outcome.title);
        if !outcome.spec_lines.is_empty() {
            let _ = writeln!(out, "Specification:");
            for line in &outcome.spec_lines {
                let _ = writeln!(out, "  {line}");
            }
        }
        let _ = writeln!(out, "Verifying: {}", outcome.goal);
        render_verdict(&mut out, outcome);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "FINAL VERIFICATION RESULT");
    let _ = writeln!(out, "{RULE}");
    for outcome in &report.outcomes {
        let _ = writeln!(
            out,
            "  {} {:<20} {}",
            marker(&outcome.verdict),
            outcome.id,
            outcome.verdict.as_str()
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", summary_line(report.overall()));
    out
}

fn render_verdict(out: &mut String, outcome: &ObligationOutcome) {
    match &outcome.verdict {
        Verdict::Proven => {
            let _ = writeln!(out, "Result: UNSAT (no counterexample exists)");
            let _ = writeln!(
                out,
                "✓ PASS: {} is PROVEN ({} ms)",
                outcome.title, outcome.elapsed_ms
            );
        }
        Verdict::Refuted { counterexample } => {
            let _ = writeln!(out, "Result: SAT (counterexample found)");
            if counterexample.is_empty() {
                let _ = writeln!(out, "✗ FAIL: counterexample exists (no model values)");
            } else {
                let rendered: Vec<String> = counterexample
                    .iter()
                    .map(|a| format!("{} = {}", a.var, a.value))
                    .collect();
                let _ = writeln!(out, "✗ FAIL: {}", rendered.join(", "));
            }
        }
        Verdict::Unknown { reason } => {
            let _ = writeln!(out, "Result: UNKNOWN ({reason})");
            let _ = writeln!(out, "? INCONCLUSIVE: {} was not decided", outcome.title);
        }
    }
}

fn marker(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Proven => "✓",
        Verdict::Refuted { .. } => "✗",
        Verdict::Unknown { .. } => "?",
    }
}

fn summary_line(overall: OverallVerdict) -> &'static str {
    match overall {
        OverallVerdict::AllProven => "✓✓✓ ALL PROOFS PASSED ✓✓✓",
        OverallVerdict::Refuted => "✗✗✗ SOME PROOFS FAILED ✗✗✗",
        OverallVerdict::Inconclusive => "??? SOME PROOFS INCONCLUSIVE ???",
    }
}
