//! `shaderproof` binary: runs the shader-fix proof suite against the selected
//! solver backend and reports per-claim verdicts plus the aggregate result.

mod cli;

use clap::Parser;
use miette::IntoDiagnostic;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use shaderproof_engine::report::render_text;
use shaderproof_engine::result::{OverallVerdict, SuiteReport};
use shaderproof_engine::runner::run_suite;
use shaderproof_engine::suite::shader_fix_suite;
use shaderproof_smt::backends::cvc5_backend::Cvc5Solver;
use shaderproof_smt::backends::z3_backend::Z3Solver;
use shaderproof_smt::solver::SmtSolver;

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverChoice {
    Z3,
    Cvc5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_solver_choice(raw: &str) -> SolverChoice {
    match raw {
        "z3" => SolverChoice::Z3,
        "cvc5" => SolverChoice::Cvc5,
        other => {
            eprintln!("Unknown solver: {other}. Use 'z3' or 'cvc5'.");
            std::process::exit(1);
        }
    }
}

fn parse_output_format(raw: &str) -> OutputFormat {
    match raw {
        "text" => OutputFormat::Text,
        "json" => OutputFormat::Json,
        other => {
            eprintln!("Unknown output format: {other}. Use 'text' or 'json'.");
            std::process::exit(1);
        }
    }
}

fn check_suite<S>(solver: &mut S) -> miette::Result<SuiteReport>
where
    S: SmtSolver,
    S::Error: Send + Sync + 'static,
{
    let obligations = shader_fix_suite();
    run_suite(solver, &obligations).into_diagnostic()
}

fn exit_code(overall: OverallVerdict) -> i32 {
    match overall {
        OverallVerdict::AllProven => 0,
        OverallVerdict::Refuted => 1,
        OverallVerdict::Inconclusive => 2,
    }
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let solver_choice = parse_solver_choice(&cli.solver);
    let format = parse_output_format(&cli.format);

    let report = match solver_choice {
        SolverChoice::Z3 => {
            let mut solver = Z3Solver::with_timeout_secs(cli.timeout);
            check_suite(&mut solver)?
        }
        SolverChoice::Cvc5 => {
            let timeout_ms = if cli.timeout == 0 {
                None
            } else {
                Some(cli.timeout.saturating_mul(1000))
            };
            let mut solver = Cvc5Solver::with_command_and_timeout(&cli.cvc5_path, timeout_ms)
                .into_diagnostic()?;
            check_suite(&mut solver)?
        }
    };

    match format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => {
            let payload = json!({
                "overall": report.overall(),
                "obligations": report.outcomes,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).into_diagnostic()?
            );
        }
    }

    let code = exit_code(report.overall());
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_verdict_contract() {
        assert_eq!(exit_code(OverallVerdict::AllProven), 0);
        assert_eq!(exit_code(OverallVerdict::Refuted), 1);
        assert_eq!(exit_code(OverallVerdict::Inconclusive), 2);
    }

    #[test]
    fn known_solver_names_parse() {
        assert_eq!(parse_solver_choice("z3"), SolverChoice::Z3);
        assert_eq!(parse_solver_choice("cvc5"), SolverChoice::Cvc5);
        assert_eq!(parse_output_format("text"), OutputFormat::Text);
        assert_eq!(parse_output_format("json"), OutputFormat::Json);
    }
}
