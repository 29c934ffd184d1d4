//! CLI argument definitions for the `shaderproof` binary.

use clap::Parser;

#[derive(Parser)]
#[command(name = "shaderproof")]
#[command(about = "Formal verification of the matrix terminal shader bug fixes")]
#[command(
    long_about = "Proves the shader bug-fix claims by refutation: each claim's negation is \
    encoded as an SMT constraint set and submitted to the selected solver. UNSAT proves the \
    claim; SAT prints the counterexample; UNKNOWN is reported as inconclusive.\n\n\
    Exit codes: 0 all claims proven, 1 some claim refuted, 2 some claim inconclusive."
)]
#[command(version)]
pub(crate) struct Cli {
    /// Solver backend to use: z3 | cvc5
    #[arg(long, default_value = "z3")]
    pub(crate) solver: String,

    /// Per-query solver timeout in seconds (0 disables)
    #[arg(long, default_value_t = 60)]
    pub(crate) timeout: u64,

    /// Path to the cvc5 binary (only used with --solver cvc5)
    #[arg(long, default_value = "cvc5")]
    pub(crate) cvc5_path: String,

    /// Output format: text | json
    #[arg(long, default_value = "text")]
    pub(crate) format: String,
}
