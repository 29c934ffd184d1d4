use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};

use thiserror::Error;
use tracing::debug;

use crate::backends::smtlib_printer::{sort_to_smtlib, to_smtlib};
use crate::solver::{Model, ModelValue, SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

// Obligations mix Real, Bool, and BitVec sorts, so the session runs
// under the combined logic rather than a single-theory one.
const LOGIC: &str = "ALL";

#[derive(Debug, Error)]
pub enum Cvc5Error {
    #[error("cvc5 I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cvc5 not found: {0}")]
    NotFound(String),
    #[error("cvc5 error: {0}")]
    SolverError(String),
    #[error("Failed to parse cvc5 output: {0}")]
    ParseError(String),
}

pub struct Cvc5Solver {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: BufReader<ChildStderr>,
}

impl Cvc5Solver {
    pub fn new() -> Result<Self, Cvc5Error> {
        Self::with_command_and_timeout("cvc5", None)
    }

    pub fn with_timeout_secs(timeout_secs: u64) -> Result<Self, Cvc5Error> {
        if timeout_secs == 0 {
            return Self::with_command_and_timeout("cvc5", None);
        }
        let timeout_ms = timeout_secs.saturating_mul(1000);
        Self::with_command_and_timeout("cvc5", Some(timeout_ms))
    }

    pub fn with_command(cmd: &str) -> Result<Self, Cvc5Error> {
        Self::with_command_and_timeout(cmd, None)
    }

    pub fn with_command_and_timeout(cmd: &str, timeout_ms: Option<u64>) -> Result<Self, Cvc5Error> {
        let mut args = vec![
            "--lang".to_string(),
            "smt2".to_string(),
            "--incremental".to_string(),
            "--produce-models".to_string(),
        ];
        if let Some(ms) = timeout_ms {
            args.push(format!("--tlimit={ms}"));
        }

        let mut child = Command::new(cmd)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Cvc5Error::NotFound(format!("{cmd}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Cvc5Error::SolverError("failed to capture cvc5 stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Cvc5Error::SolverError("failed to capture cvc5 stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Cvc5Error::SolverError("failed to capture cvc5 stderr".into()))?;

        let mut solver = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr: BufReader::new(stderr),
        };

        solver.send_command_no_response(&format!("(set-logic {LOGIC})"))?;
        Ok(solver)
    }

    fn send_command(&mut self, cmd: &str) -> Result<String, Cvc5Error> {
        debug!(command = cmd, "sending cvc5 command");
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;

        // Read one line of response
        let mut response = String::new();
        self.stdout.read_line(&mut response)?;
        if response.is_empty() {
            let mut stderr = String::new();
            let _ = self.stderr.read_line(&mut stderr);
            return Err(Cvc5Error::SolverError(format!(
                "No response from cvc5 for command `{cmd}`. stderr: {}",
                stderr.trim()
            )));
        }
        Ok(response.trim_end().to_string())
    }

    fn send_command_no_response(&mut self, cmd: &str) -> Result<(), Cvc5Error> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }
}

impl Drop for Cvc5Solver {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "(exit)");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

impl SmtSolver for Cvc5Solver {
    type Error = Cvc5Error;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Cvc5Error> {
        let sort_str = sort_to_smtlib(sort);
        self.send_command_no_response(&format!("(declare-const {name} {sort_str})"))?;
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), Cvc5Error> {
        let smt_str = to_smtlib(term);
        self.send_command_no_response(&format!("(assert {smt_str})"))?;
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, Cvc5Error> {
        let response = self.send_command("(check-sat)")?;
        match response.as_str() {
            "sat" => Ok(SatResult::Sat),
            "unsat" => Ok(SatResult::Unsat),
            "unknown" => Ok(SatResult::Unknown("cvc5 returned unknown".into())),
            other => Err(Cvc5Error::SolverError(other.to_string())),
        }
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Cvc5Error> {
        let result = self.check_sat()?;
        if result != SatResult::Sat {
            return Ok((result, None));
        }

        let mut values = HashMap::new();
        for &(name, sort) in var_names {
            let response = self.send_command(&format!("(get-value ({name}))"))?;
            // Response format: ((name value))
            if let Some(val) = parse_cvc5_value(&response, sort) {
                values.insert(name.to_string(), val);
            }
        }

        Ok((SatResult::Sat, Some(Model { values })))
    }

    fn reset(&mut self) -> Result<(), Cvc5Error> {
        self.send_command_no_response("(reset)")?;
        self.send_command_no_response(&format!("(set-logic {LOGIC})"))?;
        Ok(())
    }
}

fn parse_cvc5_value(response: &str, sort: &SmtSort) -> Option<ModelValue> {
    // Strip outer parens: ((name value)) → name value
    let inner = response
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')');
    let parts: Vec<&str> = inner.splitn(2, ' ').collect();
    if parts.len() < 2 {
        return None;
    }
    let val_str = parts[1].trim();

    match sort {
        SmtSort::Int => {
            // Handle (- N) format
            if let Some(num_str) = val_str.strip_prefix("(- ") {
                let num_str = num_str.trim_end_matches(')');
                num_str.parse::<i64>().ok().map(|n| ModelValue::Int(-n))
            } else {
                val_str.parse::<i64>().ok().map(ModelValue::Int)
            }
        }
        SmtSort::Bool => match val_str {
            "true" => Some(ModelValue::Bool(true)),
            "false" => Some(ModelValue::Bool(false)),
            _ => None,
        },
        SmtSort::Real => parse_real_token(val_str).map(|(num, den)| ModelValue::Real(num, den)),
        SmtSort::BitVec(_) => parse_bitvec_token(val_str).map(ModelValue::BitVec),
    }
}

/// Parse a cvc5 real value: a decimal (`1.5`), a rational (`(/ 1 1000)`),
/// or either wrapped in a negation (`(- ...)`).
fn parse_real_token(raw: &str) -> Option<(i64, i64)> {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix("(- ") {
        let inner = inner.strip_suffix(')')?;
        let (num, den) = parse_real_token(inner)?;
        return Some((-num, den));
    }
    if let Some(inner) = raw.strip_prefix("(/ ") {
        let inner = inner.strip_suffix(')')?;
        let mut split = inner.splitn(2, ' ');
        let (an, ad) = parse_real_token(split.next()?)?;
        let (bn, bd) = parse_real_token(split.next()?.trim())?;
        if bn == 0 {
            return None;
        }
        // (an/ad) / (bn/bd) = an*bd / (ad*bn), normalized to a positive denominator
        let num = an.checked_mul(bd)?;
        let den = ad.checked_mul(bn)?;
        return Some(if den < 0 { (-num, -den) } else { (num, den) });
    }
    if let Some((whole, frac)) = raw.split_once('.') {
        let digits = u32::try_from(frac.len()).ok()?;
        let pow10 = 10i64.checked_pow(digits)?;
        let whole_n = whole.parse::<i64>().ok()?;
        let frac_n = frac.parse::<i64>().ok()?;
        let magnitude = whole_n.unsigned_abs() as i64 * pow10 + frac_n;
        let num = if whole.starts_with('-') { -magnitude } else { magnitude };
        return Some((num, pow10));
    }
    raw.parse::<i64>().ok().map(|n| (n, 1))
}

/// Parse a cvc5 bit-vector value: `#b...`, `#x...`, or `(_ bvN w)`.
fn parse_bitvec_token(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Some(bits) = raw.strip_prefix("#b") {
        return u64::from_str_radix(bits, 2).ok();
    }
    if let Some(hex) = raw.strip_prefix("#x") {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some(inner) = raw.strip_prefix("(_ bv") {
        let inner = inner.strip_suffix(')')?;
        let value = inner.split_whitespace().next()?;
        return value.parse::<u64>().ok();
    }
    None
}
