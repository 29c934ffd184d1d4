use std::collections::HashMap;

use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Result of a satisfiability check.
#[derive(Debug, Clone, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown(String),
}

/// A model (variable assignments) extracted from a SAT result.
#[derive(Debug, Clone)]
pub struct Model {
    pub values: HashMap<String, ModelValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    Int(i64),
    Bool(bool),
    /// Exact rational (numerator, denominator).
    Real(i64, i64),
    BitVec(u64),
}

impl Model {
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ModelValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ModelValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_real(&self, name: &str) -> Option<(i64, i64)> {
        match self.values.get(name) {
            Some(ModelValue::Real(num, den)) => Some((*num, *den)),
            _ => None,
        }
    }

    pub fn get_bitvec(&self, name: &str) -> Option<u64> {
        match self.values.get(name) {
            Some(ModelValue::BitVec(v)) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelValue::Int(n) => write!(f, "{n}"),
            ModelValue::Bool(b) => write!(f, "{b}"),
            ModelValue::Real(num, den) => write!(f, "{}", format_rational(*num, *den)),
            ModelValue::BitVec(v) => write!(f, "{v}"),
        }
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

/// Render `num / den` as an exact decimal when the reduced denominator
/// divides a power of ten, falling back to `num/den` fraction syntax
/// otherwise.
pub fn format_rational(num: i64, den: i64) -> String {
    if den == 0 {
        return format!("{num}/0");
    }
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i64;
    let (num, den) = (num / g, den / g);
    if den == 1 {
        return format!("{num}.0");
    }
    // Scale the denominator to a power of ten, if possible.
    let mut d = den;
    let mut scale: i64 = 1;
    let mut digits = 0u32;
    while d % 2 == 0 {
        d /= 2;
        scale = match scale.checked_mul(5) {
            Some(s) => s,
            None => return format!("{num}/{den}"),
        };
        digits += 1;
    }
    while d % 5 == 0 {
        d /= 5;
        scale = match scale.checked_mul(2) {
            Some(s) => s,
            None => return format!("{num}/{den}"),
        };
        digits += 1;
    }
    if d != 1 {
        return format!("{num}/{den}");
    }
    let scaled = match num.checked_mul(scale) {
        Some(s) => s,
        None => return format!("{num}/{den}"),
    };
    let sign = if scaled < 0 { "-" } else { "" };
    let magnitude = scaled.unsigned_abs();
    let pow10 = 10u64.pow(digits);
    let whole = magnitude / pow10;
    let frac = magnitude % pow10;
    format!("{sign}{whole}.{frac:0width$}", width = digits as usize)
}

/// Abstract SMT solver interface.
///
/// The proof runner treats this as an opaque decision procedure: declare
/// variables, assert the negated claim, ask for satisfiability, and read back
/// a counterexample model when one exists.
pub trait SmtSolver {
    type Error: std::error::Error;

    /// Declare a new variable.
    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Self::Error>;

    /// Assert a constraint.
    fn assert(&mut self, term: &SmtTerm) -> Result<(), Self::Error>;

    /// Check satisfiability.
    fn check_sat(&mut self) -> Result<SatResult, Self::Error>;

    /// Check satisfiability and extract a model if SAT.
    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Self::Error>;

    /// Reset the solver state.
    fn reset(&mut self) -> Result<(), Self::Error>;
}
