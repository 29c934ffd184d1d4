use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;
use z3::SatResult as Z3SatResult;

use crate::solver::{Model, ModelValue, SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("Z3 error: {0}")]
    Internal(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Rational literal out of range: {0}/{1}")]
    RationalOutOfRange(i64, i64),
}

pub struct Z3Solver {
    solver: z3::Solver,
    int_vars: HashMap<String, z3::ast::Int>,
    bool_vars: HashMap<String, z3::ast::Bool>,
    real_vars: HashMap<String, z3::ast::Real>,
    bv_vars: HashMap<String, z3::ast::BV>,
    _params: Option<z3::Params>,
}

impl Z3Solver {
    pub fn new() -> Self {
        let solver = z3::Solver::new();
        Self {
            solver,
            int_vars: HashMap::new(),
            bool_vars: HashMap::new(),
            real_vars: HashMap::new(),
            bv_vars: HashMap::new(),
            _params: None,
        }
    }

    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        if timeout_secs == 0 {
            return Self::new();
        }
        let solver = z3::Solver::new();
        let mut params = z3::Params::new();
        let timeout_ms = timeout_secs.saturating_mul(1000);
        params.set_u32("timeout", timeout_ms as u32);
        params.set_u32("solver2_timeout", timeout_ms as u32);
        solver.set_params(&params);
        Self {
            solver,
            int_vars: HashMap::new(),
            bool_vars: HashMap::new(),
            real_vars: HashMap::new(),
            bv_vars: HashMap::new(),
            _params: Some(params),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new()
    }

    fn translate_term(&self, term: &SmtTerm) -> Result<Z3Term, Z3Error> {
        match term {
            SmtTerm::Var(name) => {
                if let Some(v) = self.int_vars.get(name) {
                    Ok(Z3Term::Int(v.clone()))
                } else if let Some(v) = self.bool_vars.get(name) {
                    Ok(Z3Term::Bool(v.clone()))
                } else if let Some(v) = self.real_vars.get(name) {
                    Ok(Z3Term::Real(v.clone()))
                } else if let Some(v) = self.bv_vars.get(name) {
                    Ok(Z3Term::Bv(v.clone()))
                } else {
                    Err(Z3Error::UnknownVariable(name.clone()))
                }
            }
            SmtTerm::IntLit(n) => Ok(Z3Term::Int(z3::ast::Int::from_i64(*n))),
            SmtTerm::RealLit(num, den) => {
                let num = i32::try_from(*num)
                    .map_err(|_| Z3Error::RationalOutOfRange(*num, *den))?;
                let den = i32::try_from(*den)
                    .map_err(|_| Z3Error::RationalOutOfRange(num as i64, *den))?;
                Ok(Z3Term::Real(z3::ast::Real::from_real(num, den)))
            }
            SmtTerm::BoolLit(b) => Ok(Z3Term::Bool(z3::ast::Bool::from_bool(*b))),
            SmtTerm::BvLit(value, width) => {
                Ok(Z3Term::Bv(z3::ast::BV::from_u64(*value, *width)))
            }
            SmtTerm::Add(lhs, rhs) => {
                match (self.translate_term(lhs)?, self.translate_term(rhs)?) {
                    (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Int(&l + &r)),
                    (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Real(&l + &r)),
                    _ => Err(Z3Error::Internal("Sort mismatch in Add".into())),
                }
            }
            SmtTerm::Sub(lhs, rhs) => {
                match (self.translate_term(lhs)?, self.translate_term(rhs)?) {
                    (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Int(&l - &r)),
                    (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Real(&l - &r)),
                    _ => Err(Z3Error::Internal("Sort mismatch in Sub".into())),
                }
            }
            SmtTerm::Mul(lhs, rhs) => {
                match (self.translate_term(lhs)?, self.translate_term(rhs)?) {
                    (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Int(&l * &r)),
                    (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Real(&l * &r)),
                    _ => Err(Z3Error::Internal("Sort mismatch in Mul".into())),
                }
            }
            SmtTerm::Eq(lhs, rhs) => {
                let l = self.translate_term(lhs)?;
                let r = self.translate_term(rhs)?;
                match (l, r) {
                    (Z3Term::Int(li), Z3Term::Int(ri)) => Ok(Z3Term::Bool(li.eq(&ri))),
                    (Z3Term::Bool(lb), Z3Term::Bool(rb)) => Ok(Z3Term::Bool(lb.eq(&rb))),
                    (Z3Term::Real(lr), Z3Term::Real(rr)) => Ok(Z3Term::Bool(lr.eq(&rr))),
                    (Z3Term::Bv(lv), Z3Term::Bv(rv)) => Ok(Z3Term::Bool(lv.eq(&rv))),
                    _ => Err(Z3Error::Internal("Sort mismatch in Eq".into())),
                }
            }
            SmtTerm::Lt(lhs, rhs) => {
                match (self.translate_term(lhs)?, self.translate_term(rhs)?) {
                    (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Bool(l.lt(&r))),
                    (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Bool(l.lt(&r))),
                    _ => Err(Z3Error::Internal("Sort mismatch in Lt".into())),
                }
            }
            SmtTerm::Le(lhs, rhs) => {
                match (self.translate_term(lhs)?, self.translate_term(rhs)?) {
                    (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Bool(l.le(&r))),
                    (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Bool(l.le(&r))),
                    _ => Err(Z3Error::Internal("Sort mismatch in Le".into())),
                }
            }
            SmtTerm::Gt(lhs, rhs) => {
                match (self.translate_term(lhs)?, self.translate_term(rhs)?) {
                    (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Bool(l.gt(&r))),
                    (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Bool(l.gt(&r))),
                    _ => Err(Z3Error::Internal("Sort mismatch in Gt".into())),
                }
            }
            SmtTerm::Ge(lhs, rhs) => {
                match (self.translate_term(lhs)?, self.translate_term(rhs)?) {
                    (Z3Term::Int(l), Z3Term::Int(r)) => Ok(Z3Term::Bool(l.ge(&r))),
                    (Z3Term::Real(l), Z3Term::Real(r)) => Ok(Z3Term::Bool(l.ge(&r))),
                    _ => Err(Z3Error::Internal("Sort mismatch in Ge".into())),
                }
            }
            SmtTerm::BvAnd(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bv()?;
                let r = self.translate_term(rhs)?.into_bv()?;
                Ok(Z3Term::Bv(l.bvand(&r)))
            }
            SmtTerm::BvAdd(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bv()?;
                let r = self.translate_term(rhs)?.into_bv()?;
                Ok(Z3Term::Bv(l.bvadd(&r)))
            }
            SmtTerm::BvMul(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bv()?;
                let r = self.translate_term(rhs)?.into_bv()?;
                Ok(Z3Term::Bv(l.bvmul(&r)))
            }
            SmtTerm::BvUlt(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bv()?;
                let r = self.translate_term(rhs)?.into_bv()?;
                Ok(Z3Term::Bool(l.bvult(&r)))
            }
            SmtTerm::BvUle(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bv()?;
                let r = self.translate_term(rhs)?.into_bv()?;
                Ok(Z3Term::Bool(l.bvule(&r)))
            }
            SmtTerm::BvUgt(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bv()?;
                let r = self.translate_term(rhs)?.into_bv()?;
                Ok(Z3Term::Bool(l.bvugt(&r)))
            }
            SmtTerm::BvUge(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bv()?;
                let r = self.translate_term(rhs)?.into_bv()?;
                Ok(Z3Term::Bool(l.bvuge(&r)))
            }
            SmtTerm::And(terms) => {
                let bools: Result<Vec<_>, _> = terms
                    .iter()
                    .map(|t| self.translate_term(t).and_then(|z| z.into_bool()))
                    .collect();
                let bools = bools?;
                let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
                Ok(Z3Term::Bool(z3::ast::Bool::and(&refs)))
            }
            SmtTerm::Or(terms) => {
                let bools: Result<Vec<_>, _> = terms
                    .iter()
                    .map(|t| self.translate_term(t).and_then(|z| z.into_bool()))
                    .collect();
                let bools = bools?;
                let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
                Ok(Z3Term::Bool(z3::ast::Bool::or(&refs)))
            }
            SmtTerm::Not(inner) => {
                let b = self.translate_term(inner)?.into_bool()?;
                Ok(Z3Term::Bool(b.not()))
            }
            SmtTerm::Implies(lhs, rhs) => {
                let l = self.translate_term(lhs)?.into_bool()?;
                let r = self.translate_term(rhs)?.into_bool()?;
                Ok(Z3Term::Bool(l.implies(&r)))
            }
            SmtTerm::Ite(cond, then, els) => {
                let c = self.translate_term(cond)?.into_bool()?;
                let t = self.translate_term(then)?;
                let e = self.translate_term(els)?;
                match (t, e) {
                    (Z3Term::Int(ti), Z3Term::Int(ei)) => Ok(Z3Term::Int(c.ite(&ti, &ei))),
                    (Z3Term::Bool(tb), Z3Term::Bool(eb)) => Ok(Z3Term::Bool(c.ite(&tb, &eb))),
                    (Z3Term::Real(tr), Z3Term::Real(er)) => Ok(Z3Term::Real(c.ite(&tr, &er))),
                    (Z3Term::Bv(tv), Z3Term::Bv(ev)) => Ok(Z3Term::Bv(c.ite(&tv, &ev))),
                    _ => Err(Z3Error::Internal("Sort mismatch in ITE".into())),
                }
            }
        }
    }
}

enum Z3Term {
    Int(z3::ast::Int),
    Bool(z3::ast::Bool),
    Real(z3::ast::Real),
    Bv(z3::ast::BV),
}

impl Z3Term {
    fn into_bool(self) -> Result<z3::ast::Bool, Z3Error> {
        match self {
            Z3Term::Bool(b) => Ok(b),
            _ => Err(Z3Error::Internal("Expected Bool operand".into())),
        }
    }

    fn into_bv(self) -> Result<z3::ast::BV, Z3Error> {
        match self {
            Z3Term::Bv(v) => Ok(v),
            _ => Err(Z3Error::Internal("Expected BitVec operand".into())),
        }
    }
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl SmtSolver for Z3Solver {
    type Error = Z3Error;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Z3Error> {
        match sort {
            SmtSort::Int => {
                let v = z3::ast::Int::new_const(name);
                self.int_vars.insert(name.to_string(), v);
            }
            SmtSort::Bool => {
                let v = z3::ast::Bool::new_const(name);
                self.bool_vars.insert(name.to_string(), v);
            }
            SmtSort::Real => {
                let v = z3::ast::Real::new_const(name);
                self.real_vars.insert(name.to_string(), v);
            }
            SmtSort::BitVec(width) => {
                let v = z3::ast::BV::new_const(name, *width);
                self.bv_vars.insert(name.to_string(), v);
            }
        }
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), Z3Error> {
        let z3_term = self.translate_term(term)?.into_bool()?;
        self.solver.assert(&z3_term);
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, Z3Error> {
        debug!("invoking Z3 check");
        match self.solver.check() {
            Z3SatResult::Sat => Ok(SatResult::Sat),
            Z3SatResult::Unsat => Ok(SatResult::Unsat),
            Z3SatResult::Unknown => Ok(SatResult::Unknown("Z3 returned unknown".into())),
        }
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Z3Error> {
        debug!(vars = var_names.len(), "invoking Z3 check with model extraction");
        match self.solver.check() {
            Z3SatResult::Sat => {
                let z3_model = self
                    .solver
                    .get_model()
                    .ok_or_else(|| Z3Error::Internal("SAT but no model available".into()))?;
                let mut values = HashMap::new();

                for &(name, sort) in var_names {
                    match sort {
                        SmtSort::Int => {
                            if let Some(v) = self.int_vars.get(name) {
                                if let Some(val) = z3_model.eval::<z3::ast::Int>(v, true) {
                                    if let Some(n) = val.as_i64() {
                                        values.insert(name.to_string(), ModelValue::Int(n));
                                    }
                                }
                            }
                        }
                        SmtSort::Bool => {
                            if let Some(v) = self.bool_vars.get(name) {
                                if let Some(val) = z3_model.eval::<z3::ast::Bool>(v, true) {
                                    if let Some(b) = val.as_bool() {
                                        values.insert(name.to_string(), ModelValue::Bool(b));
                                    }
                                }
                            }
                        }
                        SmtSort::Real => {
                            if let Some(v) = self.real_vars.get(name) {
                                if let Some(val) = z3_model.eval::<z3::ast::Real>(v, true) {
                                    if let Some((num, den)) = val.as_real() {
                                        values
                                            .insert(name.to_string(), ModelValue::Real(num, den));
                                    }
                                }
                            }
                        }
                        SmtSort::BitVec(_) => {
                            if let Some(v) = self.bv_vars.get(name) {
                                if let Some(val) = z3_model.eval::<z3::ast::BV>(v, true) {
                                    if let Some(n) = val.as_u64() {
                                        values.insert(name.to_string(), ModelValue::BitVec(n));
                                    }
                                }
                            }
                        }
                    }
                }

                Ok((SatResult::Sat, Some(Model { values })))
            }
            Z3SatResult::Unsat => Ok((SatResult::Unsat, None)),
            Z3SatResult::Unknown => Ok((SatResult::Unknown("Z3 returned unknown".into()), None)),
        }
    }

    fn reset(&mut self) -> Result<(), Z3Error> {
        self.solver.reset();
        // Z3 may drop per-solver parameters on reset; reapply timeout if configured.
        if let Some(params) = &self._params {
            self.solver.set_params(params);
        }
        self.int_vars.clear();
        self.bool_vars.clear();
        self.real_vars.clear();
        self.bv_vars.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn z3_basic_sat() -> TestResult {
        let mut solver = Z3Solver::with_default_config();

        solver.declare_var("x", &SmtSort::Int)?;
        solver.declare_var("y", &SmtSort::Int)?;

        // x > 0 && y > 0 && x + y == 10
        let term = SmtTerm::and(vec![
            SmtTerm::var("x").gt(SmtTerm::int(0)),
            SmtTerm::var("y").gt(SmtTerm::int(0)),
            SmtTerm::var("x")
                .add(SmtTerm::var("y"))
                .eq(SmtTerm::int(10)),
        ]);
        solver.assert(&term)?;
        let result = solver.check_sat()?;
        assert_eq!(result, SatResult::Sat);
        Ok(())
    }

    #[test]
    fn z3_basic_unsat() -> TestResult {
        let mut solver = Z3Solver::with_default_config();

        solver.declare_var("x", &SmtSort::Int)?;

        // x > 0 && x < 0
        let term = SmtTerm::and(vec![
            SmtTerm::var("x").gt(SmtTerm::int(0)),
            SmtTerm::var("x").lt(SmtTerm::int(0)),
        ]);
        solver.assert(&term)?;
        let result = solver.check_sat()?;
        assert_eq!(result, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn z3_real_clamp_is_unsat_below_floor() -> TestResult {
        let mut solver = Z3Solver::with_default_config();
        solver.declare_var("x", &SmtSort::Real)?;

        // ite(x >= 1/1000, x, 1/1000) < 1/1000 has no solution
        let floor = SmtTerm::real(1, 1000);
        let clamp = SmtTerm::ite(
            SmtTerm::var("x").ge(floor.clone()),
            SmtTerm::var("x"),
            floor.clone(),
        );
        solver.assert(&clamp.lt(floor))?;
        assert_eq!(solver.check_sat()?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn z3_real_model_extraction() -> TestResult {
        let mut solver = Z3Solver::with_default_config();
        solver.declare_var("x", &SmtSort::Real)?;
        solver.assert(&SmtTerm::var("x").eq(SmtTerm::real(-3, 2)))?;

        let vars = vec![("x", &SmtSort::Real)];
        let (result, model) = solver.check_sat_with_model(&vars)?;
        assert_eq!(result, SatResult::Sat);
        let model = model.ok_or_else(|| {
            std::io::Error::other("expected model for SAT result in z3_real_model_extraction")
        })?;
        assert_eq!(model.get_real("x"), Some((-3, 2)));
        Ok(())
    }

    #[test]
    fn z3_bitvector_mask_stays_in_range() -> TestResult {
        let mut solver = Z3Solver::with_default_config();
        solver.declare_var("idx", &SmtSort::BitVec(32))?;

        // (idx & 15) > 15 is unsatisfiable
        let masked = SmtTerm::var("idx").bv_and(SmtTerm::bv(15, 32));
        solver.assert(&masked.bv_ugt(SmtTerm::bv(15, 32)))?;
        assert_eq!(solver.check_sat()?, SatResult::Unsat);
        Ok(())
    }

    #[test]
    fn z3_bitvector_model_extraction() -> TestResult {
        let mut solver = Z3Solver::with_default_config();
        solver.declare_var("idx", &SmtSort::BitVec(32))?;
        solver.assert(&SmtTerm::var("idx").eq(SmtTerm::bv(34, 32)))?;

        let vars = vec![("idx", &SmtSort::BitVec(32))];
        let (result, model) = solver.check_sat_with_model(&vars)?;
        assert_eq!(result, SatResult::Sat);
        let model = model.ok_or_else(|| {
            std::io::Error::other("expected model for SAT result in z3_bitvector_model_extraction")
        })?;
        assert_eq!(model.get_bitvec("idx"), Some(34));
        Ok(())
    }

    #[test]
    fn z3_model_extraction() -> TestResult {
        let mut solver = Z3Solver::with_default_config();

        solver.declare_var("x", &SmtSort::Int)?;
        solver.assert(&SmtTerm::var("x").eq(SmtTerm::int(42)))?;

        let vars = vec![("x", &SmtSort::Int)];
        let (result, model) = solver.check_sat_with_model(&vars)?;
        assert_eq!(result, SatResult::Sat);
        let model = model.ok_or_else(|| {
            std::io::Error::other("expected model for SAT result in z3_model_extraction")
        })?;
        assert_eq!(model.get_int("x"), Some(42));
        Ok(())
    }

    #[test]
    fn z3_timeout_configuration_survives_reset() -> TestResult {
        let mut solver = Z3Solver::with_timeout_secs(2);
        assert!(
            solver._params.is_some(),
            "timeout-backed solver should persist params for reset()"
        );

        solver.declare_var("x", &SmtSort::Int)?;
        solver.assert(&SmtTerm::var("x").eq(SmtTerm::int(1)))?;
        assert_eq!(solver.check_sat()?, SatResult::Sat);

        solver.reset()?;
        solver.declare_var("x", &SmtSort::Int)?;
        solver.assert(&SmtTerm::var("x").eq(SmtTerm::int(2)))?;
        assert_eq!(solver.check_sat()?, SatResult::Sat);
        assert!(
            solver._params.is_some(),
            "timeout parameters should still be available after reset()"
        );
        Ok(())
    }

    #[test]
    fn z3_reset_drops_declared_variables() -> TestResult {
        let mut solver = Z3Solver::with_default_config();
        solver.declare_var("x", &SmtSort::Real)?;
        solver.reset()?;

        let result = solver.assert(&SmtTerm::var("x").gt(SmtTerm::real(0, 1)));
        assert!(matches!(result, Err(Z3Error::UnknownVariable(_))));
        Ok(())
    }

    #[test]
    fn z3_translate_nested_ite() -> TestResult {
        let mut solver = Z3Solver::with_default_config();
        solver.declare_var("a", &SmtSort::Bool)?;
        solver.declare_var("b", &SmtSort::Bool)?;
        solver.declare_var("x", &SmtSort::Int)?;

        // x == ite(a, ite(b, 1, 2), 3)
        let inner_ite = SmtTerm::ite(SmtTerm::var("b"), SmtTerm::int(1), SmtTerm::int(2));
        let outer_ite = SmtTerm::ite(SmtTerm::var("a"), inner_ite, SmtTerm::int(3));
        solver.assert(&SmtTerm::var("x").eq(outer_ite))?;

        // a = true, b = true => x = 1
        solver.assert(&SmtTerm::var("a").eq(SmtTerm::bool(true)))?;
        solver.assert(&SmtTerm::var("b").eq(SmtTerm::bool(true)))?;

        let vars = vec![("x", &SmtSort::Int)];
        let (result, model) = solver.check_sat_with_model(&vars)?;
        assert_eq!(result, SatResult::Sat);
        let model = model.ok_or_else(|| {
            std::io::Error::other("expected model for SAT result in z3_translate_nested_ite")
        })?;
        assert_eq!(model.get_int("x"), Some(1));
        Ok(())
    }

    #[test]
    fn z3_sort_mismatch_is_rejected() -> TestResult {
        let mut solver = Z3Solver::with_default_config();
        solver.declare_var("x", &SmtSort::Real)?;
        solver.declare_var("idx", &SmtSort::BitVec(32))?;

        let mixed = SmtTerm::var("x").add(SmtTerm::var("idx"));
        let result = solver.assert(&mixed.gt(SmtTerm::real(0, 1)));
        assert!(result.is_err(), "Real + BitVec should be rejected");
        Ok(())
    }
}
