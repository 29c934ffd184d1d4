use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Print an SmtTerm as SMT-LIB2 format.
pub fn to_smtlib(term: &SmtTerm) -> String {
    match term {
        SmtTerm::Var(name) => name.clone(),
        SmtTerm::IntLit(n) => {
            if *n < 0 {
                format!("(- {})", -n)
            } else {
                n.to_string()
            }
        }
        SmtTerm::RealLit(num, den) => {
            if *den == 1 {
                if *num < 0 {
                    format!("(- {}.0)", -num)
                } else {
                    format!("{num}.0")
                }
            } else if *num < 0 {
                format!("(/ (- {}.0) {den}.0)", -num)
            } else {
                format!("(/ {num}.0 {den}.0)")
            }
        }
        SmtTerm::BoolLit(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        SmtTerm::BvLit(value, width) => format!("(_ bv{value} {width})"),
        SmtTerm::Add(lhs, rhs) => format!("(+ {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::Sub(lhs, rhs) => format!("(- {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::Mul(lhs, rhs) => format!("(* {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::Eq(lhs, rhs) => format!("(= {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::Lt(lhs, rhs) => format!("(< {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::Le(lhs, rhs) => format!("(<= {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::Gt(lhs, rhs) => format!("(> {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::Ge(lhs, rhs) => format!("(>= {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::BvAnd(lhs, rhs) => format!("(bvand {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::BvAdd(lhs, rhs) => format!("(bvadd {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::BvMul(lhs, rhs) => format!("(bvmul {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::BvUlt(lhs, rhs) => format!("(bvult {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::BvUle(lhs, rhs) => format!("(bvule {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::BvUgt(lhs, rhs) => format!("(bvugt {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::BvUge(lhs, rhs) => format!("(bvuge {} {})", to_smtlib(lhs), to_smtlib(rhs)),
        SmtTerm::And(terms) => {
            if terms.is_empty() {
                "true".to_string()
            } else if terms.len() == 1 {
                to_smtlib(&terms[0])
            } else {
                let inner: Vec<String> = terms.iter().map(to_smtlib).collect();
                format!("(and {})", inner.join(" "))
            }
        }
        SmtTerm::Or(terms) => {
            if terms.is_empty() {
                "false".to_string()
            } else if terms.len() == 1 {
                to_smtlib(&terms[0])
            } else {
                let inner: Vec<String> = terms.iter().map(to_smtlib).collect();
                format!("(or {})", inner.join(" "))
            }
        }
        SmtTerm::Not(inner) => format!("(not {})", to_smtlib(inner)),
        SmtTerm::Implies(lhs, rhs) => {
            format!("(=> {} {})", to_smtlib(lhs), to_smtlib(rhs))
        }
        SmtTerm::Ite(cond, then, els) => {
            format!(
                "(ite {} {} {})",
                to_smtlib(cond),
                to_smtlib(then),
                to_smtlib(els)
            )
        }
    }
}

/// Print a sort as SMT-LIB2 format.
pub fn sort_to_smtlib(sort: &SmtSort) -> String {
    match sort {
        SmtSort::Bool => "Bool".to_string(),
        SmtSort::Int => "Int".to_string(),
        SmtSort::Real => "Real".to_string(),
        SmtSort::BitVec(width) => format!("(_ BitVec {width})"),
    }
}
