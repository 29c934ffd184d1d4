/// Abstract SMT term representation, solver-agnostic.
///
/// Arithmetic and the ordered comparisons apply to `Int` and `Real` operands;
/// bit-vector operands use the dedicated `Bv*` variants, whose comparisons are
/// unsigned.
#[derive(Debug, Clone, PartialEq)]
pub enum SmtTerm {
    /// Variable reference by name.
    Var(String),
    /// Integer literal.
    IntLit(i64),
    /// Exact rational literal (numerator, denominator). The denominator must
    /// be positive.
    RealLit(i64, i64),
    /// Boolean literal.
    BoolLit(bool),
    /// Bit-vector literal (value, width in bits).
    BvLit(u64, u32),

    // Arithmetic
    Add(Box<SmtTerm>, Box<SmtTerm>),
    Sub(Box<SmtTerm>, Box<SmtTerm>),
    Mul(Box<SmtTerm>, Box<SmtTerm>),

    // Comparison
    Eq(Box<SmtTerm>, Box<SmtTerm>),
    Lt(Box<SmtTerm>, Box<SmtTerm>),
    Le(Box<SmtTerm>, Box<SmtTerm>),
    Gt(Box<SmtTerm>, Box<SmtTerm>),
    Ge(Box<SmtTerm>, Box<SmtTerm>),

    // Bit-vector arithmetic and masking
    BvAnd(Box<SmtTerm>, Box<SmtTerm>),
    BvAdd(Box<SmtTerm>, Box<SmtTerm>),
    BvMul(Box<SmtTerm>, Box<SmtTerm>),

    // Unsigned bit-vector comparison
    BvUlt(Box<SmtTerm>, Box<SmtTerm>),
    BvUle(Box<SmtTerm>, Box<SmtTerm>),
    BvUgt(Box<SmtTerm>, Box<SmtTerm>),
    BvUge(Box<SmtTerm>, Box<SmtTerm>),

    // Boolean logic
    And(Vec<SmtTerm>),
    Or(Vec<SmtTerm>),
    Not(Box<SmtTerm>),
    Implies(Box<SmtTerm>, Box<SmtTerm>),

    // If-then-else
    Ite(Box<SmtTerm>, Box<SmtTerm>, Box<SmtTerm>),
}

#[allow(clippy::should_implement_trait)]
impl SmtTerm {
    pub fn var(name: impl Into<String>) -> Self {
        SmtTerm::Var(name.into())
    }

    pub fn int(n: i64) -> Self {
        SmtTerm::IntLit(n)
    }

    /// Exact rational literal `num / den`.
    pub fn real(num: i64, den: i64) -> Self {
        debug_assert!(den > 0, "rational denominator must be positive");
        SmtTerm::RealLit(num, den)
    }

    pub fn bool(b: bool) -> Self {
        SmtTerm::BoolLit(b)
    }

    pub fn bv(value: u64, width: u32) -> Self {
        SmtTerm::BvLit(value, width)
    }

    pub fn add(self, other: SmtTerm) -> Self {
        SmtTerm::Add(Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: SmtTerm) -> Self {
        SmtTerm::Sub(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: SmtTerm) -> Self {
        SmtTerm::Mul(Box::new(self), Box::new(other))
    }

    pub fn eq(self, other: SmtTerm) -> Self {
        SmtTerm::Eq(Box::new(self), Box::new(other))
    }

    pub fn lt(self, other: SmtTerm) -> Self {
        SmtTerm::Lt(Box::new(self), Box::new(other))
    }

    pub fn le(self, other: SmtTerm) -> Self {
        SmtTerm::Le(Box::new(self), Box::new(other))
    }

    pub fn gt(self, other: SmtTerm) -> Self {
        SmtTerm::Gt(Box::new(self), Box::new(other))
    }

    pub fn ge(self, other: SmtTerm) -> Self {
        SmtTerm::Ge(Box::new(self), Box::new(other))
    }

    pub fn bv_and(self, other: SmtTerm) -> Self {
        SmtTerm::BvAnd(Box::new(self), Box::new(other))
    }

    pub fn bv_add(self, other: SmtTerm) -> Self {
        SmtTerm::BvAdd(Box::new(self), Box::new(other))
    }

    pub fn bv_mul(self, other: SmtTerm) -> Self {
        SmtTerm::BvMul(Box::new(self), Box::new(other))
    }

    pub fn bv_ult(self, other: SmtTerm) -> Self {
        SmtTerm::BvUlt(Box::new(self), Box::new(other))
    }

    pub fn bv_ule(self, other: SmtTerm) -> Self {
        SmtTerm::BvUle(Box::new(self), Box::new(other))
    }

    pub fn bv_ugt(self, other: SmtTerm) -> Self {
        SmtTerm::BvUgt(Box::new(self), Box::new(other))
    }

    pub fn bv_uge(self, other: SmtTerm) -> Self {
        SmtTerm::BvUge(Box::new(self), Box::new(other))
    }

    pub fn and(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::And(terms)
    }

    pub fn or(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::Or(terms)
    }

    pub fn not(self) -> Self {
        SmtTerm::Not(Box::new(self))
    }

    pub fn implies(self, other: SmtTerm) -> Self {
        SmtTerm::Implies(Box::new(self), Box::new(other))
    }

    pub fn ite(cond: SmtTerm, then: SmtTerm, els: SmtTerm) -> Self {
        SmtTerm::Ite(Box::new(cond), Box::new(then), Box::new(els))
    }
}
