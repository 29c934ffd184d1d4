/// SMT sorts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SmtSort {
    Bool,
    Int,
    Real,
    /// Fixed-width bit vector; the payload is the width in bits.
    BitVec(u32),
}

impl std::fmt::Display for SmtSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmtSort::Bool => write!(f, "Bool"),
            SmtSort::Int => write!(f, "Int"),
            SmtSort::Real => write!(f, "Real"),
            SmtSort::BitVec(width) => write!(f, "(_ BitVec {width})"),
        }
    }
}
