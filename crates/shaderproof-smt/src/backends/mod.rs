pub mod cvc5_backend;
pub mod smtlib_printer;
pub mod z3_backend;

pub use cvc5_backend::{Cvc5Error, Cvc5Solver};
pub use z3_backend::{Z3Error, Z3Solver};
