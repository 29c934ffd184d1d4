#![doc = include_str!("../README.md")]

//! SMT terms, sorts, and solver backends for the shaderproof proof runner.
//!
//! Obligation logic never talks to a concrete solver: it builds [`terms::SmtTerm`]
//! constraint sets and hands them to any implementation of
//! [`solver::SmtSolver`]. The [`backends`] module provides an in-process Z3
//! backend and a cvc5 subprocess backend.

pub mod backends;
pub mod solver;
pub mod sorts;
pub mod terms;
