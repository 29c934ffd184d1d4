#![doc = include_str!("../README.md")]

//! Verification engine for the shader-fix proof suite.
//!
//! Evaluation and reporting are deliberately separate: [`runner::run_suite`]
//! produces a [`result::SuiteReport`] without printing anything, and
//! [`report::render_text`] turns a report into the console narration.

pub mod obligation;
pub mod report;
pub mod result;
pub mod runner;
pub mod suite;
