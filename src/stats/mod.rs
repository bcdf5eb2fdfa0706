//! Statistical primitives: descriptive summaries, normality classification,
//! control limits, and least-squares trend fitting.
//!
//! Everything here is a pure function over `&[f64]`; grouping and record
//! construction live in `engine`.

pub mod control;
pub mod descriptive;
pub mod normality;
pub mod regression;
