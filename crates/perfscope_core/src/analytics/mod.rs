//! Scoped statistics and rankings.
//!
//! # Responsibility
//! - Aggregate objective and metric records into counts, rates and a
//!   weighted performance score.
//! - Order a population of actors by that score.
//!
//! # Invariants
//! - Empty inputs produce zero-valued results, never errors or NaN.
//! - Rates and progress averages stay within `[0, 100]`.

pub mod ranking;
pub mod stats;
