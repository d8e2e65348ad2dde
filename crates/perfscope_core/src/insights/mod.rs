//! External insights gateway.
//!
//! # Responsibility
//! - Fetch predictions, anomalies, insights and productivity scores from the
//!   configured insights service.
//! - Substitute a fixed fallback payload for every failed call.
//!
//! # Invariants
//! - Public fetch calls never return an error.
//! - One bounded attempt per call, no retries.
//! - Fallbacks have the same shape as successful responses.

pub mod gateway;
pub mod payload;

pub use gateway::{InsightsGateway, UpstreamError};
pub use payload::{Anomaly, Insight, InsightsQuery, Prediction, ProductivityScore};
