//! HTTP client for the insights service.
//!
//! Each public `fetch_*` call wraps one `try_fetch` attempt and maps any
//! [`UpstreamError`] to the endpoint's fallback payload.

use crate::config::InsightsConfig;
use crate::insights::payload::{
    fallback_anomalies, fallback_insights, fallback_predictions, fallback_productivity_score,
    Anomaly, Insight, InsightsQuery, Prediction, ProductivityScore,
};
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

const PREDICTIONS_PATH: &str = "predictions";
const ANOMALIES_PATH: &str = "anomalies";
const INSIGHTS_PATH: &str = "insights";
const PRODUCTIVITY_SCORE_PATH: &str = "productivity-score";
const HEALTH_PATH: &str = "health";

/// Failure of one outbound call. Never crosses the gateway's public surface
/// except through [`InsightsGateway::try_fetch`] and construction.
#[derive(Debug)]
pub enum UpstreamError {
    Client(String),
    Timeout(String),
    Transport(String),
    Status(u16),
    Decode(String),
}

impl UpstreamError {
    /// Short failure class for log events.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Client(_) => "client",
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(message) => write!(f, "failed to build insights client: {message}"),
            Self::Timeout(message) => write!(f, "insights request timed out: {message}"),
            Self::Transport(message) => write!(f, "insights request failed: {message}"),
            Self::Status(code) => write!(f, "insights service returned status {code}"),
            Self::Decode(message) => write!(f, "malformed insights response: {message}"),
        }
    }
}

impl Error for UpstreamError {}

pub struct InsightsGateway {
    client: Client,
    base_url: String,
}

impl InsightsGateway {
    pub fn new(config: &InsightsConfig) -> Result<Self, UpstreamError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|err| UpstreamError::Client(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_predictions(&self, query: &InsightsQuery) -> Vec<Prediction> {
        self.fetch_or(PREDICTIONS_PATH, query, fallback_predictions)
    }

    pub fn fetch_anomalies(&self, query: &InsightsQuery) -> Vec<Anomaly> {
        self.fetch_or(ANOMALIES_PATH, query, fallback_anomalies)
    }

    pub fn fetch_insights(&self, query: &InsightsQuery) -> Vec<Insight> {
        self.fetch_or(INSIGHTS_PATH, query, fallback_insights)
    }

    pub fn fetch_productivity_score(&self, query: &InsightsQuery) -> ProductivityScore {
        self.fetch_or(PRODUCTIVITY_SCORE_PATH, query, fallback_productivity_score)
    }

    /// Whether the service answers its health probe with a 2xx status.
    pub fn health(&self) -> bool {
        match self.client.get(self.endpoint(HEALTH_PATH)).send() {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(
                    "event=insights_health module=insights status=error class={}",
                    UpstreamError::from_reqwest(err).class()
                );
                false
            }
        }
    }

    /// One GET against `path`, decoded as `T`.
    pub fn try_fetch<T>(&self, path: &str, query: &InsightsQuery) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.endpoint(path))
            .query(&query.params())
            .send()
            .map_err(UpstreamError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.text().map_err(UpstreamError::from_reqwest)?;
        serde_json::from_str(&body).map_err(|err| UpstreamError::Decode(err.to_string()))
    }

    fn fetch_or<T, F>(&self, path: &'static str, query: &InsightsQuery, fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let started_at = Instant::now();
        match self.try_fetch(path, query) {
            Ok(value) => {
                debug!(
                    "event=insights_fetch module=insights status=ok endpoint={} duration_ms={}",
                    path,
                    started_at.elapsed().as_millis()
                );
                value
            }
            Err(err) => {
                warn!(
                    "event=insights_fetch module=insights status=fallback endpoint={} class={} duration_ms={}",
                    path,
                    err.class(),
                    started_at.elapsed().as_millis()
                );
                fallback()
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
