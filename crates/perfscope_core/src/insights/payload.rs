//! Wire payloads of the insights service and their fallbacks.

use crate::model::actor::{ActorId, DepartmentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detection/creation time stamped on fallback records.
pub const FALLBACK_TIMESTAMP: &str = "2025-01-01T00:00:00Z";

/// Optional narrowing sent as query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsightsQuery {
    pub user_id: Option<ActorId>,
    pub department_id: Option<DepartmentId>,
}

impl InsightsQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(user_id) = self.user_id {
            params.push(("user_id", user_id.to_string()));
        }
        if let Some(department_id) = self.department_id {
            params.push(("department_id", department_id.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Shared by anomaly severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    PerformanceDrop,
    UnusualActivity,
    MissedDeadline,
    LowEngagement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Recommendation,
    Warning,
    Achievement,
    Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    pub goal_id: String,
    pub goal_title: String,
    pub predicted_completion: String,
    pub original_deadline: String,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub description: String,
    pub detected_at: String,
    pub affected_goals: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_items: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityScore {
    pub score: f64,
    pub trend: f64,
    #[serde(default)]
    pub factors: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

pub fn fallback_predictions() -> Vec<Prediction> {
    vec![Prediction {
        id: 1,
        goal_id: "1".to_string(),
        goal_title: "Digital Infrastructure Modernization".to_string(),
        predicted_completion: "2025-12-15".to_string(),
        original_deadline: "2025-12-31".to_string(),
        confidence: 92.0,
        risk_level: RiskLevel::Low,
        factors: vec![
            "Strong team performance".to_string(),
            "Adequate resources".to_string(),
            "Clear milestones".to_string(),
        ],
    }]
}

pub fn fallback_anomalies() -> Vec<Anomaly> {
    vec![Anomaly {
        id: 1,
        kind: AnomalyKind::PerformanceDrop,
        severity: Severity::High,
        description: "Significant decrease in productivity detected".to_string(),
        detected_at: FALLBACK_TIMESTAMP.to_string(),
        affected_goals: vec!["1".to_string(), "3".to_string()],
        confidence: 85.0,
    }]
}

pub fn fallback_insights() -> Vec<Insight> {
    vec![Insight {
        id: 1,
        kind: InsightKind::Recommendation,
        title: "Performance Optimization".to_string(),
        description:
            "Based on current trends, you are on track to exceed quarterly targets by 12%."
                .to_string(),
        confidence: 92.0,
        created_at: FALLBACK_TIMESTAMP.to_string(),
        action_items: None,
    }]
}

pub fn fallback_productivity_score() -> ProductivityScore {
    ProductivityScore {
        score: 0.0,
        trend: 0.0,
        factors: BTreeMap::new(),
        recommendations: vec![
            "Productivity insights are temporarily unavailable.".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::{
        fallback_anomalies, fallback_insights, fallback_predictions, InsightsQuery, Prediction,
        RiskLevel,
    };
    use uuid::Uuid;

    #[test]
    fn fallbacks_are_deterministic() {
        assert_eq!(fallback_predictions(), fallback_predictions());
        assert_eq!(fallback_anomalies(), fallback_anomalies());
        assert_eq!(fallback_insights(), fallback_insights());
    }

    #[test]
    fn fallback_prediction_is_low_risk() {
        let predictions = fallback_predictions();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].risk_level, RiskLevel::Low);
        assert_eq!(predictions[0].factors.len(), 3);
    }

    #[test]
    fn anomaly_type_serializes_as_type_field() {
        let json = serde_json::to_value(&fallback_anomalies()[0]).expect("serialize");
        assert_eq!(json["type"], "performance_drop");
        assert_eq!(json["severity"], "high");
    }

    #[test]
    fn prediction_decodes_snake_case_body() {
        let body = r#"{"id":7,"goal_id":"g","goal_title":"T","predicted_completion":"2026-01-01",
            "original_deadline":"2026-02-01","confidence":40.5,"risk_level":"high","factors":[]}"#;
        let prediction: Prediction = serde_json::from_str(body).expect("decode");
        assert_eq!(prediction.id, 7);
        assert_eq!(prediction.risk_level, RiskLevel::High);
    }

    #[test]
    fn query_params_skip_absent_fields() {
        assert!(InsightsQuery::default().params().is_empty());
        let user = Uuid::new_v4();
        let params = InsightsQuery {
            user_id: Some(user),
            department_id: None,
        }
        .params();
        assert_eq!(params, vec![("user_id", user.to_string())]);
    }
}
