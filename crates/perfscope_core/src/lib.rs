//! Core domain logic for perfscope.
//! This crate owns scoping, ownership and scoring rules; callers only
//! supply an authenticated actor.

pub mod access;
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod insights;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::scope::{resolve_scope, Scope, ScopeRequest};
pub use access::upload_guard::{authorize_upload, UploadDenied, UploadOperation};
pub use analytics::ranking::{rank, RankingRow};
pub use analytics::stats::{performance_score, ObjectiveStats, Overview};
pub use config::{ConfigError, CoreConfig, InsightsConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use error::{ErrorKind, ResourceKind, ServiceError, ServiceResult};
pub use insights::{InsightsGateway, InsightsQuery};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::actor::{Actor, ActorId, Department, DepartmentId};
pub use model::role::{parse_role_label, Role, RoleError};
pub use repo::{RecordStore, RepoError, RepoResult, SqliteStore};
pub use service::analytics_service::{AnalyticsService, Dashboard};
pub use service::issue_service::IssueService;
pub use service::metric_service::MetricService;
pub use service::objective_service::ObjectiveService;
pub use service::upload_service::UploadService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
