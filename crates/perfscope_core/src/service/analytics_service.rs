//! Overview, ranking and insights surfaces.

use crate::access::scope::{resolve_scope, Scope, ScopeRequest};
use crate::analytics::ranking::{attribute_records, rank, RankingRow};
use crate::analytics::stats::Overview;
use crate::error::ServiceResult;
use crate::insights::gateway::InsightsGateway;
use crate::insights::payload::{
    fallback_anomalies, fallback_insights, fallback_predictions, Anomaly, Insight, Prediction,
    ProductivityScore,
};
use crate::model::actor::{Actor, ActorId};
use crate::repo::metric_repo::MetricFilter;
use crate::repo::objective_repo::ObjectiveFilter;
use crate::repo::RecordStore;
use crate::service::{require_manager, resolve_actor};
use log::info;
use serde::Serialize;
use std::time::Instant;

/// Overview plus the three insights feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub scope: Scope,
    pub overview: Overview,
    pub predictions: Vec<Prediction>,
    pub anomalies: Vec<Anomaly>,
    pub insights: Vec<Insight>,
}

pub struct AnalyticsService<S: RecordStore> {
    store: S,
    gateway: InsightsGateway,
}

impl<S: RecordStore> AnalyticsService<S> {
    pub fn new(store: S, gateway: InsightsGateway) -> Self {
        Self { store, gateway }
    }

    /// Statistics for the scope `actor` resolves to.
    ///
    /// A manager-class target that does not exist is `NotFound`.
    pub fn get_overview(&self, actor: &Actor, target: Option<ActorId>) -> ServiceResult<Overview> {
        let scope = self.scope_for(actor, target)?;
        self.overview_for(scope)
    }

    /// Ranked rows over every actor owning at least one objective.
    pub fn get_team_rankings(&self, actor: &Actor) -> ServiceResult<Vec<RankingRow>> {
        require_manager(actor, "view team rankings")?;
        let started_at = Instant::now();

        let population = self.store.actors().list_objective_owners()?;
        let objectives = self
            .store
            .objectives()
            .list_objectives(&ObjectiveFilter::default())?;
        let metrics = self.store.metrics().list_metrics(&MetricFilter::default())?;

        let inputs = attribute_records(&population, &objectives, &metrics);
        let rows = rank(&inputs);

        info!(
            "event=team_rankings module=analytics status=ok actor_id={} population={} duration_ms={}",
            actor.id,
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(rows)
    }

    pub fn get_predictions(&self, actor: &Actor, target: Option<ActorId>) -> Vec<Prediction> {
        let scope = resolve_scope(actor, &ScopeRequest::for_target(target));
        self.gateway.fetch_predictions(&scope.insights_query())
    }

    pub fn get_anomalies(&self, actor: &Actor, target: Option<ActorId>) -> Vec<Anomaly> {
        let scope = resolve_scope(actor, &ScopeRequest::for_target(target));
        self.gateway.fetch_anomalies(&scope.insights_query())
    }

    pub fn get_insights(&self, actor: &Actor, target: Option<ActorId>) -> Vec<Insight> {
        let scope = resolve_scope(actor, &ScopeRequest::for_target(target));
        self.gateway.fetch_insights(&scope.insights_query())
    }

    pub fn get_productivity_score(
        &self,
        actor: &Actor,
        target: Option<ActorId>,
    ) -> ProductivityScore {
        let scope = resolve_scope(actor, &ScopeRequest::for_target(target));
        self.gateway.fetch_productivity_score(&scope.insights_query())
    }

    pub fn insights_available(&self) -> bool {
        self.gateway.health()
    }

    /// Overview computed while the insights calls run on scoped threads.
    pub fn dashboard(&self, actor: &Actor, target: Option<ActorId>) -> ServiceResult<Dashboard> {
        let started_at = Instant::now();
        let scope = self.scope_for(actor, target)?;
        let query = scope.insights_query();
        let gateway = &self.gateway;

        let (overview, predictions, anomalies, insights) = std::thread::scope(|threads| {
            let predictions = threads.spawn(|| gateway.fetch_predictions(&query));
            let anomalies = threads.spawn(|| gateway.fetch_anomalies(&query));
            let insights = threads.spawn(|| gateway.fetch_insights(&query));

            let overview = self.overview_for(scope);
            (
                overview,
                predictions.join().unwrap_or_else(|_| fallback_predictions()),
                anomalies.join().unwrap_or_else(|_| fallback_anomalies()),
                insights.join().unwrap_or_else(|_| fallback_insights()),
            )
        });

        let overview = overview?;
        info!(
            "event=dashboard module=analytics status=ok actor_id={} duration_ms={}",
            actor.id,
            started_at.elapsed().as_millis()
        );
        Ok(Dashboard {
            scope,
            overview,
            predictions,
            anomalies,
            insights,
        })
    }

    fn scope_for(&self, actor: &Actor, target: Option<ActorId>) -> ServiceResult<Scope> {
        let scope = resolve_scope(actor, &ScopeRequest::for_target(target));
        if let Scope::User(target_id) = scope {
            resolve_actor(&self.store, target_id)?;
        }
        Ok(scope)
    }

    fn overview_for(&self, scope: Scope) -> ServiceResult<Overview> {
        let objectives = self
            .store
            .objectives()
            .list_objectives(&scope.objective_filter())?;
        let metrics = self.store.metrics().list_metrics(&scope.metric_filter())?;
        Ok(Overview::compute(&objectives, &metrics))
    }
}
