mod common;

use common::{add_metric, add_objective, offline_gateway, seed_people};
use perfscope_core::model::objective::ObjectiveStatus;
use perfscope_core::repo::RecordStore;
use perfscope_core::{
    open_db_in_memory, Actor, AnalyticsService, ErrorKind, ResourceKind, Role, ServiceError,
    SqliteStore,
};
use uuid::Uuid;

#[test]
fn actor_without_objectives_gets_zero_overview() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);
    let analytics = AnalyticsService::new(&store, offline_gateway());

    let overview = analytics.get_overview(&people.employee, None).unwrap();
    assert_eq!(overview.total_objectives, 0);
    assert_eq!(overview.completion_rate, 0.0);
    assert_eq!(overview.average_progress, 0.0);
    assert_eq!(overview.performance_score, 0);
    assert_eq!(overview.productivity_score, 0);
}

#[test]
fn overview_aggregates_mixed_statuses() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);
    let owner = &people.employee;

    let first = add_objective(&store, owner, ObjectiveStatus::Completed, 100.0);
    add_objective(&store, owner, ObjectiveStatus::Completed, 100.0);
    add_objective(&store, owner, ObjectiveStatus::InProgress, 50.0);
    add_objective(&store, owner, ObjectiveStatus::Delayed, 30.0);
    add_metric(&store, &first, 90.0, 100.0);

    let analytics = AnalyticsService::new(&store, offline_gateway());
    let overview = analytics.get_overview(owner, None).unwrap();
    assert_eq!(overview.total_objectives, 4);
    assert_eq!(overview.completed_objectives, 2);
    assert_eq!(overview.in_progress_objectives, 1);
    assert_eq!(overview.delayed_objectives, 1);
    assert_eq!(overview.completion_rate, 50.0);
    assert_eq!(overview.average_progress, 70.0);
    assert_eq!(overview.productivity_score, 90);
    assert_eq!(overview.performance_score, 70);
}

#[test]
fn non_manager_cannot_widen_scope_with_target() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);
    add_objective(&store, &people.employee, ObjectiveStatus::InProgress, 40.0);
    add_objective(&store, &people.peer, ObjectiveStatus::Completed, 100.0);
    add_objective(&store, &people.peer, ObjectiveStatus::Completed, 100.0);

    let analytics = AnalyticsService::new(&store, offline_gateway());
    let own = analytics.get_overview(&people.employee, None).unwrap();
    let with_target = analytics
        .get_overview(&people.employee, Some(people.peer.id))
        .unwrap();

    assert_eq!(with_target, own);
    assert_eq!(with_target.total_objectives, 1);
    assert_eq!(with_target.completed_objectives, 0);
}

#[test]
fn manager_views_target_or_everyone() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);
    add_objective(&store, &people.employee, ObjectiveStatus::InProgress, 40.0);
    add_objective(&store, &people.peer, ObjectiveStatus::Completed, 100.0);

    let analytics = AnalyticsService::new(&store, offline_gateway());
    let peer_view = analytics
        .get_overview(&people.manager, Some(people.peer.id))
        .unwrap();
    assert_eq!(peer_view.total_objectives, 1);
    assert_eq!(peer_view.completed_objectives, 1);

    let everyone = analytics.get_overview(&people.manager, None).unwrap();
    assert_eq!(everyone.total_objectives, 2);

    let err = analytics
        .get_overview(&people.manager, Some(Uuid::new_v4()))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: ResourceKind::Actor,
            ..
        }
    ));
}

#[test]
fn team_rankings_require_manager_class() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);
    let analytics = AnalyticsService::new(&store, offline_gateway());

    let err = analytics.get_team_rankings(&people.employee).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.status_class(), 403);

    assert!(analytics.get_team_rankings(&people.head).unwrap().is_empty());
}

#[test]
fn team_rankings_sort_descending_and_keep_tie_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    let extra = Actor::new("quinn", "quinn@example.org", Role::Employee)
        .in_department(people.department.id);
    store.actors().create_actor(&extra).unwrap();

    // employee and peer tie at 20; quinn leads with 70.
    add_objective(&store, &people.employee, ObjectiveStatus::InProgress, 50.0);
    add_objective(&store, &people.peer, ObjectiveStatus::InProgress, 50.0);
    add_objective(&store, &extra, ObjectiveStatus::Completed, 100.0);

    let analytics = AnalyticsService::new(&store, offline_gateway());
    let rows = analytics.get_team_rankings(&people.manager).unwrap();

    let order: Vec<Uuid> = rows.iter().map(|row| row.actor_id).collect();
    assert_eq!(order, vec![extra.id, people.employee.id, people.peer.id]);
    let ranks: Vec<usize> = rows.iter().map(|row| row.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    let scores: Vec<i64> = rows.iter().map(|row| row.performance_score).collect();
    assert_eq!(scores, vec![70, 20, 20]);
    assert_eq!(rows[0].completion_rate, 100.0);
    assert_eq!(rows[1].average_progress, 50.0);
    assert_eq!(rows[1].email, "erin@example.org");
}

#[test]
fn rankings_count_linked_metric_performance() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    let goal = add_objective(&store, &people.peer, ObjectiveStatus::InProgress, 50.0);
    add_metric(&store, &goal, 100.0, 100.0);
    add_objective(&store, &people.employee, ObjectiveStatus::InProgress, 50.0);

    let analytics = AnalyticsService::new(&store, offline_gateway());
    let rows = analytics.get_team_rankings(&people.head).unwrap();
    assert_eq!(rows[0].actor_id, people.peer.id);
    assert_eq!(rows[0].performance_score, 50);
    assert_eq!(rows[1].performance_score, 20);
}
