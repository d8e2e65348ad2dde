mod common;

use common::{add_objective, seed_people};
use perfscope_core::model::attachment::Attachment;
use perfscope_core::model::issue::Issue;
use perfscope_core::model::objective::{Objective, ObjectiveStatus};
use perfscope_core::repo::attachment_repo::AttachmentFilter;
use perfscope_core::repo::issue_repo::IssueFilter;
use perfscope_core::repo::objective_repo::ObjectiveFilter;
use perfscope_core::repo::RecordStore;
use perfscope_core::{open_db_in_memory, Actor, RepoError, Role, SqliteStore};
use uuid::Uuid;

#[test]
fn actor_round_trip_preserves_role_and_department() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    let loaded = store.actors().get_actor(people.head.id).unwrap().unwrap();
    assert_eq!(loaded, people.head);
    assert_eq!(loaded.role, Role::DepartmentHead);
    assert!(loaded.can_act_as_manager());
    assert!(store.actors().get_actor(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn titled_role_labels_from_seed_data_are_normalized() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO actors (id, name, email, role) VALUES (?1, 'Dana', 'dana@example.org', 'Department Head');",
        [id.to_string()],
    )
    .unwrap();

    let actor = store.actors().get_actor(id).unwrap().unwrap();
    assert_eq!(actor.role, Role::DepartmentHead);
}

#[test]
fn unknown_persisted_role_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO actors (id, name, email, role) VALUES (?1, 'Wiz', 'wiz@example.org', 'wizard');",
        [id.to_string()],
    )
    .unwrap();

    let err = store.actors().get_actor(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "got {err}");
}

#[test]
fn objectives_list_in_insertion_order_and_filter_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    let first = add_objective(&store, &people.employee, ObjectiveStatus::InProgress, 10.0);
    let second = add_objective(&store, &people.peer, ObjectiveStatus::Completed, 100.0);
    let third = add_objective(&store, &people.employee, ObjectiveStatus::Delayed, 5.0);

    let all = store
        .objectives()
        .list_objectives(&ObjectiveFilter::default())
        .unwrap();
    let ids: Vec<Uuid> = all.iter().map(|objective| objective.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    let mine = store
        .objectives()
        .list_objectives(&ObjectiveFilter {
            assignee_id: Some(people.employee.id),
            ..ObjectiveFilter::default()
        })
        .unwrap();
    assert_eq!(mine.len(), 2);

    let completed = store
        .objectives()
        .list_objectives(&ObjectiveFilter {
            status: Some(ObjectiveStatus::Completed),
            ..ObjectiveFilter::default()
        })
        .unwrap();
    assert_eq!(completed, vec![second]);
}

#[test]
fn invalid_objective_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    let mut objective = Objective::new("too far", people.employee.id, 0, 10);
    objective.progress = 120.0;
    let err = store.objectives().create_objective(&objective).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn updating_missing_rows_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    let ghost = Objective::new("ghost", people.employee.id, 0, 10);
    let err = store.objectives().update_objective(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { table: "objectives", .. }));

    let stranger = Actor::new("x", "x@example.org", Role::Employee);
    assert!(matches!(
        store.actors().update_actor(&stranger),
        Err(RepoError::NotFound { table: "actors", .. })
    ));
}

#[test]
fn objective_owners_follow_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    add_objective(&store, &people.peer, ObjectiveStatus::InProgress, 10.0);
    add_objective(&store, &people.employee, ObjectiveStatus::InProgress, 10.0);
    add_objective(&store, &people.peer, ObjectiveStatus::Completed, 100.0);

    let owners: Vec<Uuid> = store
        .actors()
        .list_objective_owners()
        .unwrap()
        .into_iter()
        .map(|actor| actor.id)
        .collect();
    // Actor insertion order, not objective order; the manager owns nothing.
    assert_eq!(owners, vec![people.employee.id, people.peer.id]);
}

#[test]
fn issues_list_newest_first_and_filter_by_involvement() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);

    let mut older = Issue::new("older", people.employee.id);
    older.created_at = 1_000;
    let mut newer = Issue::new("newer", people.peer.id);
    newer.created_at = 2_000;
    newer.assignee_id = Some(people.employee.id);
    let mut unrelated = Issue::new("unrelated", people.peer.id);
    unrelated.created_at = 1_500;
    for issue in [&older, &newer, &unrelated] {
        store.issues().create_issue(issue).unwrap();
    }

    let involving: Vec<String> = store
        .issues()
        .list_issues(&IssueFilter {
            involving: Some(people.employee.id),
            ..IssueFilter::default()
        })
        .unwrap()
        .into_iter()
        .map(|issue| issue.title)
        .collect();
    assert_eq!(involving, vec!["newer", "older"]);

    let all = store.issues().list_issues(&IssueFilter::default()).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].title, "newer");
}

#[test]
fn attachments_round_trip_and_cascade_with_objective() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let people = seed_people(&store);
    let objective = add_objective(&store, &people.employee, ObjectiveStatus::InProgress, 20.0);

    let mut attachment =
        Attachment::new(objective.id, people.employee.id, "plan.pdf", "blobs/plan.pdf");
    attachment.size_bytes = Some(4_096);
    attachment.mime_type = Some("application/pdf".to_string());
    store.attachments().create_attachment(&attachment).unwrap();

    let loaded = store
        .attachments()
        .get_attachment(attachment.id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, attachment);

    let by_department = store
        .attachments()
        .list_attachments(&AttachmentFilter {
            department_id: Some(people.department.id),
            ..AttachmentFilter::default()
        })
        .unwrap();
    assert_eq!(by_department.len(), 1);

    store.objectives().delete_objective(objective.id).unwrap();
    assert!(store
        .attachments()
        .get_attachment(attachment.id)
        .unwrap()
        .is_none());
}
