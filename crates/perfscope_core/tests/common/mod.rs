#![allow(dead_code)]

use perfscope_core::model::metric::Metric;
use perfscope_core::model::objective::{Objective, ObjectiveStatus};
use perfscope_core::repo::RecordStore;
use perfscope_core::{Actor, Department, InsightsConfig, InsightsGateway, Role};

pub struct People {
    pub department: Department,
    pub employee: Actor,
    pub peer: Actor,
    pub manager: Actor,
    pub head: Actor,
}

pub fn seed_people<S: RecordStore>(store: &S) -> People {
    let department = Department::new("Operations", "OPS");
    store.actors().create_department(&department).unwrap();

    let create = |name: &str, role: Role| {
        let actor = Actor::new(name, format!("{name}@example.org"), role).in_department(department.id);
        store.actors().create_actor(&actor).unwrap();
        actor
    };

    People {
        employee: create("erin", Role::Employee),
        peer: create("pat", Role::Employee),
        manager: create("morgan", Role::Manager),
        head: create("harper", Role::DepartmentHead),
        department,
    }
}

pub fn add_objective<S: RecordStore>(
    store: &S,
    owner: &Actor,
    status: ObjectiveStatus,
    progress: f64,
) -> Objective {
    let mut objective = Objective::new(format!("goal for {}", owner.name), owner.id, 0, 1_000);
    objective.status = status;
    objective.progress = progress;
    objective.department_id = owner.department_id;
    store.objectives().create_objective(&objective).unwrap();
    objective
}

pub fn add_metric<S: RecordStore>(
    store: &S,
    objective: &Objective,
    current: f64,
    target: f64,
) -> Metric {
    let mut metric = Metric::new("throughput", "items", target);
    metric.current = current;
    metric.objective_id = Some(objective.id);
    metric.department_id = objective.department_id;
    store.metrics().create_metric(&metric).unwrap();
    metric
}

/// Gateway pointed at a port nothing listens on.
pub fn offline_gateway() -> InsightsGateway {
    let port = {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    InsightsGateway::new(&InsightsConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        timeout_ms: 500,
    })
    .unwrap()
}
