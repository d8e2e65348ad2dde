//! Actor (employee/manager) record.
//!
//! # Invariants
//! - `role` is already parsed; raw labels never leave the identity boundary.
//! - `department_id` is optional; actors without a department can still own
//!   objectives.

use crate::model::role::{parse_role_label, Role, RoleError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable actor identifier.
pub type ActorId = Uuid;

/// Stable department identifier.
pub type DepartmentId = Uuid;

/// Authenticated requester or persisted person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub designation: Option<String>,
    pub department_id: Option<DepartmentId>,
}

impl Actor {
    /// Creates an actor with a generated id.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
            designation: None,
            department_id: None,
        }
    }

    /// Builds an actor from identity data carrying a raw role label.
    ///
    /// This is the only place a label is interpreted.
    pub fn from_identity(
        id: ActorId,
        name: impl Into<String>,
        email: impl Into<String>,
        role_label: &str,
        department_id: Option<DepartmentId>,
    ) -> Result<Self, RoleError> {
        Ok(Self {
            id,
            name: name.into(),
            email: email.into(),
            role: parse_role_label(role_label)?,
            designation: None,
            department_id,
        })
    }

    /// Sets the department and returns `self`.
    pub fn in_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn can_act_as_manager(&self) -> bool {
        self.role.can_act_as_manager()
    }
}

/// Department record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    /// Unique short code such as `MEITY`.
    pub code: String,
}

impl Department {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
        }
    }
}
