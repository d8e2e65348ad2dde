//! Role labels and the capabilities they grant.
//!
//! Identity data spells roles inconsistently ("manager", "Department Head",
//! "department_head"). Labels are normalized and parsed here exactly once;
//! callers ask [`Role::can_act_as_manager`] instead of comparing strings.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Closed set of roles known to core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    DepartmentHead,
    Admin,
}

impl Role {
    /// Canonical label persisted by the store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employee => ROLE_EMPLOYEE,
            Self::Manager => ROLE_MANAGER,
            Self::DepartmentHead => ROLE_DEPARTMENT_HEAD,
            Self::Admin => ROLE_ADMIN,
        }
    }

    /// Whether this role may read and mutate other actors' records.
    pub fn can_act_as_manager(self) -> bool {
        match self {
            Self::Employee => false,
            Self::Manager | Self::DepartmentHead | Self::Admin => true,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical label for [`Role::Employee`].
pub const ROLE_EMPLOYEE: &str = "employee";
/// Canonical label for [`Role::Manager`].
pub const ROLE_MANAGER: &str = "manager";
/// Canonical label for [`Role::DepartmentHead`].
pub const ROLE_DEPARTMENT_HEAD: &str = "department_head";
/// Canonical label for [`Role::Admin`].
pub const ROLE_ADMIN: &str = "admin";

const SUPPORTED_ROLE_LABELS: &[&str] = &[
    ROLE_EMPLOYEE,
    ROLE_MANAGER,
    ROLE_DEPARTMENT_HEAD,
    ROLE_ADMIN,
];

/// Returns canonical role labels.
pub fn supported_role_labels() -> &'static [&'static str] {
    SUPPORTED_ROLE_LABELS
}

/// Parses one role label coming from identity or seed data.
///
/// Matching is case-insensitive and treats spaces, `-` and `_` as the same
/// separator, so `"Department Head"` and `"department-head"` both resolve to
/// [`Role::DepartmentHead`].
pub fn parse_role_label(value: &str) -> Result<Role, RoleError> {
    let normalized = normalize_label(value);
    if normalized.is_empty() {
        return Err(RoleError::EmptyRole);
    }

    match normalized.as_str() {
        ROLE_EMPLOYEE | "intern" | "staff" => Ok(Role::Employee),
        ROLE_MANAGER => Ok(Role::Manager),
        ROLE_DEPARTMENT_HEAD | "head_of_department" => Ok(Role::DepartmentHead),
        ROLE_ADMIN | "administrator" => Ok(Role::Admin),
        _ => Err(RoleError::UnsupportedRole(value.trim().to_string())),
    }
}

fn normalize_label(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Role label parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    EmptyRole,
    UnsupportedRole(String),
}

impl Display for RoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRole => write!(f, "role label must not be empty"),
            Self::UnsupportedRole(value) => write!(f, "role label is unsupported: {value}"),
        }
    }
}

impl Error for RoleError {}

#[cfg(test)]
mod tests {
    use super::{parse_role_label, supported_role_labels, Role, RoleError};

    #[test]
    fn parses_canonical_labels() {
        for label in supported_role_labels() {
            let role = parse_role_label(label).expect("canonical label parse");
            assert_eq!(role.as_str(), *label);
        }
    }

    #[test]
    fn parses_seeded_titles_regardless_of_spelling() {
        assert_eq!(
            parse_role_label("Department Head").expect("titled label"),
            Role::DepartmentHead
        );
        assert_eq!(
            parse_role_label("  department-head ").expect("hyphenated label"),
            Role::DepartmentHead
        );
        assert_eq!(
            parse_role_label("Employee").expect("capitalized label"),
            Role::Employee
        );
        assert_eq!(parse_role_label("MANAGER").expect("upper"), Role::Manager);
        assert_eq!(parse_role_label("Intern").expect("alias"), Role::Employee);
    }

    #[test]
    fn rejects_empty_and_unknown_labels() {
        assert_eq!(
            parse_role_label("   ").expect_err("blank must fail"),
            RoleError::EmptyRole
        );
        assert_eq!(
            parse_role_label("Auditor").expect_err("unknown must fail"),
            RoleError::UnsupportedRole("Auditor".to_string())
        );
    }

    #[test]
    fn manager_capability_is_shared_by_every_supervising_role() {
        assert!(!Role::Employee.can_act_as_manager());
        assert!(Role::Manager.can_act_as_manager());
        assert!(Role::DepartmentHead.can_act_as_manager());
        assert!(Role::Admin.can_act_as_manager());
    }
}
