//! Role models

use chrono::{DateTime, Utc};
use common::validation::{FieldError, Validate, Validator, validate_required};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::permission::Permission;

/// Role names are stored trimmed and lower-cased
pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Role with every permission and the ids granted to it
#[derive(Debug, Clone, Serialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub selected: Vec<i32>,
}

/// Create or rename a role
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRequest {
    pub name: String,
}

impl Validate for RoleRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("name", validate_required(&self.name, "Name"))
            .finish()
    }
}

/// Replace the full set of permissions granted to a role
#[derive(Debug, Clone, Deserialize)]
pub struct AssignPermissionsRequest {
    pub permission_ids: Vec<i32>,
}

impl AssignPermissionsRequest {
    /// Requested ids without duplicates, in ascending order
    pub fn distinct_ids(&self) -> Vec<i32> {
        self.permission_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
