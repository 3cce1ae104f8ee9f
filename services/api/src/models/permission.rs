//! Permission models

use chrono::{DateTime, Utc};
use common::validation::{FieldError, Validate, Validator, validate_required};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub description: Option<String>,
}

impl Validate for CreatePermissionRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("name", validate_required(&self.name, "Name"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePermissionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdatePermissionRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check_optional("name", self.name.as_deref(), |v| validate_required(v, "Name"))
            .finish()
    }
}
