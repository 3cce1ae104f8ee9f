//! Evaluation types and their parameters

use common::validation::{FieldError, Validate, Validator, validate_required};
use serde::{Deserialize, Serialize};

/// Evaluation type (e.g. "fisico", "tecnico")
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationType {
    pub id: i32,
    pub name: String,
    pub icon: Option<String>,
    pub enabled: bool,
}

/// Evaluation type with its parameters
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationTypeDetail {
    #[serde(flatten)]
    pub evaluation_type: EvaluationType,
    pub parameters: Vec<EvaluationParameter>,
}

/// Parameter measured within an evaluation type (e.g. "velocidad")
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationParameter {
    pub id: i32,
    pub type_id: i32,
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

/// Type and parameter names are stored trimmed and lower-cased
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvaluationTypeRequest {
    pub name: String,
    pub icon: Option<String>,
}

impl Validate for CreateEvaluationTypeRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("name", validate_required(&self.name, "Name"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEvaluationTypeRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
}

impl Validate for UpdateEvaluationTypeRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check_optional("name", self.name.as_deref(), |v| validate_required(v, "Name"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateParameterRequest {
    pub name: String,
    pub description: String,
    pub type_id: i32,
}

impl Validate for CreateParameterRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("name", validate_required(&self.name, "Name"))
            .check("description", validate_required(&self.description, "Description"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateParameterRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdateParameterRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check_optional("name", self.name.as_deref(), |v| validate_required(v, "Name"))
            .check_optional("description", self.description.as_deref(), |v| {
                validate_required(v, "Description")
            })
            .finish()
    }
}
