//! API models for request and response payloads

use chrono::NaiveDate;
use common::{
    http::ApiError,
    validation::{FieldError, parse_date},
};
use serde::{Deserialize, Serialize};

pub mod evaluation;
pub mod evaluation_type;
pub mod expense;
pub mod permission;
pub mod player;
pub mod report;
pub mod role;
pub mod user;

/// `?query=` parameter of the search endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

impl SearchQuery {
    /// Trimmed search term, `None` when blank
    pub fn term(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// A number sent either as a JSON number or as a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Parsed value; a blank string counts as absent
    pub fn value(&self) -> Result<Option<f64>, ()> {
        match self {
            Numeric::Number(n) if n.is_finite() => Ok(Some(*n)),
            Numeric::Number(_) => Err(()),
            Numeric::Text(s) if s.trim().is_empty() => Ok(None),
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or(()),
        }
    }
}

pub fn validate_numeric(value: &Numeric, label: &str) -> Result<(), String> {
    value
        .value()
        .map(|_| ())
        .map_err(|_| format!("{} must be a valid number", label))
}

/// Parse a date field that has already passed validation
pub(crate) fn required_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    parse_date(value).ok_or_else(|| {
        ApiError::Validation(vec![FieldError::new(field, "Not a valid date")])
    })
}

/// Creator or recorder of a record
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
}
