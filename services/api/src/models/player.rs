//! Player models

use chrono::NaiveDate;
use common::{
    http::ApiError,
    pagination::PageQuery,
    validation::{
        FieldError, Validate, Validator, validate_date, validate_one_of, validate_required,
    },
};
use serde::{Deserialize, Serialize};

use super::{Numeric, UserSummary, required_date, validate_numeric};
use crate::money::serialize_cents;

pub const DOMINANT_FEET: [&str; 2] = ["derecho", "izquierdo"];
pub const POSITIONS: [&str; 4] = ["delantero", "defensa", "portero", "mediocampista"];

/// Parameter ranked by the top players listing when none is given
pub const DEFAULT_TOP_PARAMETER: &str = "velocidad";

/// Player entity
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub registered_on: NaiveDate,
    pub identification: String,
    pub country: String,
    #[serde(serialize_with = "serialize_cents")]
    pub total_spent: i64,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub dominant_foot: String,
    pub position: String,
    pub active: bool,
    pub prospect: bool,
}

/// Player with the user who registered it
#[derive(Debug, Clone, Serialize)]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub player: Player,
    pub created_by: Option<UserSummary>,
}

/// Request for player registration
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlayerRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub registered_on: String,
    pub identification: String,
    pub country: String,
    pub height: Option<Numeric>,
    pub weight: Option<Numeric>,
    pub dominant_foot: String,
    pub position: String,
}

impl Validate for CreatePlayerRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("first_name", validate_required(&self.first_name, "First name"))
            .check("last_name", validate_required(&self.last_name, "Last name"))
            .check("birth_date", validate_date(&self.birth_date, "Birth date"))
            .check("registered_on", validate_date(&self.registered_on, "Registration date"))
            .check(
                "identification",
                validate_required(&self.identification, "Identification"),
            )
            .check("country", validate_required(&self.country, "Country"))
            .check_optional("height", self.height.as_ref(), |v| validate_numeric(v, "Height"))
            .check_optional("weight", self.weight.as_ref(), |v| validate_numeric(v, "Weight"))
            .check(
                "dominant_foot",
                validate_one_of(&self.dominant_foot, &DOMINANT_FEET, "Dominant foot"),
            )
            .check("position", validate_one_of(&self.position, &POSITIONS, "Position"))
            .finish()
    }
}

/// Normalized player fields ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub registered_on: NaiveDate,
    pub identification: String,
    pub country: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub dominant_foot: String,
    pub position: String,
}

fn measure(value: Option<&Numeric>) -> Option<f64> {
    value.and_then(|v| v.value().ok().flatten())
}

impl CreatePlayerRequest {
    pub fn into_new_player(self) -> Result<NewPlayer, ApiError> {
        Ok(NewPlayer {
            birth_date: required_date("birth_date", &self.birth_date)?,
            registered_on: required_date("registered_on", &self.registered_on)?,
            height: measure(self.height.as_ref()),
            weight: measure(self.weight.as_ref()),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            identification: self.identification.trim().to_string(),
            country: self.country.trim().to_string(),
            dominant_foot: self.dominant_foot,
            position: self.position,
        })
    }
}

/// Partial player update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlayerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub registered_on: Option<String>,
    pub identification: Option<String>,
    pub country: Option<String>,
    pub height: Option<Numeric>,
    pub weight: Option<Numeric>,
    pub dominant_foot: Option<String>,
    pub position: Option<String>,
}

impl Validate for UpdatePlayerRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check_optional("first_name", self.first_name.as_deref(), |v| {
                validate_required(v, "First name")
            })
            .check_optional("last_name", self.last_name.as_deref(), |v| {
                validate_required(v, "Last name")
            })
            .check_optional("birth_date", self.birth_date.as_deref(), |v| {
                validate_date(v, "Birth date")
            })
            .check_optional("registered_on", self.registered_on.as_deref(), |v| {
                validate_date(v, "Registration date")
            })
            .check_optional("identification", self.identification.as_deref(), |v| {
                validate_required(v, "Identification")
            })
            .check_optional("country", self.country.as_deref(), |v| {
                validate_required(v, "Country")
            })
            .check_optional("height", self.height.as_ref(), |v| validate_numeric(v, "Height"))
            .check_optional("weight", self.weight.as_ref(), |v| validate_numeric(v, "Weight"))
            .check_optional("dominant_foot", self.dominant_foot.as_deref(), |v| {
                validate_one_of(v, &DOMINANT_FEET, "Dominant foot")
            })
            .check_optional("position", self.position.as_deref(), |v| {
                validate_one_of(v, &POSITIONS, "Position")
            })
            .finish()
    }
}

/// Normalized partial update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub registered_on: Option<NaiveDate>,
    pub identification: Option<String>,
    pub country: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub dominant_foot: Option<String>,
    pub position: Option<String>,
}

impl UpdatePlayerRequest {
    pub fn into_changes(self) -> Result<PlayerChanges, ApiError> {
        let trimmed = |v: Option<String>| v.map(|s| s.trim().to_string());

        Ok(PlayerChanges {
            birth_date: self
                .birth_date
                .as_deref()
                .map(|v| required_date("birth_date", v))
                .transpose()?,
            registered_on: self
                .registered_on
                .as_deref()
                .map(|v| required_date("registered_on", v))
                .transpose()?,
            height: measure(self.height.as_ref()),
            weight: measure(self.weight.as_ref()),
            first_name: trimmed(self.first_name),
            last_name: trimmed(self.last_name),
            identification: trimmed(self.identification),
            country: trimmed(self.country),
            dominant_foot: self.dominant_foot,
            position: self.position,
        })
    }
}

/// Query parameters of the top players listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopPlayersQuery {
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

impl TopPlayersQuery {
    /// Parameter name to rank by, lower-cased like stored parameter names
    pub fn parameter(&self) -> String {
        self.order_by
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_TOP_PARAMETER)
            .to_lowercase()
    }

    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.clone(),
            size: self.size.clone(),
        }
    }
}

/// A player's mean value for one evaluation parameter
#[derive(Debug, Clone, Serialize)]
pub struct TopPlayer {
    pub player_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub parameter: String,
    pub average: f64,
}
