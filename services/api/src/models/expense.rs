//! Expense models

use chrono::NaiveDate;
use common::{
    http::ApiError,
    validation::{FieldError, Validate, Validator, validate_date, validate_required},
};
use serde::{Deserialize, Serialize};

use super::{Numeric, UserSummary, required_date};
use crate::money::{serialize_cents, to_cents};

fn validate_amount(amount: &Numeric) -> Result<(), String> {
    match amount.value() {
        Ok(Some(value)) if to_cents(value).is_some_and(|c| c > 0) => Ok(()),
        Ok(Some(_)) => Err("Amount must be greater than zero".to_string()),
        Ok(None) => Err("Amount is required".to_string()),
        Err(()) => Err("Amount must be a valid number".to_string()),
    }
}

fn amount_cents(amount: &Numeric) -> Result<i64, ApiError> {
    amount
        .value()
        .ok()
        .flatten()
        .and_then(to_cents)
        .filter(|c| *c > 0)
        .ok_or_else(|| {
            ApiError::Validation(vec![FieldError::new("amount", "Amount is not valid")])
        })
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseRequest {
    pub player_id: i32,
    pub amount: Numeric,
    pub description: String,
    pub occurred_on: String,
}

impl Validate for CreateExpenseRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("amount", validate_amount(&self.amount))
            .check("description", validate_required(&self.description, "Description"))
            .check("occurred_on", validate_date(&self.occurred_on, "Date"))
            .finish()
    }
}

/// Normalized expense ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub player_id: i32,
    pub amount_cents: i64,
    pub description: String,
    pub occurred_on: NaiveDate,
}

impl CreateExpenseRequest {
    pub fn into_new_expense(self) -> Result<NewExpense, ApiError> {
        Ok(NewExpense {
            player_id: self.player_id,
            amount_cents: amount_cents(&self.amount)?,
            occurred_on: required_date("occurred_on", &self.occurred_on)?,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<Numeric>,
    pub description: Option<String>,
    pub occurred_on: Option<String>,
}

impl Validate for UpdateExpenseRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check_optional("amount", self.amount.as_ref(), validate_amount)
            .check_optional("description", self.description.as_deref(), |v| {
                validate_required(v, "Description")
            })
            .check_optional("occurred_on", self.occurred_on.as_deref(), |v| {
                validate_date(v, "Date")
            })
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub occurred_on: Option<NaiveDate>,
}

impl UpdateExpenseRequest {
    pub fn into_changes(self) -> Result<ExpenseChanges, ApiError> {
        Ok(ExpenseChanges {
            amount_cents: self.amount.as_ref().map(amount_cents).transpose()?,
            occurred_on: self
                .occurred_on
                .as_deref()
                .map(|v| required_date("occurred_on", v))
                .transpose()?,
            description: self.description.map(|d| d.trim().to_string()),
        })
    }
}

/// Player fields shown alongside an expense
#[derive(Debug, Clone, Serialize)]
pub struct ExpensePlayer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
}

/// Expense with the recording user and the player
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: i32,
    #[serde(serialize_with = "serialize_cents")]
    pub amount: i64,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub user: UserSummary,
    pub player: ExpensePlayer,
}
