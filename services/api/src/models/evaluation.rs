//! Evaluation models

use chrono::{DateTime, Utc};
use common::validation::{FieldError, Validate, Validator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::evaluation_type::{EvaluationParameter, EvaluationType};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Value given to one parameter
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ParameterScore {
    pub parameter_id: i32,
    pub value: f64,
}

fn validate_scores(scores: &[ParameterScore]) -> Result<(), String> {
    if scores.is_empty() {
        return Err("At least one evaluation parameter is required".to_string());
    }

    let mut seen = HashSet::new();
    for score in scores {
        if !score.value.is_finite() || score.value < MIN_SCORE || score.value > MAX_SCORE {
            return Err(format!(
                "Value for parameter {} must be between {} and {}",
                score.parameter_id, MIN_SCORE, MAX_SCORE
            ));
        }
        if !seen.insert(score.parameter_id) {
            return Err(format!("Parameter {} is repeated", score.parameter_id));
        }
    }
    Ok(())
}

/// Split scores into the parallel arrays bound to `UNNEST`
pub fn score_columns(scores: &[ParameterScore]) -> (Vec<i32>, Vec<f64>) {
    scores.iter().map(|s| (s.parameter_id, s.value)).unzip()
}

/// First requested id absent from `known`, in request order
pub fn first_missing(requested: &[i32], known: &[i32]) -> Option<i32> {
    let known: HashSet<i32> = known.iter().copied().collect();
    requested.iter().copied().find(|id| !known.contains(id))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvaluationRequest {
    pub player_id: i32,
    pub type_id: i32,
    pub parameters: Vec<ParameterScore>,
}

impl Validate for CreateEvaluationRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("parameters", validate_scores(&self.parameters))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEvaluationRequest {
    pub parameters: Vec<ParameterScore>,
}

impl Validate for UpdateEvaluationRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("parameters", validate_scores(&self.parameters))
            .finish()
    }
}

/// Player fields shown alongside an evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedPlayer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
}

/// One scored parameter of an evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationDetail {
    pub id: i32,
    pub value: f64,
    pub parameter: EvaluationParameter,
}

/// Evaluation with its player, type and scored parameters
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub id: i32,
    pub evaluated_at: DateTime<Utc>,
    pub player: EvaluatedPlayer,
    pub evaluation_type: EvaluationType,
    pub details: Vec<EvaluationDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn score(parameter_id: i32, value: f64) -> ParameterScore {
        ParameterScore {
            parameter_id,
            value,
        }
    }

    #[test]
    fn scores_must_be_within_range() {
        assert!(validate_scores(&[score(1, 0.0), score(2, 10.0), score(3, 7.5)]).is_ok());
        assert!(validate_scores(&[score(1, -0.5)]).is_err());
        assert!(validate_scores(&[score(1, 10.1)]).is_err());
        assert!(validate_scores(&[score(1, f64::NAN)]).is_err());
    }

    #[test]
    fn at_least_one_distinct_parameter_is_required() {
        assert!(validate_scores(&[]).is_err());
        assert!(validate_scores(&[score(4, 5.0), score(4, 6.0)]).is_err());
    }

    #[test]
    fn request_parses_and_validates() {
        let request: CreateEvaluationRequest = serde_json::from_value(json!({
            "player_id": 3,
            "type_id": 1,
            "parameters": [{ "parameter_id": 2, "value": 8 }]
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let empty = UpdateEvaluationRequest { parameters: vec![] };
        assert_eq!(empty.validate().unwrap_err()[0].field, "parameters");
    }

    #[test]
    fn first_missing_keeps_request_order() {
        assert_eq!(first_missing(&[5, 2, 9], &[2, 5]), Some(9));
        assert_eq!(first_missing(&[7, 8], &[]), Some(7));
        assert_eq!(first_missing(&[1, 2], &[2, 1, 3]), None);
    }

    #[test]
    fn score_columns_stay_aligned() {
        let (ids, values) = score_columns(&[score(3, 4.0), score(1, 9.5)]);
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(values, vec![4.0, 9.5]);
    }
}
