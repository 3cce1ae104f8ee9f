//! User model as seen by the login flow

use common::{
    principal::Principal,
    validation::{FieldError, Validate, Validator, validate_email, validate_password},
};
use serde::{Deserialize, Serialize};

/// Stored credentials of a user
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub password_hash: String,
    pub enabled: bool,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl Validate for LoginCredentials {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("email", validate_email(&self.email))
            .check("password", validate_password(&self.password))
            .finish()
    }
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Principal,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_email_and_password() {
        let credentials = LoginCredentials {
            email: "not-an-email".to_string(),
            password: " ".to_string(),
        };

        let errors = credentials.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["email", "password"]);
    }

    #[test]
    fn well_formed_login_passes() {
        let credentials = LoginCredentials {
            email: "john@gmail.com".to_string(),
            password: "1234".to_string(),
        };
        assert!(credentials.validate().is_ok());
    }
}
