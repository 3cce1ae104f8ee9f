//! Staff account models

use chrono::{DateTime, Utc};
use common::{
    principal::RoleRef,
    validation::{
        FieldError, Validate, Validator, validate_email, validate_password, validate_required,
    },
};
use serde::{Deserialize, Serialize};

/// Emails are stored trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User projection returned by the API; never carries the password hash
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub enabled: bool,
    pub role: RoleRef,
}

/// Request for user registration
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: i32,
    pub password: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("email", validate_email(&self.email))
            .check("first_name", validate_required(&self.first_name, "First name"))
            .check("last_name", validate_required(&self.last_name, "Last name"))
            .check("password", validate_password(&self.password))
            .finish()
    }
}

/// Normalized user ready for storage
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: i32,
    pub password_hash: String,
}

/// Admin update of an account; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<i32>,
    pub enabled: Option<bool>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check_optional("email", self.email.as_deref(), validate_email)
            .check_optional("first_name", self.first_name.as_deref(), |v| {
                validate_required(v, "First name")
            })
            .check_optional("last_name", self.last_name.as_deref(), |v| {
                validate_required(v, "Last name")
            })
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: Option<i32>,
    pub enabled: Option<bool>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        UserChanges {
            email: request.email.as_deref().map(normalize_email),
            first_name: request.first_name.map(|v| v.trim().to_string()),
            last_name: request.last_name.map(|v| v.trim().to_string()),
            role_id: request.role_id,
            enabled: request.enabled,
        }
    }
}

/// Self-service profile update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check_optional("email", self.email.as_deref(), validate_email)
            .check_optional("first_name", self.first_name.as_deref(), |v| {
                validate_required(v, "First name")
            })
            .check_optional("last_name", self.last_name.as_deref(), |v| {
                validate_required(v, "Last name")
            })
            .finish()
    }
}

impl From<UpdateProfileRequest> for UserChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        UserChanges {
            email: request.email.as_deref().map(normalize_email),
            first_name: request.first_name.map(|v| v.trim().to_string()),
            last_name: request.last_name.map(|v| v.trim().to_string()),
            role_id: None,
            enabled: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub repeat_password: String,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let matches = if self.new_password == self.repeat_password {
            Ok(())
        } else {
            Err("Passwords do not match".to_string())
        };

        Validator::new()
            .check(
                "current_password",
                validate_required(&self.current_password, "Current password"),
            )
            .check("new_password", validate_password(&self.new_password))
            .check("repeat_password", matches)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ana.Quispe@Academy.TEST "), "ana.quispe@academy.test");
    }

    #[test]
    fn new_password_must_be_repeated() {
        let request = ChangePasswordRequest {
            current_password: "old".into(),
            new_password: "new-secret".into(),
            repeat_password: "new-secret ".into(),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "repeat_password");
    }

    #[test]
    fn new_password_must_not_be_empty() {
        let request = ChangePasswordRequest {
            current_password: "old".into(),
            new_password: "".into(),
            repeat_password: "".into(),
        };
        assert_eq!(request.validate().unwrap_err()[0].field, "new_password");
    }

    #[test]
    fn profile_update_never_touches_role_or_status() {
        let changes = UserChanges::from(UpdateProfileRequest {
            email: Some(" New@Mail.com".into()),
            first_name: None,
            last_name: Some(" Diaz ".into()),
        });
        assert_eq!(changes.email.as_deref(), Some("new@mail.com"));
        assert_eq!(changes.last_name.as_deref(), Some("Diaz"));
        assert_eq!(changes.role_id, None);
        assert_eq!(changes.enabled, None);
    }

    #[test]
    fn create_user_checks_every_field() {
        let request = CreateUserRequest {
            email: "bad".into(),
            first_name: "".into(),
            last_name: "".into(),
            role_id: 2,
            password: "".into(),
        };
        assert_eq!(request.validate().unwrap_err().len(), 4);
    }
}
