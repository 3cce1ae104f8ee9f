//! One-time password reset tokens

use chrono::{DateTime, Utc};
use common::{
    credentials::TokenKind,
    validation::{FieldError, Validate, Validator, validate_email, validate_password, validate_required},
};
use serde::Deserialize;

/// Persisted reset token
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub id: i32,
    pub value: String,
    pub kind: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// A token is usable while unexpired and of the expected kind
    pub fn is_usable(&self, kind: TokenKind, now: DateTime<Utc>) -> bool {
        self.kind == kind.as_str() && self.expires_at > now
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl Validate for ForgotPasswordRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("email", validate_email(&self.email))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

impl Validate for VerifyCodeRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("code", validate_required(&self.code, "Code"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub code: String,
    pub password: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Validator::new()
            .check("code", validate_required(&self.code, "Code"))
            .check("password", validate_password(&self.password))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(kind: &str, expires_in: Duration) -> ResetToken {
        let now = Utc::now();
        ResetToken {
            id: 1,
            value: "12345".to_string(),
            kind: kind.to_string(),
            user_id: 7,
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[test]
    fn unexpired_reset_token_is_usable() {
        let token = token("password_reset", Duration::minutes(10));
        assert!(token.is_usable(TokenKind::PasswordReset, Utc::now()));
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let expired = token("password_reset", Duration::minutes(-1));
        assert!(!expired.is_usable(TokenKind::PasswordReset, Utc::now()));

        let other_kind = token("email_confirmation", Duration::minutes(10));
        assert!(!other_kind.is_usable(TokenKind::PasswordReset, Utc::now()));
    }

    #[test]
    fn reset_request_needs_code_and_new_password() {
        let request = ResetPasswordRequest {
            code: "".to_string(),
            password: "".to_string(),
        };
        assert_eq!(request.validate().unwrap_err().len(), 2);
    }
}
