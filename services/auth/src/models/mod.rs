//! Authentication service models

pub mod reset_token;
pub mod user;

// Re-export for convenience
pub use reset_token::{ForgotPasswordRequest, ResetPasswordRequest, ResetToken, VerifyCodeRequest};
pub use user::{LoginCredentials, LoginResponse, UserCredentials};
