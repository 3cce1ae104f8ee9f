//! Authentication service
//!
//! Login, session verification and the password recovery flow. Session
//! tokens are stateless; the resource API verifies them with the same secret.

pub mod mailer;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod settings;

use common::http::Authenticator;
use sqlx::PgPool;

use crate::{
    mailer::Mailer,
    repositories::{ResetTokenRepository, UserRepository},
    settings::Settings,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub reset_tokens: ResetTokenRepository,
    pub authenticator: Authenticator,
    pub mailer: Mailer,
    pub settings: Settings,
}
