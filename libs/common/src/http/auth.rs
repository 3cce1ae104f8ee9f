//! Bearer-token authentication middleware
//!
//! Every protected route runs behind [`require_auth`]. The token is verified,
//! the user is reloaded together with its role and permissions, and the
//! resulting [`Principal`] is inserted into the request extensions for the
//! handlers' own role and permission checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sqlx::PgPool;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::{
    error::RepoError,
    jwt::TokenService,
    principal::{Principal, resolve_principal},
};

/// Turns bearer tokens into principals
#[derive(Clone)]
pub struct Authenticator {
    pool: PgPool,
    tokens: TokenService,
}

impl Authenticator {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self { pool, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Verify `token` and load the enabled principal it names
    pub async fn authenticate(&self, token: &str) -> Result<Principal, ApiError> {
        let user_id = self.tokens.verify(token).map_err(|e| {
            debug!("Rejected session token: {}", e);
            ApiError::InvalidToken
        })?;

        let principal = resolve_principal(&self.pool, user_id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => {
                    warn!("Session token names unknown user: {}", user_id);
                    ApiError::InvalidToken
                }
                other => other.into(),
            })?;

        principal.ensure_enabled()?;

        Ok(principal)
    }
}

/// Authentication middleware
pub async fn require_auth(
    State(auth): State<Authenticator>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthenticated)?;

    let principal = auth.authenticate(bearer.token()).await?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
