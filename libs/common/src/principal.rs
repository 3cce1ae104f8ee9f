//! Authorization model
//!
//! A [`Principal`] is the authenticated actor of a request. It is built once
//! per request from a verified session token by joining the user, its role,
//! and the role's permission grants; it is never persisted on its own.
//!
//! Authorization is a pure check against the principal: role names compare
//! case-insensitively, permission names by exact set membership. There is no
//! hierarchy, wildcard, or inheritance across roles.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;

use crate::error::{RepoError, RepoResult};

/// Name of the role allowed to manage roles, permissions and staff accounts
pub const ADMIN_ROLE: &str = "admin";

/// Permission names seeded with the schema
pub mod permissions {
    pub const EXPENSES: &str = "gastos";
    pub const MANAGE_PLAYERS: &str = "mantener_jugadores";
    pub const TOP_PLAYERS: &str = "top_jugadores";
    pub const CONFIG: &str = "config";
    pub const MANAGE_EVALUATIONS: &str = "mantener_evaluacion";
    pub const MANAGE_USERS: &str = "mantener_usuario";
    pub const REPORTS: &str = "reportes";
    pub const HISTORY: &str = "historial";
}

/// Authorization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Access denied: role '{0}' required")]
    MissingRole(String),

    #[error("Access denied: permission '{0}' required")]
    MissingPermission(String),

    #[error("Account disabled, contact the administrator")]
    AccountDisabled,
}

/// Set of permission names granted to a role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Permission names in lexical order
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        PermissionSet(iter.into_iter().map(Into::into).collect())
    }
}

impl Serialize for PermissionSet {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.sorted())
    }
}

/// Role summary attached to a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRef {
    pub id: i32,
    pub name: String,
}

/// The authenticated actor of a request
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub enabled: bool,
    pub role: RoleRef,
    pub permissions: PermissionSet,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.name.eq_ignore_ascii_case(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn require_role(&self, role: &str) -> Result<(), AuthzError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AuthzError::MissingRole(role.to_lowercase()))
        }
    }

    pub fn require_admin(&self) -> Result<(), AuthzError> {
        self.require_role(ADMIN_ROLE)
    }

    pub fn require_permission(&self, permission: &str) -> Result<(), AuthzError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AuthzError::MissingPermission(permission.to_string()))
        }
    }

    /// Disabled accounts are rejected before any permission check
    pub fn ensure_enabled(&self) -> Result<(), AuthzError> {
        if self.enabled {
            Ok(())
        } else {
            Err(AuthzError::AccountDisabled)
        }
    }
}

/// Load a user together with its role and flattened permission grants
pub async fn resolve_principal(pool: &PgPool, user_id: i32) -> RepoResult<Principal> {
    info!("Resolving principal for user: {}", user_id);

    let row = sqlx::query(
        r#"
        SELECT u.id, u.email, u.first_name, u.last_name, u.photo, u.registered_at,
               u.enabled, r.id AS role_id, r.name AS role_name
        FROM users u
        INNER JOIN roles r ON r.id = u.role_id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::not_found("User"))?;

    let role_id: i32 = row.get("role_id");

    let permissions: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT p.name
        FROM role_permissions rp
        INNER JOIN permissions p ON p.id = rp.permission_id
        WHERE rp.role_id = $1
        "#,
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;

    Ok(Principal {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        photo: row.get("photo"),
        registered_at: row.get("registered_at"),
        enabled: row.get("enabled"),
        role: RoleRef {
            id: role_id,
            name: row.get("role_name"),
        },
        permissions: permissions.into_iter().collect(),
    })
}
