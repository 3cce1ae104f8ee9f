//! First administrator account

use anyhow::Result;
use common::{credentials::hash_password, principal::ADMIN_ROLE};
use tracing::info;

use crate::{
    models::user::{NewUser, normalize_email},
    repositories::UserRepository,
    settings::Settings,
};

/// Create the configured administrator unless an account with that email exists
///
/// Returns the id of the created user.
pub async fn ensure_admin(users: &UserRepository, settings: &Settings) -> Result<Option<i32>> {
    let Some((email, password)) = settings.admin_credentials() else {
        info!("No administrator credentials configured, skipping bootstrap");
        return Ok(None);
    };

    let email = normalize_email(email);
    if users.find_id_by_email(&email).await?.is_some() {
        info!("Administrator {} already exists", email);
        return Ok(None);
    }

    let role_id = users.role_id_by_name(ADMIN_ROLE).await?;
    let admin = users
        .create(&NewUser {
            email,
            first_name: "Admin".to_string(),
            last_name: "Academy".to_string(),
            role_id,
            password_hash: hash_password(password)?,
        })
        .await?;

    info!("Created administrator {} ({})", admin.email, admin.id);
    Ok(Some(admin.id))
}
