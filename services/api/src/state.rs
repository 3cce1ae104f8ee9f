//! Application state shared across handlers

use common::http::Authenticator;
use sqlx::PgPool;

use crate::{
    repositories::{
        EvaluationRepository, EvaluationTypeRepository, ExpenseRepository, PermissionRepository,
        PlayerRepository, ReportRepository, RoleRepository, UserRepository,
    },
    settings::Settings,
    uploads::PhotoStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub players: PlayerRepository,
    pub evaluations: EvaluationRepository,
    pub evaluation_types: EvaluationTypeRepository,
    pub expenses: ExpenseRepository,
    pub users: UserRepository,
    pub roles: RoleRepository,
    pub permissions: PermissionRepository,
    pub reports: ReportRepository,
    pub authenticator: Authenticator,
    pub photos: PhotoStore,
    pub settings: Settings,
}

impl AppState {
    /// Wire every repository to `pool`
    pub fn new(pool: PgPool, authenticator: Authenticator, settings: Settings) -> Self {
        Self {
            players: PlayerRepository::new(pool.clone()),
            evaluations: EvaluationRepository::new(pool.clone()),
            evaluation_types: EvaluationTypeRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            roles: RoleRepository::new(pool.clone()),
            permissions: PermissionRepository::new(pool.clone()),
            reports: ReportRepository::new(pool, settings.report_months),
            authenticator,
            photos: PhotoStore::new(&settings.upload_dir),
            settings,
        }
    }
}
