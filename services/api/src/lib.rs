//! Academy resource API
//!
//! Players, evaluations, expenses, staff accounts and the role/permission
//! catalogue, served behind session tokens issued by the auth service.

pub mod bootstrap;
pub mod models;
pub mod money;
pub mod repositories;
pub mod routes;
pub mod settings;
pub mod state;
pub mod uploads;

pub use state::AppState;
