//! Common library for the academy backend
//!
//! This crate provides shared functionality used across the authentication
//! and API services: database connectivity and migrations, the error
//! taxonomy, credential and session-token handling, the role/permission
//! authorization model, pagination, and the HTTP plumbing both services
//! mount in front of their handlers.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, init_pool, health_check};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod credentials;
pub mod database;
pub mod envelope;
pub mod error;
pub mod http;
pub mod jwt;
pub mod pagination;
pub mod principal;
pub mod validation;
