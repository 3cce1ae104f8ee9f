//! HTTP plumbing shared by the services
//!
//! Error-to-response mapping, JSON body extraction with uniform rejection
//! messages, and the bearer-token middleware that turns a session token into
//! a [`crate::principal::Principal`] request extension.

pub mod auth;
pub mod error;
pub mod extract;

pub use auth::{Authenticator, require_auth};
pub use error::{ApiError, ApiResult};
pub use extract::{EntityId, JsonBody, ValidJson};
