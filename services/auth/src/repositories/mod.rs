//! Authentication service repositories

pub mod reset_token;
pub mod user;

pub use reset_token::ResetTokenRepository;
pub use user::UserRepository;
