//! Repositories for database operations
//!
//! Each repository owns a pool handle and returns [`common::error::RepoResult`];
//! composite mutations run inside a single transaction.

pub mod evaluation;
pub mod evaluation_type;
pub mod expense;
pub mod permission;
pub mod player;
pub mod report;
pub mod role;
pub mod user;

pub use evaluation::EvaluationRepository;
pub use evaluation_type::EvaluationTypeRepository;
pub use expense::ExpenseRepository;
pub use permission::PermissionRepository;
pub use player::PlayerRepository;
pub use report::ReportRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

use sqlx::{Row, postgres::PgRow};

use crate::models::UserSummary;

/// `ILIKE` pattern matching `term` anywhere, with wildcards in `term` escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Read a user summary from columns prefixed with `prefix`
pub(crate) fn user_summary(row: &PgRow, prefix: &str) -> UserSummary {
    UserSummary {
        id: row.get(format!("{prefix}id").as_str()),
        email: row.get(format!("{prefix}email").as_str()),
        first_name: row.get(format!("{prefix}first_name").as_str()),
        last_name: row.get(format!("{prefix}last_name").as_str()),
        photo: row.get(format!("{prefix}photo").as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wraps_term() {
        assert_eq!(contains_pattern("ana"), "%ana%");
    }

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
