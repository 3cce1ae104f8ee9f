//! Service settings

use serde::Deserialize;

/// Listener, storage and bootstrap settings, read from `ACADEMY_`-prefixed variables
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Directory holding uploaded profile photos
    pub upload_dir: String,
    /// Months covered by the expense section of a player report
    pub report_months: u32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001_i64)?
            .set_default("upload_dir", "uploads")?
            .set_default("report_months", 4_i64)?
            .add_source(config::Environment::with_prefix("ACADEMY").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Credentials of the administrator to create at startup, when both are set
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (self.admin_email.as_deref(), self.admin_password.as_deref()) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }
}
