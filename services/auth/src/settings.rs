//! Service settings

use serde::Deserialize;

/// Listener and link settings, read from `ACADEMY_`-prefixed variables
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Base URL of the web client, used in outgoing mail
    pub frontend_url: String,
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000_i64)?
            .set_default("frontend_url", "http://localhost:5173")?
            .add_source(config::Environment::with_prefix("ACADEMY").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
