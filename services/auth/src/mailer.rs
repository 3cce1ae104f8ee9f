//! Outgoing mail
//!
//! Mail goes through an HTTP mail API when `MAIL_API_URL` is set. Without it
//! the message is written to the log, which is what local development uses.

use serde::Serialize;
use std::env;
use thiserror::Error;
use tracing::{info, warn};

/// Mail configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

        MailConfig {
            api_url: non_empty("MAIL_API_URL"),
            api_key: non_empty("MAIL_API_KEY"),
            from: non_empty("MAIL_FROM").unwrap_or_else(|| "no-reply@academy.local".to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Build the password reset message carrying `code`
pub fn reset_code_message(to: &str, name: &str, code: &str, frontend_url: &str) -> Message {
    let link = format!("{}/reset-password", frontend_url.trim_end_matches('/'));
    Message {
        to: to.to_string(),
        subject: "Password recovery".to_string(),
        body: format!(
            "Hello {name},\n\n\
             Your password recovery code is {code}. It expires in {ttl} minutes.\n\
             Enter it at {link} to choose a new password.\n\n\
             If you did not request this, you can ignore this message.\n",
            ttl = common::credentials::RESET_CODE_TTL_MINUTES,
        ),
    }
}

#[derive(Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mail API client
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    async fn send(&self, message: &Message) -> Result<(), MailError> {
        let mut request = self.client.post(&self.url).json(&OutgoingMail {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        request.send().await?.error_for_status()?;
        Ok(())
    }
}

/// Mail transport injected into the application state
#[derive(Clone)]
pub enum Mailer {
    Http(HttpMailer),
    Log,
}

impl Mailer {
    pub fn from_config(config: MailConfig) -> Self {
        match config.api_url {
            Some(url) => Mailer::Http(HttpMailer {
                client: reqwest::Client::new(),
                url,
                api_key: config.api_key,
                from: config.from,
            }),
            None => {
                warn!("MAIL_API_URL not set, outgoing mail will only be logged");
                Mailer::Log
            }
        }
    }

    pub async fn send(&self, message: &Message) -> Result<(), MailError> {
        match self {
            Mailer::Http(mailer) => {
                mailer.send(message).await?;
                info!("Mail '{}' sent to {}", message.subject, message.to);
            }
            Mailer::Log => {
                info!(
                    "Mail to {} | {}\n{}",
                    message.to, message.subject, message.body
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn reset_message_carries_code_and_link() {
        let message = reset_code_message("ana@academy.test", "Ana", "48213", "http://localhost:5173/");

        assert_eq!(message.to, "ana@academy.test");
        assert!(message.body.contains("48213"));
        assert!(message.body.contains("http://localhost:5173/reset-password"));
        assert!(message.body.contains("15 minutes"));
    }

    #[test]
    #[serial]
    fn missing_api_url_selects_log_transport() {
        unsafe {
            env::remove_var("MAIL_API_URL");
            env::remove_var("MAIL_FROM");
        }

        let config = MailConfig::from_env();
        assert_eq!(config.from, "no-reply@academy.local");
        assert!(matches!(Mailer::from_config(config), Mailer::Log));
    }

    #[test]
    #[serial]
    fn api_url_selects_http_transport() {
        unsafe {
            env::set_var("MAIL_API_URL", "https://mail.example/send");
        }

        assert!(matches!(
            Mailer::from_config(MailConfig::from_env()),
            Mailer::Http(_)
        ));

        unsafe {
            env::remove_var("MAIL_API_URL");
        }
    }

    #[tokio::test]
    async fn log_transport_always_succeeds() {
        let message = reset_code_message("a@b.co", "A", "10000", "http://x");
        assert!(Mailer::Log.send(&message).await.is_ok());
    }
}
