//! Transactional email.
//!
//! Delivery goes through an HTTP relay when one is configured. Without a
//! relay the message is written to the log, which is what development uses.

use std::sync::Arc;

use async_trait::async_trait;
use edu_common::MailConfig;
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, body = %message.html, "Email (not delivered, no relay configured)");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to an HTTP email relay
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, url: String, api_key: Option<String>, from: String) -> Self {
        Self {
            client,
            url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: self.from.clone(),
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        info!("Email handed to relay");
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig, client: reqwest::Client) -> Arc<dyn Mailer> {
    match &config.relay_url {
        Some(url) => Arc::new(HttpMailer::new(
            client,
            url.clone(),
            config.relay_api_key.clone(),
            format!("{} <{}>", config.from_name, config.from_address),
        )),
        None => Arc::new(LogMailer),
    }
}

pub fn verification_email(frontend_url: &str, to: &str, token: &str, ttl_minutes: i64) -> EmailMessage {
    let link = format!("{}/verify/{token}", frontend_url.trim_end_matches('/'));
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your email - EduResources".to_string(),
        html: format!(
            "<p>Hi,<br>Please verify your email by clicking below:<br><br>\
             <a href=\"{link}\">Verify Email</a><br><br>\
             This link will expire in {ttl_minutes} minutes.<br><br>\
             Thanks,<br>EduResources Team</p>"
        ),
    }
}

pub fn reset_email(frontend_url: &str, to: &str, token: &str, ttl_minutes: i64) -> EmailMessage {
    let link = format!("{}/reset-password/{token}", frontend_url.trim_end_matches('/'));
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your password - EduResources".to_string(),
        html: format!(
            "<p>Hi,<br>We received a request to reset your password.<br><br>\
             <a href=\"{link}\">Reset Password</a><br><br>\
             This link will expire in {ttl_minutes} minutes. \
             If you did not ask for this you can ignore this email.<br><br>\
             Thanks,<br>EduResources Team</p>"
        ),
    }
}
