//! Outgoing mail for the forgot-password flow
//!
//! [`SmtpEmailSender`] delivers through an SMTP relay with `lettre`. Without
//! `SMTP_HOST` the service refuses to start unless `MAIL_LOG_ONLY=true`, in
//! which case [`LogEmailSender`] records recipient and subject only.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::MailBody;

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "noreply@movieflix.local";

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("SMTP_HOST is not set; set MAIL_LOG_ONLY=true to run without outgoing mail")]
    NotConfigured,
}

/// Something that can deliver a [`MailBody`]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, mail: &MailBody) -> Result<(), EmailError>;
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables
    ///
    /// Returns `None` when `SMTP_HOST` is unset. Other variables:
    /// `SMTP_PORT` (default 587), `SMTP_FROM`, `SMTP_USER`, `SMTP_PASSWORD`.
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends mail through a STARTTLS SMTP relay
pub struct SmtpEmailSender {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from: config.from_address.parse()?,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, mail: &MailBody) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse()?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.text.clone())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport.send(message).await?;

        info!(to = %mail.to, subject = %mail.subject, "Email sent");
        Ok(())
    }
}

/// Drops messages, logging only who they were for; the body never reaches the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, mail: &MailBody) -> Result<(), EmailError> {
        info!(to = %mail.to, subject = %mail.subject, "Outgoing mail disabled, message dropped");
        Ok(())
    }
}

/// `MAIL_LOG_ONLY` set to `true` or `1`
pub fn log_only_from_env() -> bool {
    std::env::var("MAIL_LOG_ONLY")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false)
}

/// SMTP when configured, the log-only sender when explicitly allowed, an error otherwise
pub fn build_sender(
    config: Option<EmailConfig>,
    log_only: bool,
) -> Result<Arc<dyn EmailSender>, EmailError> {
    match config {
        Some(config) => {
            info!("Sending mail through {}:{}", config.smtp_host, config.smtp_port);
            Ok(Arc::new(SmtpEmailSender::new(&config)?))
        }
        None if log_only => {
            warn!("MAIL_LOG_ONLY set, reset codes will not be delivered");
            Ok(Arc::new(LogEmailSender))
        }
        None => Err(EmailError::NotConfigured),
    }
}

/// Keeps every message in memory
#[cfg(test)]
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: std::sync::Mutex<Vec<MailBody>>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<MailBody> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_sends(&self) {
        self.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, mail: &MailBody) -> Result<(), EmailError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(EmailError::Build("relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}
