//! Email alert delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the
//! composite alert as one plain-text email to every configured recipient.
//! Configuration is read through a key lookup (the process environment in
//! the agent); if `SMTP_HOST` is not set, [`EmailConfig::from_lookup`]
//! returns `Ok(None)` and no mailer should be constructed.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Mailboxes};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sysmon_core::alert::Alert;

use crate::dispatcher::{AlertChannel, DispatchError};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email configuration and delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// A setting required once `SMTP_HOST` is set is missing.
    #[error("Missing email setting: {0}")]
    MissingSetting(&'static str),

    /// A setting is present but cannot be used.
    #[error("Invalid email setting {name}: '{value}'")]
    InvalidSetting { name: &'static str, value: String },

    /// The recipient list was empty.
    #[error("At least one alert recipient is required")]
    NoRecipients,
}

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

/// A non-empty, ordered list of recipient mailboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<Mailbox>);

impl Recipients {
    /// Wrap a single recipient.
    pub fn single(mailbox: Mailbox) -> Self {
        Self(vec![mailbox])
    }

    /// Build from a list, rejecting an empty one.
    pub fn new(mailboxes: Vec<Mailbox>) -> Result<Self, EmailError> {
        if mailboxes.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        Ok(Self(mailboxes))
    }

    /// Parse an RFC 5322 address list (`a@x, "Doe, Jane" <j@x>`).
    ///
    /// Commas inside quoted display names do not split entries.
    pub fn parse_list(raw: &str) -> Result<Self, EmailError> {
        if raw.split(',').all(|part| part.trim().is_empty()) {
            return Err(EmailError::NoRecipients);
        }
        let mailboxes: Mailboxes = raw.trim().parse()?;
        Self::new(mailboxes.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mailbox> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP relay hostname.
    pub smtp_host: String,
    /// SMTP relay port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: Mailbox,
    /// Login account. Defaults to the sender address.
    pub smtp_user: String,
    /// Login credential. No authentication is attempted without one.
    pub smtp_password: Option<String>,
    pub recipients: Recipients,
}

impl EmailConfig {
    /// Load configuration through a key lookup such as `std::env::var`.
    ///
    /// Returns `Ok(None)` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable           | Required           | Default        |
    /// |--------------------|--------------------|----------------|
    /// | `SMTP_HOST`        | yes                | —              |
    /// | `SMTP_PORT`        | no                 | `587`          |
    /// | `SMTP_FROM`        | yes                | —              |
    /// | `SMTP_USER`        | no                 | `SMTP_FROM`    |
    /// | `SMTP_PASSWORD`    | no                 | —              |
    /// | `ALERT_RECIPIENTS` | yes, address list  | —              |
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, EmailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(smtp_host) = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()) else {
            return Ok(None);
        };

        let from_raw = lookup("SMTP_FROM").ok_or(EmailError::MissingSetting("SMTP_FROM"))?;
        let from_address: Mailbox = from_raw.trim().parse()?;

        let recipients_raw =
            lookup("ALERT_RECIPIENTS").ok_or(EmailError::MissingSetting("ALERT_RECIPIENTS"))?;
        let recipients = Recipients::parse_list(&recipients_raw)?;

        let smtp_port = match lookup("SMTP_PORT") {
            None => DEFAULT_SMTP_PORT,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| EmailError::InvalidSetting {
                    name: "SMTP_PORT",
                    value: raw.clone(),
                })?,
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_user: lookup("SMTP_USER").unwrap_or_else(|| from_address.email.to_string()),
            from_address,
            smtp_password: lookup("SMTP_PASSWORD"),
            recipients,
        }))
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends threshold alerts as email via an SMTP relay.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Assemble the plain-text message for an alert.
    pub fn build_message(&self, alert: &Alert) -> Result<Message, EmailError> {
        let mut builder = Message::builder()
            .from(self.config.from_address.clone())
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        for recipient in self.config.recipients.iter() {
            builder = builder.to(recipient.clone());
        }

        builder
            .body(alert.body.clone())
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    /// Send an alert to every configured recipient over a STARTTLS session.
    pub async fn deliver(&self, alert: &Alert) -> Result<(), EmailError> {
        let email = self.build_message(alert)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let Some(pass) = &self.config.smtp_password {
            transport_builder = transport_builder
                .credentials(Credentials::new(self.config.smtp_user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(
            recipients = self.config.recipients.len(),
            subject = %alert.subject,
            "Alert email sent"
        );
        Ok(())
    }
}

#[async_trait]
impl AlertChannel for EmailDelivery {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, alert: &Alert) -> Result<(), DispatchError> {
        self.deliver(alert).await.map_err(DispatchError::from)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
