//! Failure email composition and SMTP delivery.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::{DEFAULT_SMTP_PORT, NotifyConfig};
use crate::error::NotifyError;
use crate::runlog::RunLog;

/// Prefix of every failure email subject.
pub const SUBJECT_PREFIX: &str = "[commitcast failure]";

/// What happened to a failure notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Disabled,
    MissingConfig(Vec<&'static str>),
    Failed(String),
}

/// Sends one plain-text email per unrecoverable failure.
///
/// Never returns an error: every problem is logged and reported as an outcome.
pub struct FailureNotifier {
    config: NotifyConfig,
}

impl FailureNotifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }

    /// Send a failure email if notifications are enabled and configured.
    pub async fn notify(&self, subject: &str, details: &str, runlog: &dyn RunLog) -> NotifyOutcome {
        if !self.config.enabled {
            info!("Email notifications are disabled. Skipping failure email.");
            return NotifyOutcome::Disabled;
        }

        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            error!(
                "Missing email config variables: {}. Cannot send email.",
                missing.join(", ")
            );
            runlog.record(
                "Email Sending Error",
                &format!("Missing config variables: {}", missing.join(", ")),
            );
            return NotifyOutcome::MissingConfig(missing);
        }

        match self.send(subject, details).await {
            Ok(()) => {
                info!("Failure email sent successfully.");
                runlog.record(
                    "Failure Email Sent",
                    &format!("Sent notification for error: {}", subject),
                );
                NotifyOutcome::Sent
            }
            Err(e) => {
                error!("Failed to send failure email: {}", e);
                runlog.record("Email Sending Error", &e.to_string());
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }

    /// Build the email without sending it.
    pub fn compose(&self, subject: &str, details: &str) -> Result<Message, NotifyError> {
        let sender = self.config.effective_sender().unwrap_or_default();
        let recipient = self.config.recipient.as_deref().unwrap_or_default();

        Message::builder()
            .from(parse_mailbox(sender)?)
            .to(parse_mailbox(recipient)?)
            .subject(format!("{} {}", SUBJECT_PREFIX, subject))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "The commitcast run encountered a critical error and could not complete.\n\nError Details:\n{}",
                details
            ))
            .map_err(NotifyError::Compose)
    }

    async fn send(&self, subject: &str, details: &str) -> Result<(), NotifyError> {
        let message = self.compose(subject, details)?;

        let server = self.config.server.as_deref().unwrap_or_default();
        let port = self.config.port.unwrap_or(DEFAULT_SMTP_PORT);
        let credentials = Credentials::new(
            self.config.user.clone().unwrap_or_default(),
            self.config.password.clone().unwrap_or_default(),
        );

        info!(
            "Attempting to send failure email to {} via {}:{}",
            self.config.recipient.as_deref().unwrap_or_default(),
            server,
            port
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
            .map_err(NotifyError::Smtp)?
            .port(port)
            .credentials(credentials)
            .build();

        mailer.send(message).await.map_err(NotifyError::Smtp)?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}
