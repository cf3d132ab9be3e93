//! Thin SMTP wrapper used by the booking server for transactional mail.
//!
//! Keeps lettre out of the application crate: callers hand over an address,
//! a subject and a body, and get a `MailerError` they can log or ignore.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

#[derive(Debug, Clone)]
pub struct MailerOptions {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("SMTP relay error: {0}")]
    Relay(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("failed to send: {0}")]
    Send(String),
}

#[derive(Clone)]
pub struct MailerService {
    options: MailerOptions,
    credentials: Credentials,
}

impl MailerService {
    pub fn new(options: MailerOptions) -> Self {
        let credentials = Credentials::new(
            options.smtp_username.clone(),
            options.smtp_password.clone(),
        );
        Self {
            options,
            credentials,
        }
    }

    /// Send a plain-text email.
    ///
    /// The SMTP handshake is blocking, so it runs on the blocking pool.
    pub async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| MailerError::InvalidAddress(format!("from: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailerError::InvalidAddress(format!("to: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailerError::Message(e.to_string()))?;

        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map(|_| ())
                .map_err(|e| MailerError::Send(e.to_string()))
        })
        .await
        .map_err(|e| MailerError::Send(format!("send task failed: {e}")))?
    }

    /// Fresh transport per message; connection pooling is not worth the
    /// stale-connection failures at this volume.
    fn transport(&self) -> Result<SmtpTransport, MailerError> {
        Ok(SmtpTransport::relay(&self.options.smtp_host)
            .map_err(|e| MailerError::Relay(e.to_string()))?
            .port(self.options.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.options.from_name, self.options.from_address)
    }
}
