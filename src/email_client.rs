use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::configuration::EmailClientSettings;

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError>;
}

pub struct SmtpEmailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpEmailClient {
    pub fn new(settings: &EmailClientSettings) -> Result<Self, EmailError> {
        let sender: Mailbox = settings.sender.parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { transport, sender })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailClient {
    #[tracing::instrument(name = "Send email", skip(self, html_body))]
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

pub fn password_reset_link(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    )
}

pub fn password_reset_body(reset_link: &str) -> String {
    format!(
        r#"<html>
  <body>
    <h2>Password Reset Request</h2>
    <p>You requested to reset your password.</p>
    <p>Click the link below to reset your password:</p>
    <p><a href="{reset_link}">Reset Password</a></p>
    <p>Or copy and paste this link in your browser:</p>
    <p>{reset_link}</p>
    <p>This link will expire in 1 hour.</p>
    <p>If you didn't request this, please ignore this email.</p>
  </body>
</html>"#
    )
}
