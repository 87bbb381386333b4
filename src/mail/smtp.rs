//! SMTP mailer over lettre's async transport

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::ServerConfig;
use crate::error::{AuthError, Result};
use crate::mail::Mailer;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a TLS relay transport from the mail configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.mail_host)
            .map_err(|e| AuthError::ConfigError(format!("SMTP relay setup failed: {}", e)))?
            .credentials(Credentials::new(
                config.mail_user.clone(),
                config.mail_pass.clone(),
            ))
            .build();

        let from: Mailbox = format!("{} <{}>", config.mail_from_name, config.mail_user)
            .parse()
            .map_err(|e| {
                AuthError::ConfigError(format!("MAIL_USER is not a valid address: {}", e))
            })?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let to_mailbox: Mailbox = to.parse().map_err(|e| {
            AuthError::Internal(format!("Recipient address is not valid: {}", e))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AuthError::Internal(format!("Mail message build failed: {}", e)))?;

        self.transport.send(message).await.map_err(|e| {
            log::error!("Mail delivery to {} failed: {}", to, e);
            AuthError::Internal(format!("Mail delivery failed: {}", e))
        })?;

        log::debug!("Mail sent to {}: {}", to, subject);
        Ok(())
    }
}
