//! Outgoing email
//!
//! The flows only know the [`Mailer`] seam; the SMTP transport lives in
//! [`smtp`]. Message bodies are inline HTML, matching what the frontend's
//! mail templates expect.

pub mod smtp;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::Result;

pub use smtp::SmtpMailer;

/// Email delivery interface
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single HTML email
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// Body of the password-reset email
pub fn reset_email_body(nombre: &str, reset_url: &str) -> String {
    format!(
        "<p>Hola {nombre},</p>\n\
         <p>Haz clic aquí para restablecer tu contraseña:</p>\n\
         <a href=\"{reset_url}\">Restablecer contraseña</a>"
    )
}

/// Body of the invite email carrying the temporary password
pub fn invite_email_body(nombre: &str, temp_password: &str, login_url: &str) -> String {
    format!(
        "<h2>Bienvenido {nombre}</h2>\n\
         <p>Tu contraseña temporal es:</p>\n\
         <p style=\"font-family: monospace; background: #eee; padding: 5px 10px;\">{temp_password}</p>\n\
         <a href=\"{login_url}\">Iniciar sesión</a>"
    )
}

/// A sent email captured by [`RecordingMailer`]
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mailer that records messages instead of delivering them.
/// Used by the integration tests to assert on invite/reset delivery.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}
