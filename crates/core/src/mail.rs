//! # Mail
//!
//! Outbound mail port. Transport is supplied by the hosting process; the
//! [`LogMailer`] renders messages into the log for development and tests.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the message identified by `template_key` to `recipient`.
    ///
    /// `recipient` may be a bare address or `Name <address>`.
    async fn send(&self, template_key: &str, recipient: &str, template_data: &Value) -> Result<(), MailError>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    #[instrument(skip(self, template_data), fields(from = %self.from))]
    async fn send(&self, template_key: &str, recipient: &str, template_data: &Value) -> Result<(), MailError> {
        info!(data = %template_data, "Mail delivered to log");
        Ok(())
    }
}
