use std::sync::Arc;

use async_trait::async_trait;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::mail::Mailer;
use crate::models::{Appointment, Contact};
use crate::queue::JobHandler;

pub const CANCELLATION_MAIL: &str = "cancellation-mail";

/// Everything needed to tell a provider that a client cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationMailPayload {
    pub appointment: Appointment,
    pub client: Contact,
    pub provider: Contact,
}

/// Mails the provider about a cancelled appointment.
///
/// Redelivery sends the same mail again; nothing here deduplicates.
pub struct CancellationMail {
    mailer: Arc<dyn Mailer>,
}

impl CancellationMail {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl JobHandler for CancellationMail {
    async fn handle(&self, payload: Value) -> eyre::Result<()> {
        let CancellationMailPayload {
            appointment,
            client,
            provider,
        } = serde_json::from_value(payload).wrap_err("malformed cancellation-mail payload")?;

        let recipient = format!("{} <{}>", provider.name, provider.email);
        let data = json!({
            "subject": "Appointment cancelled",
            "provider": provider.name,
            "client": client.name,
            "date": appointment.date.format("%B %-d, at %H:%M").to_string(),
        });

        self.mailer
            .send("cancellation", &recipient, &data)
            .await
            .wrap_err_with(|| format!("failed to mail cancellation of appointment {}", appointment.id))
    }
}
