//! Background jobs handled by the notification queue.

pub mod cancellation_mail;

use std::sync::Arc;

use crate::errors::AgendaResult;
use crate::mail::Mailer;
use crate::queue::NotificationQueue;

pub use cancellation_mail::{CANCELLATION_MAIL, CancellationMail, CancellationMailPayload};

/// Registers every job type on `queue`.
///
/// Both the enqueuing API process and the consuming worker call this, so that
/// enqueue can reject unknown types and the worker can run them.
pub fn register_all(queue: &mut NotificationQueue, mailer: Arc<dyn Mailer>) -> AgendaResult<()> {
    queue.register(CANCELLATION_MAIL, Arc::new(CancellationMail::new(mailer)))?;
    Ok(())
}
