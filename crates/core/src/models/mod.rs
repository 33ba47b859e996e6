pub mod appointment;
pub mod availability;
pub mod job;
pub mod notification;
pub mod query;
pub mod user;

pub use appointment::Appointment;
pub use availability::Slot;
pub use job::{JobHandle, JobStatus, QueuedJob};
pub use notification::Notification;
pub use user::{Contact, ProviderSummary, User};
