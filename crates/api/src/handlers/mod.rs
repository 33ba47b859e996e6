pub mod appointments;
pub mod availability;
pub mod notifications;
pub mod schedule;
