//! Application services.
//!
//! Each service is constructed with the ports it needs and holds no state of
//! its own beyond them, so one instance can serve concurrent requests.

pub mod availability;
pub mod cancellation;
pub mod notifications;
pub mod scheduling;

use serde::Serialize;

use crate::errors::SideEffectWarning;

pub use availability::AvailabilityService;
pub use cancellation::CancellationPolicy;
pub use notifications::NotificationService;
pub use scheduling::SchedulingService;

/// A successful primary operation plus the side effect that may have failed.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<SideEffectWarning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, warning: Option<SideEffectWarning>) -> Self {
        Self { value, warning }
    }

    pub fn is_complete(&self) -> bool {
        self.warning.is_none()
    }
}
