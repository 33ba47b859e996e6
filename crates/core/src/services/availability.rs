use std::sync::Arc;

use uuid::Uuid;

use crate::availability::compute_availability;
use crate::clock::Clock;
use crate::errors::AgendaResult;
use crate::models::Slot;
use crate::repositories::AppointmentStore;
use crate::time::{day_bounds, parse_day};

/// Loads a provider's appointments for a day and feeds them to [`compute_availability`].
pub struct AvailabilityService {
    appointments: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { appointments, clock }
    }

    /// `day` is the raw query value; a missing or unparsable one is `InvalidInput`.
    pub async fn available(&self, provider_id: Uuid, day: Option<&str>) -> AgendaResult<Vec<Slot>> {
        let day = parse_day(day)?;
        let (start, end) = day_bounds(day);
        let appointments = self
            .appointments
            .find_active_for_provider_in_range(provider_id, start, end)
            .await?;

        Ok(compute_availability(provider_id, day, &appointments, self.clock.now()))
    }
}
