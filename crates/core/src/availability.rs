//! # Availability
//!
//! Derives a provider's free and busy hours for one day.
//!
//! The time table is fixed: one slot per hour from 08:00 through 19:00, twelve
//! in total. A slot is available when it starts strictly after `now` and no
//! active appointment of the provider sits on that hour. The caller supplies
//! the candidate appointments; anything for another provider, cancelled, or off
//! the table is ignored, so an unfiltered set is harmless.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{Appointment, Slot};
use crate::time::{start_of_day, truncate_to_hour};

pub const FIRST_SLOT_HOUR: u32 = 8;
pub const LAST_SLOT_HOUR: u32 = 19;

pub fn compute_availability(
    provider_id: Uuid,
    day: NaiveDate,
    appointments: &[Appointment],
    now: DateTime<Utc>,
) -> Vec<Slot> {
    let midnight = start_of_day(day);

    (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
        .map(|hour| {
            let date_time = midnight + Duration::hours(i64::from(hour));
            let booked = appointments.iter().any(|a| {
                a.provider_id == provider_id && a.is_active() && truncate_to_hour(a.date) == date_time
            });

            Slot {
                time: format!("{hour:02}:00"),
                date_time,
                available: date_time > now && !booked,
            }
        })
        .collect()
}
