use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hour of a provider's daily time table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Wall-clock label, e.g. `"08:00"`.
    pub time: String,
    pub date_time: DateTime<Utc>,
    pub available: bool,
}
