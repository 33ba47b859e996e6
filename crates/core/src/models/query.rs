use serde::{Deserialize, Serialize};

/// `?date=` as sent by clients: epoch millis, `YYYY-MM-DD` or RFC 3339.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// `?page=`, 1-based.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}
