use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A fixed 14-day billing window. Periods are contiguous and
/// non-overlapping; exactly one contains any given instant. `completed` is a
/// one-way flag and may only be set once the period has ended.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PayPeriod {
    pub id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub completed: bool,
}

impl PayPeriod {
    /// Start of the second week of the period.
    pub fn week_2_start(&self) -> DateTime<Utc> {
        self.start_date + Duration::days(7)
    }
}
