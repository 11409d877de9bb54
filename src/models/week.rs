use chrono::{DateTime, Utc};
use serde::Serialize;

/// Totals for one week of a pay period, derived on every read from the live
/// entry set and never persisted.
///
/// Approval flags start `true` so that folding entries can AND-accumulate:
/// a week is approved only if every contributing entry is approved. The
/// aggregator forces both flags to `false` when there are no entries at all.
#[derive(Debug, Clone, Serialize)]
pub struct WeekTotals {
    /// Accumulated duration in seconds.
    pub duration: i64,
    /// Seconds beyond the standard work week.
    pub overtime: i64,
    pub personal_leave_duration: i64,
    pub has_errors: bool,
    pub approved: bool,
    pub approval_time: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
    pub employee_approved: bool,
    pub employee_approval_time: Option<DateTime<Utc>>,
    pub is_clocked_in: bool,
}

impl Default for WeekTotals {
    fn default() -> Self {
        WeekTotals {
            duration: 0,
            overtime: 0,
            personal_leave_duration: 0,
            has_errors: false,
            approved: true,
            approval_time: None,
            approved_by: None,
            employee_approved: true,
            employee_approval_time: None,
            is_clocked_in: false,
        }
    }
}
