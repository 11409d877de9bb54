use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActionType, Entry, EntryType};

/// Fields for a brand new entry. `entry_date` defaults to "now" when
/// omitted; the owning pay period is resolved from it at write time.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub employee_id: i64,
    pub entry_type: EntryType,
    pub entry_date: Option<DateTime<Utc>>,
    pub duration: i64,
    pub note: String,
    pub user_id: i64,
}

/// Full replacement state for an existing entry. Timeclock entries keep
/// their stored duration no matter what the caller supplies.
#[derive(Debug, Clone)]
pub struct EntryUpdate {
    pub id: i64,
    pub employee_id: i64,
    pub entry_type: EntryType,
    pub entry_date: DateTime<Utc>,
    pub duration: i64,
    pub note: String,
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewAction {
    pub entry_id: i64,
    pub action_type: ActionType,
    pub time: DateTime<Utc>,
    pub ip: String,
    pub notes: serde_json::Value,
}

/// Caller-selectable knobs for a clock in/out request. `override_state`
/// forces the punch through even when the derived state says the employee is
/// already clocked in (or out).
#[derive(Debug, Clone, Default)]
pub struct ClockOptions {
    pub override_state: bool,
    pub user_id: i64,
    pub entry_id: Option<i64>,
    pub entry_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub ip: String,
}

/// Outcome of a clock action. A populated `warning` is not an error: it
/// reports a conflicting prior state (already clocked in/out) or a post-write
/// inconsistency and leaves the decision to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ClockActionResult {
    pub entry: Option<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// HTTP request bodies

#[derive(Debug, Deserialize)]
pub struct ClockInForm {
    pub login_code: String,
    #[serde(default, rename = "override")]
    pub override_state: bool,
    pub entry_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClockOutForm {
    pub login_code: String,
    #[serde(default, rename = "override")]
    pub override_state: bool,
    pub entry_id: Option<i64>,
    pub entry_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryForm {
    pub entry_type: EntryType,
    pub entry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub action_type: ActionType,
    pub time: DateTime<Utc>,
    pub notes: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustClockForm {
    pub action: ActionForm,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalForm {
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteEntryForm {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginCodeForm {
    pub login_code: String,
}
