use crate::models::{
    ActionType, ClockActionResult, ClockOptions, Employee, EntryType, EntryUpdate, NewAction,
    NewEntry, ServiceError,
};
use crate::repositories::EmployeeRepository;
use crate::services::EntryService;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub const WARNING_CLOCKED_IN: &str =
    "Currently clocked in or missing previous clock out action";
pub const WARNING_CLOCKED_OUT: &str =
    "Currently clocked out or missing previous clock in action";
pub const WARNING_ENTRY_NOT_FOUND: &str = "Entry not found.";
pub const WARNING_ENTRY_MISSING_AFTER_WRITE: &str = "Clock entry not found";
const LOGIN_ERROR: &str = "Invalid login code";

/// Punch-clock workflows: clock in/out, supervised adjustments and entry
/// deletion. Conflicting prior state (already clocked in/out) comes back as
/// a warning next to the existing entry, never as an error, so the caller
/// can decide whether to force an override.
pub struct ClockService {
    entries: Arc<EntryService>,
    employees: Arc<dyn EmployeeRepository>,
}

impl ClockService {
    pub fn new(entries: Arc<EntryService>, employees: Arc<dyn EmployeeRepository>) -> Self {
        Self { entries, employees }
    }

    async fn clock_action_employee(&self, login_code: &str) -> Result<Employee, ServiceError> {
        if login_code.is_empty() {
            return Err(ServiceError::Validation(LOGIN_ERROR.to_string()));
        }
        self.employees
            .find_by_login_code(login_code)
            .await?
            .ok_or_else(|| ServiceError::Validation(LOGIN_ERROR.to_string()))
    }

    fn action_notes(&self, options: &ClockOptions) -> serde_json::Value {
        json!({
            "notes": options.notes,
            "override": options.override_state,
            "userId": options.user_id,
        })
    }

    pub async fn clock_in(
        &self,
        login_code: &str,
        options: ClockOptions,
    ) -> Result<ClockActionResult, ServiceError> {
        let employee = self.clock_action_employee(login_code).await?;
        let entry_date = options.entry_date.unwrap_or_else(Utc::now);

        let existing = self
            .entries
            .load_latest_open_entry(employee.id, EntryType::Timeclock)
            .await?;
        if let Some(existing) = existing {
            if existing.is_clocked_in && !options.override_state {
                return Ok(ClockActionResult {
                    entry: Some(existing),
                    warning: Some(WARNING_CLOCKED_IN.to_string()),
                });
            }
        }

        let new_entry = self
            .entries
            .create_entry(NewEntry {
                employee_id: employee.id,
                entry_type: EntryType::Timeclock,
                entry_date: Some(entry_date),
                duration: 0,
                note: options.notes.clone().unwrap_or_default(),
                user_id: options.user_id,
            })
            .await?;
        self.entries
            .append_action(NewAction {
                entry_id: new_entry.id,
                action_type: ActionType::CLOCK_IN,
                time: entry_date,
                ip: options.ip.clone(),
                notes: self.action_notes(&options),
            })
            .await?;
        info!(employee_id = employee.id, entry_id = new_entry.id, "clock in");

        let entry = self.entries.load_entry(employee.id, new_entry.id).await?;
        let warning = entry
            .is_none()
            .then(|| WARNING_ENTRY_MISSING_AFTER_WRITE.to_string());
        Ok(ClockActionResult { entry, warning })
    }

    pub async fn clock_out(
        &self,
        login_code: &str,
        options: ClockOptions,
    ) -> Result<ClockActionResult, ServiceError> {
        let employee = self.clock_action_employee(login_code).await?;
        let entry_date = options.entry_date.unwrap_or_else(Utc::now);

        let existing = match options.entry_id {
            Some(entry_id) => self.entries.load_entry(employee.id, entry_id).await?,
            None => {
                self.entries
                    .load_latest_open_entry(employee.id, EntryType::Timeclock)
                    .await?
            }
        };

        let open = matches!(&existing, Some(entry) if entry.is_clocked_in);
        if !open {
            if options.override_state {
                // Forced clock-out without an open session: record an entry
                // carrying only the clock-out action.
                let new_entry = self
                    .entries
                    .create_entry(NewEntry {
                        employee_id: employee.id,
                        entry_type: EntryType::Timeclock,
                        entry_date: Some(entry_date),
                        duration: 0,
                        note: options.notes.clone().unwrap_or_default(),
                        user_id: options.user_id,
                    })
                    .await?;
                self.entries
                    .append_action(NewAction {
                        entry_id: new_entry.id,
                        action_type: ActionType::CLOCK_OUT,
                        time: entry_date,
                        ip: options.ip.clone(),
                        notes: self.action_notes(&options),
                    })
                    .await?;
                let entry = self.entries.load_entry(employee.id, new_entry.id).await?;
                let warning = entry
                    .is_none()
                    .then(|| WARNING_ENTRY_MISSING_AFTER_WRITE.to_string());
                return Ok(ClockActionResult { entry, warning });
            }
            if existing.is_some() {
                return Ok(ClockActionResult {
                    entry: existing,
                    warning: Some(WARNING_CLOCKED_OUT.to_string()),
                });
            }
            return Err(ServiceError::Validation(
                "Clock out failed. You are not clocked in.".to_string(),
            ));
        }

        let Some(existing) = existing else {
            return Err(ServiceError::Internal(
                "Open entry disappeared during clock out".to_string(),
            ));
        };
        self.entries
            .append_action(NewAction {
                entry_id: existing.id,
                action_type: ActionType::CLOCK_OUT,
                time: entry_date,
                ip: options.ip.clone(),
                notes: self.action_notes(&options),
            })
            .await?;
        self.entries
            .finalize_clock_out(&existing, entry_date)
            .await?;
        info!(employee_id = employee.id, entry_id = existing.id, "clock out");

        let entry = self.entries.load_entry(employee.id, existing.id).await?;
        let warning = entry
            .is_none()
            .then(|| WARNING_ENTRY_MISSING_AFTER_WRITE.to_string());
        Ok(ClockActionResult { entry, warning })
    }

    /// Supervisor adjustment: appends the supplied action to an entry's
    /// history, creating the entry first when the action carries a clock-in
    /// flag and the entry does not exist.
    pub async fn adjust_clock(
        &self,
        employee_id: i64,
        entry_id: i64,
        user_id: i64,
        action: NewAction,
        comment: Option<String>,
    ) -> Result<ClockActionResult, ServiceError> {
        let existing = self.entries.load_entry(employee_id, entry_id).await?;
        let Some(existing) = existing else {
            if action.action_type.clock_in {
                let new_entry = self
                    .entries
                    .create_entry(NewEntry {
                        employee_id,
                        entry_type: EntryType::Timeclock,
                        entry_date: Some(action.time),
                        duration: 0,
                        note: comment.unwrap_or_default(),
                        user_id,
                    })
                    .await?;
                self.entries
                    .append_action(NewAction {
                        entry_id: new_entry.id,
                        ..action
                    })
                    .await?;
                let entry = self.entries.load_entry(employee_id, new_entry.id).await?;
                return Ok(ClockActionResult {
                    entry,
                    warning: None,
                });
            }
            return Ok(ClockActionResult {
                entry: None,
                warning: Some(WARNING_ENTRY_NOT_FOUND.to_string()),
            });
        };

        if let Some(comment) = comment.filter(|comment| !comment.is_empty()) {
            let note = [existing.note.as_str(), comment.as_str()]
                .iter()
                .filter(|part| !part.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            self.entries
                .update_entry(EntryUpdate {
                    id: existing.id,
                    employee_id,
                    entry_type: existing.entry_type,
                    entry_date: existing.entry_date,
                    duration: existing.duration,
                    note,
                    user_id,
                })
                .await?;
        }
        self.entries
            .append_action(NewAction {
                entry_id: existing.id,
                ..action.clone()
            })
            .await?;
        if action.action_type.clock_out {
            self.entries
                .finalize_clock_out(&existing, action.time)
                .await?;
        }

        let entry = self.entries.load_entry(employee_id, existing.id).await?;
        Ok(ClockActionResult {
            entry,
            warning: None,
        })
    }

    /// Soft-deletes an entry, recording who and why as a comment action in
    /// its immutable history.
    pub async fn delete_entry(
        &self,
        employee_id: i64,
        entry_id: i64,
        user_id: i64,
        comment: Option<String>,
        ip: String,
    ) -> Result<ClockActionResult, ServiceError> {
        let comment = comment.unwrap_or_default();
        let action = NewAction {
            entry_id,
            action_type: ActionType::COMMENT,
            time: Utc::now(),
            ip,
            notes: json!({ "comment": comment, "deletedBy": user_id }),
        };
        self.entries
            .delete_entry(employee_id, entry_id, user_id, action, &comment)
            .await
    }
}
