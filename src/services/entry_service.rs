use crate::config::ClockRules;
use crate::models::{
    ClockActionResult, Entry, EntryAction, EntryType, EntryUpdate, NewAction, NewEntry,
    ServiceError,
};
use crate::repositories::{EmployeeRepository, EntryRepository, PayPeriodRepository};
use crate::services::rules;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Entry store plus the workflows hanging off entry mutations: approval
/// resets and salary reconciliation. Mutations run their dependent steps
/// sequentially (insert, reset, reconcile) without a transaction; each step
/// is idempotent so a retry after partial failure converges.
pub struct EntryService {
    entries: Arc<dyn EntryRepository>,
    pay_periods: Arc<dyn PayPeriodRepository>,
    employees: Arc<dyn EmployeeRepository>,
    rules: ClockRules,
}

impl EntryService {
    pub fn new(
        entries: Arc<dyn EntryRepository>,
        pay_periods: Arc<dyn PayPeriodRepository>,
        employees: Arc<dyn EmployeeRepository>,
        rules: ClockRules,
    ) -> Self {
        Self {
            entries,
            pay_periods,
            employees,
            rules,
        }
    }

    pub fn rules(&self) -> &ClockRules {
        &self.rules
    }

    /// Attaches actions and derives the clocked-in flag for freshly loaded
    /// entries.
    async fn decorate(&self, mut entries: Vec<Entry>) -> Result<Vec<Entry>, ServiceError> {
        if entries.is_empty() {
            return Ok(entries);
        }
        let ids: Vec<i64> = entries.iter().map(|entry| entry.id).collect();
        let actions = self.entries.list_actions(&ids).await?;
        for entry in entries.iter_mut() {
            entry.actions = actions
                .iter()
                .filter(|action| action.entry_id == entry.id)
                .cloned()
                .collect();
            entry.errors = Vec::new();
            entry.is_clocked_in = !entry.deleted && rules::is_clocked_in(&entry.actions);
        }
        Ok(entries)
    }

    pub async fn load_entries(
        &self,
        employee_id: i64,
        ids: &[i64],
        skip_validation: bool,
    ) -> Result<Vec<Entry>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let entries = self.entries.find_by_ids(employee_id, ids).await?;
        let entries = self.decorate(entries).await?;
        if skip_validation {
            return Ok(entries);
        }
        Ok(rules::validate_entries(entries, Utc::now(), &self.rules))
    }

    /// Loads a single entry with its actions and validation state. An id of
    /// zero means "nothing to load" and is not an error; a negative id is.
    pub async fn load_entry(
        &self,
        employee_id: i64,
        id: i64,
    ) -> Result<Option<Entry>, ServiceError> {
        if id == 0 {
            return Ok(None);
        }
        if id < 0 {
            return Err(ServiceError::Validation("Invalid entry ID".to_string()));
        }
        let mut entries = self.load_entries(employee_id, &[id], false).await?;
        Ok(entries.pop())
    }

    /// All of an employee's entries inside a pay period's window, validated
    /// as one batch so missing-punch detection can see sibling entries.
    pub async fn load_pay_period_entries(
        &self,
        employee_id: i64,
        pay_period_id: i64,
    ) -> Result<Vec<Entry>, ServiceError> {
        let period = self
            .pay_periods
            .find_by_id(pay_period_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Pay period {} not found", pay_period_id))
            })?;
        let entries = self
            .entries
            .find_in_range(employee_id, period.start_date, period.end_date)
            .await?;
        let entries = self.decorate(entries).await?;
        Ok(rules::validate_entries(entries, Utc::now(), &self.rules))
    }

    /// The most recent past entry of the given type in the current
    /// incomplete pay-period window; "what session, if any, is open".
    pub async fn load_latest_open_entry(
        &self,
        employee_id: i64,
        entry_type: EntryType,
    ) -> Result<Option<Entry>, ServiceError> {
        let id = self
            .entries
            .find_latest_open_id(employee_id, entry_type, Utc::now())
            .await?;
        match id {
            Some(id) => {
                let mut entries = self.load_entries(employee_id, &[id], false).await?;
                Ok(entries.pop())
            }
            None => Ok(None),
        }
    }

    pub async fn append_action(&self, action: NewAction) -> Result<EntryAction, ServiceError> {
        self.entries.append_action(&action).await
    }

    /// Inserts the row and reloads it; no approval or reconciliation side
    /// effects. Shared by `create_entry` and the reconciliation generator.
    async fn insert_entry(&self, new: &NewEntry) -> Result<Entry, ServiceError> {
        if new.employee_id == 0 {
            return Err(ServiceError::Validation("Invalid employee".to_string()));
        }
        let entry_date = new.entry_date.unwrap_or_else(Utc::now);
        let period = self
            .pay_periods
            .find_containing(entry_date)
            .await?
            .ok_or_else(|| {
                ServiceError::Validation(format!(
                    "No pay period covers the entry date {}",
                    entry_date
                ))
            })?;
        let id = self.entries.insert(new, entry_date, period.id).await?;
        let mut entries = self.load_entries(new.employee_id, &[id], true).await?;
        entries.pop().ok_or_else(|| {
            ServiceError::Internal(format!("Entry {} not found after insert", id))
        })
    }

    /// Creates an entry and, unless the entry is an automatic reconciliation
    /// entry, resets the period's approvals and regenerates the salaried
    /// week top-up.
    pub async fn create_entry(&self, new: NewEntry) -> Result<Entry, ServiceError> {
        let entry = self.insert_entry(&new).await?;
        if entry.entry_type != EntryType::Automatic {
            self.reset_approvals(entry.employee_id, entry.pay_period_id)
                .await?;
            self.generate_salary_entries(entry.employee_id, entry.pay_period_id)
                .await?;
        }
        info!(
            entry_id = entry.id,
            employee_id = entry.employee_id,
            entry_type = entry.entry_type.code(),
            "created entry"
        );
        Ok(entry)
    }

    /// Applies the update and resets approvals when the payable content of a
    /// previously approved entry changed. Returns the reloaded entry and
    /// whether the reset fired.
    async fn apply_update(
        &self,
        update: &EntryUpdate,
    ) -> Result<(Option<Entry>, bool), ServiceError> {
        let existing = self.load_entry(update.employee_id, update.id).await?;

        let mut resolved = update.clone();
        if update.entry_type == EntryType::Timeclock {
            // Duration of a timeclock entry is derived from its actions, not
            // settable by callers.
            if let Some(existing) = &existing {
                if existing.duration != resolved.duration {
                    resolved.duration = existing.duration;
                }
            }
        }
        // The owning period follows the entry date: a date edit across a
        // period boundary restamps pay_period_id, the same resolution as on
        // insert.
        let period = self
            .pay_periods
            .find_containing(resolved.entry_date)
            .await?
            .ok_or_else(|| {
                ServiceError::Validation(format!(
                    "No pay period covers the entry date {}",
                    resolved.entry_date
                ))
            })?;
        self.entries.update(&resolved, period.id).await?;

        let mut reset = false;
        if let Some(existing) = &existing {
            if existing.approved
                && (resolved.duration != existing.duration
                    || rules::change_requires_approval(existing.entry_type, resolved.entry_type))
            {
                self.reset_approvals(existing.employee_id, existing.pay_period_id)
                    .await?;
                reset = true;
            }
        }

        let entry = self.load_entry(update.employee_id, update.id).await?;
        Ok((entry, reset))
    }

    pub async fn update_entry(
        &self,
        update: EntryUpdate,
    ) -> Result<Option<Entry>, ServiceError> {
        if update.id == 0 {
            let entry = self
                .create_entry(NewEntry {
                    employee_id: update.employee_id,
                    entry_type: update.entry_type,
                    entry_date: Some(update.entry_date),
                    duration: update.duration,
                    note: update.note,
                    user_id: update.user_id,
                })
                .await?;
            return Ok(Some(entry));
        }

        let (entry, reset) = self.apply_update(&update).await?;
        if reset && update.entry_type != EntryType::Automatic {
            if let Some(entry) = &entry {
                self.generate_salary_entries(update.employee_id, entry.pay_period_id)
                    .await?;
            }
        }
        Ok(entry)
    }

    /// Soft-deletes an entry, recording the supplied action in its history
    /// and regenerating reconciliation for the affected period. Actions are
    /// kept; only the entry is flagged.
    pub async fn delete_entry(
        &self,
        employee_id: i64,
        entry_id: i64,
        user_id: i64,
        action: NewAction,
        comment: &str,
    ) -> Result<ClockActionResult, ServiceError> {
        let existing = self
            .load_entry(employee_id, entry_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Clock entry not found".to_string()))?;

        self.entries
            .append_action(&NewAction {
                entry_id: existing.id,
                ..action
            })
            .await?;

        let note = [existing.note.as_str(), comment]
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        self.entries
            .soft_delete(existing.id, user_id, &note)
            .await?;
        self.generate_salary_entries(employee_id, existing.pay_period_id)
            .await?;

        let entry = self.load_entry(employee_id, existing.id).await?;
        let warning = entry
            .is_none()
            .then(|| "Clock entry not found".to_string());
        Ok(ClockActionResult { entry, warning })
    }

    /// Persists the authoritative duration once a clock-out confirms it,
    /// resetting approvals if the entry had already been signed off.
    pub async fn finalize_clock_out(
        &self,
        entry: &Entry,
        clock_out_time: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let clock_in = entry
            .actions
            .iter()
            .filter(|action| action.action_type.clock_in)
            .max_by_key(|action| action.id);
        let Some(clock_in) = clock_in else {
            return Ok(());
        };
        let duration = (clock_out_time - clock_in.time).num_seconds().max(0);
        self.entries.update_duration(entry.id, duration).await?;
        if entry.approved {
            self.reset_approvals(entry.employee_id, entry.pay_period_id)
                .await?;
        }
        self.generate_salary_entries(entry.employee_id, entry.pay_period_id)
            .await?;
        Ok(())
    }

    async fn reset_approvals(
        &self,
        employee_id: i64,
        pay_period_id: i64,
    ) -> Result<(), ServiceError> {
        self.entries
            .set_employee_approval(employee_id, pay_period_id, false, None)
            .await?;
        self.entries
            .set_supervisor_approval(employee_id, pay_period_id, false, None, None)
            .await?;
        Ok(())
    }

    /// Period-scoped employee sign-off over every entry in the period.
    /// Idempotent; approving stamps "now", un-approving clears the stamp.
    pub async fn set_employee_approval(
        &self,
        employee_id: i64,
        pay_period_id: i64,
        approved: bool,
    ) -> Result<(), ServiceError> {
        let approval_time = approved.then(Utc::now);
        self.entries
            .set_employee_approval(employee_id, pay_period_id, approved, approval_time)
            .await
    }

    /// Period-scoped supervisor sign-off; un-approving clears both the stamp
    /// and the approver.
    pub async fn set_supervisor_approval(
        &self,
        employee_id: i64,
        pay_period_id: i64,
        approver_id: i64,
        approved: bool,
    ) -> Result<(), ServiceError> {
        let approval_time = approved.then(Utc::now);
        let approved_by = approved.then_some(approver_id);
        self.entries
            .set_supervisor_approval(
                employee_id,
                pay_period_id,
                approved,
                approved_by,
                approval_time,
            )
            .await
    }

    /// Salary reconciliation: for an active salaried employee, keeps exactly
    /// one automatic entry per week sized so the week's total equals the
    /// standard work week. Skips everyone else; refuses completed periods.
    pub async fn generate_salary_entries(
        &self,
        employee_id: i64,
        pay_period_id: i64,
    ) -> Result<(), ServiceError> {
        match self.employees.find_by_id(employee_id).await? {
            Some(employee) if employee.is_active() && employee.is_salaried() => {}
            _ => return Ok(()),
        }

        let period = self
            .pay_periods
            .find_by_id(pay_period_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Pay period {} not found", pay_period_id))
            })?;
        if period.completed {
            return Err(ServiceError::Lifecycle(format!(
                "Pay period {} is completed; salary reconciliation refused",
                pay_period_id
            )));
        }

        let entries = self
            .load_pay_period_entries(employee_id, pay_period_id)
            .await?;
        // At most one automatic entry exists per week; keep the first.
        let mut automatic: [Option<&Entry>; 2] = [None, None];
        for entry in entries
            .iter()
            .filter(|entry| !entry.deleted && entry.entry_type == EntryType::Automatic)
        {
            let slot = &mut automatic[usize::from(entry.week.min(1))];
            if slot.is_none() {
                *slot = Some(entry);
            }
        }

        let totals = rules::week_totals(&entries, true, &self.rules);
        for week in 0..2 {
            let non_automatic = totals[week].duration;
            let target = (self.rules.standard_week_secs - non_automatic).max(0);
            match automatic[week] {
                Some(existing) => {
                    if existing.duration != target {
                        let update = EntryUpdate {
                            id: existing.id,
                            employee_id,
                            entry_type: EntryType::Automatic,
                            entry_date: existing.entry_date,
                            duration: target,
                            note: existing.note.clone(),
                            user_id: existing.user_id,
                        };
                        self.apply_update(&update).await?;
                        info!(
                            entry_id = existing.id,
                            employee_id,
                            week,
                            duration = target,
                            "updated automatic salary entry"
                        );
                    }
                }
                None => {
                    if non_automatic < self.rules.standard_week_secs {
                        let entry_date = if week == 0 {
                            period.start_date
                        } else {
                            period.week_2_start()
                        };
                        let entry = self
                            .insert_entry(&NewEntry {
                                employee_id,
                                entry_type: EntryType::Automatic,
                                entry_date: Some(entry_date),
                                duration: target,
                                note: "Auto-Generated".to_string(),
                                user_id: 0,
                            })
                            .await?;
                        info!(
                            entry_id = entry.id,
                            employee_id,
                            week,
                            duration = target,
                            "created automatic salary entry"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
