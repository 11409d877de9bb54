//! Pure timeclock rules: clock-state reconstruction from an entry's action
//! log, per-pay-period validation, week aggregation and the approval
//! transition table. Nothing here touches the database.

use chrono::{DateTime, Utc};

use crate::config::ClockRules;
use crate::models::{Entry, EntryAction, EntryType, WeekTotals};

pub const ERR_MISSING_ALL_ACTIONS: &str =
    "This entry is missing all clock in and clock out actions";
pub const ERR_MISSING_CLOCK_IN: &str = "This entry is missing a clock in action";
pub const ERR_MISSING_CLOCK_OUT: &str = "This entry is missing a clock out action";

/// An entry is clocked in while it has at least one clock-in flagged action
/// and no clock-out flagged action. Flag test, not equality: an adjustment
/// action counts when it carries the relevant flag.
pub fn is_clocked_in(actions: &[EntryAction]) -> bool {
    actions.iter().any(|action| action.action_type.clock_in)
        && !actions.iter().any(|action| action.action_type.clock_out)
}

/// Validates one pay period's entries, sorted by entry date ascending.
///
/// For every non-deleted timeclock entry the latest clock-in and clock-out
/// flagged actions (by action id) decide its state. An entry with only a
/// clock-in is presumed still open unless a later timeclock entry exists or
/// the configured cutoff has elapsed since the clock-in; either condition by
/// itself closes the entry with a missing-clock-out error. While open, its
/// duration is derived live as now minus the clock-in time.
pub fn validate_entries(
    mut entries: Vec<Entry>,
    now: DateTime<Utc>,
    rules: &ClockRules,
) -> Vec<Entry> {
    entries.sort_by_key(|entry| entry.entry_date);
    let index: Vec<(i64, EntryType, DateTime<Utc>)> = entries
        .iter()
        .map(|entry| (entry.id, entry.entry_type, entry.entry_date))
        .collect();

    for entry in entries.iter_mut() {
        entry.errors.clear();
        if entry.entry_type != EntryType::Timeclock || entry.deleted {
            continue;
        }

        let clock_in = entry
            .actions
            .iter()
            .filter(|action| action.action_type.clock_in)
            .max_by_key(|action| action.id);
        let clock_out = entry
            .actions
            .iter()
            .filter(|action| action.action_type.clock_out)
            .max_by_key(|action| action.id);

        if clock_in.is_some() && clock_out.is_some() {
            // clocked in and out (or adjusted to look that way), all ok
            continue;
        }
        if clock_in.is_none() && clock_out.is_none() {
            entry.errors.push(ERR_MISSING_ALL_ACTIONS.to_string());
        }
        let clock_in_time = match clock_in {
            Some(action) => action.time,
            None => {
                entry.errors.push(ERR_MISSING_CLOCK_IN.to_string());
                continue;
            }
        };

        // Only a clock-in: look for later timeclock entries indicating the
        // employee punched again after this session.
        let has_later_entry = index.iter().any(|(id, entry_type, entry_date)| {
            *entry_type == EntryType::Timeclock && *id != entry.id && *entry_date > clock_in_time
        });
        if has_later_entry || clock_in_time + rules.missing_clock_cutoff() < now {
            entry.is_clocked_in = false;
            entry.errors.push(ERR_MISSING_CLOCK_OUT.to_string());
            continue;
        }

        // Still clocked in: live duration.
        entry.duration = (now - clock_in_time).num_seconds();
    }

    entries
}

/// Folds a pay period's entries into its two week buckets.
///
/// Overtime is recomputed after every fold, supervisor/employee approval
/// AND-accumulates (approver and timestamp survive only while the bucket
/// remains fully approved), clocked-in state OR-accumulates over timeclock
/// entries, and personal leave is tallied separately. An empty input yields
/// two unapproved weeks.
pub fn week_totals(
    entries: &[Entry],
    exclude_automatic: bool,
    rules: &ClockRules,
) -> [WeekTotals; 2] {
    let mut weeks = [WeekTotals::default(), WeekTotals::default()];
    if entries.is_empty() {
        for week in weeks.iter_mut() {
            week.approved = false;
            week.employee_approved = false;
        }
    }

    let folded = entries
        .iter()
        .filter(|entry| !entry.deleted)
        .filter(|entry| !exclude_automatic || entry.entry_type != EntryType::Automatic);
    for entry in folded {
        let week = &mut weeks[usize::from(entry.week.min(1))];
        week.duration += entry.duration;
        if week.duration > rules.standard_week_secs {
            week.overtime = week.duration - rules.standard_week_secs;
        }
        week.has_errors |= entry.has_errors();

        week.approved = week.approved && entry.approved;
        week.approved_by = if week.approved { entry.approved_by } else { None };
        week.approval_time = if week.approved { entry.approval_time } else { None };

        week.employee_approved &= entry.employee_approved;
        if week.employee_approval_time.is_none() {
            week.employee_approval_time = entry.employee_approval_time;
        }

        if entry.entry_type == EntryType::Timeclock {
            week.is_clocked_in |= entry.is_clocked_in;
        }
        if entry.entry_type == EntryType::PersonalLeave {
            week.personal_leave_duration += entry.duration;
        }
    }

    weeks
}

/// Whether changing an entry from one type to another invalidates existing
/// approvals. An authoritative compatibility table, not derived logic: the
/// listed transitions are free, everything else forces a reset.
pub fn change_requires_approval(from: EntryType, to: EntryType) -> bool {
    if from == to {
        return false;
    }
    match from {
        EntryType::Holiday => ![
            EntryType::MedAssist,
            EntryType::BereavementJury,
            EntryType::Manual,
        ]
        .contains(&to),
        EntryType::PersonalLeave => ![
            EntryType::Holiday,
            EntryType::BereavementJury,
            EntryType::MedAssist,
        ]
        .contains(&to),
        EntryType::MedAssist => ![EntryType::Manual, EntryType::Holiday].contains(&to),
        _ => true,
    }
}
