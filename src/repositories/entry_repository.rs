use crate::models::{
    ActionType, Entry, EntryAction, EntryType, EntryUpdate, NewAction, NewEntry, ServiceError,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, SqlitePool};

/// Persistence seam for entries and their append-only action log.
///
/// Loaded entries come back bare: the week index is derived from the joined
/// pay period start, but actions, validation errors and clocked-in state are
/// filled in by the entry service.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn insert(
        &self,
        entry: &NewEntry,
        entry_date: DateTime<Utc>,
        pay_period_id: i64,
    ) -> Result<i64, ServiceError>;
    /// Full-row update; `pay_period_id` is the period re-resolved from the
    /// updated entry date so a date move restamps the owning period.
    async fn update(&self, update: &EntryUpdate, pay_period_id: i64) -> Result<(), ServiceError>;
    async fn update_duration(&self, id: i64, duration: i64) -> Result<(), ServiceError>;
    async fn soft_delete(&self, id: i64, deleted_by: i64, note: &str) -> Result<(), ServiceError>;
    async fn find_by_ids(&self, employee_id: i64, ids: &[i64]) -> Result<Vec<Entry>, ServiceError>;
    async fn find_in_range(
        &self,
        employee_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, ServiceError>;
    /// Id of the most recent past entry of the given type inside the window
    /// spanned by the incomplete pay periods.
    async fn find_latest_open_id(
        &self,
        employee_id: i64,
        entry_type: EntryType,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, ServiceError>;
    async fn set_employee_approval(
        &self,
        employee_id: i64,
        pay_period_id: i64,
        approved: bool,
        approval_time: Option<DateTime<Utc>>,
    ) -> Result<(), ServiceError>;
    async fn set_supervisor_approval(
        &self,
        employee_id: i64,
        pay_period_id: i64,
        approved: bool,
        approved_by: Option<i64>,
        approval_time: Option<DateTime<Utc>>,
    ) -> Result<(), ServiceError>;
    /// Appends an immutable action record; existing actions are never
    /// updated or removed.
    async fn append_action(&self, action: &NewAction) -> Result<EntryAction, ServiceError>;
    /// Actions for the given entries ordered by insertion id ascending; an
    /// empty id set returns empty without querying.
    async fn list_actions(&self, entry_ids: &[i64]) -> Result<Vec<EntryAction>, ServiceError>;
}

const ENTRY_SELECT: &str = "SELECT e.id, e.employee_id, e.entry_type, e.user_id, e.entry_date, \
     e.duration, e.note, e.employee_approved, e.employee_approval_time, e.approved, \
     e.approval_time, e.approved_by, e.deleted, e.deleted_by, e.pay_period_id, e.created_at, \
     p.start_date AS period_start \
     FROM entries e INNER JOIN pay_periods p ON p.id = e.pay_period_id";

#[derive(Debug, FromRow)]
struct EntryRow {
    id: i64,
    employee_id: i64,
    entry_type: i64,
    user_id: i64,
    entry_date: DateTime<Utc>,
    duration: i64,
    note: String,
    employee_approved: bool,
    employee_approval_time: Option<DateTime<Utc>>,
    approved: bool,
    approval_time: Option<DateTime<Utc>>,
    approved_by: Option<i64>,
    deleted: bool,
    deleted_by: Option<i64>,
    pay_period_id: i64,
    created_at: DateTime<Utc>,
    period_start: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self) -> Result<Entry, ServiceError> {
        let entry_type = EntryType::from_code(self.entry_type).ok_or_else(|| {
            ServiceError::Internal(format!(
                "Entry {} has unknown entry type code {}",
                self.id, self.entry_type
            ))
        })?;
        let week = if self.entry_date < self.period_start + Duration::days(7) {
            0
        } else {
            1
        };
        Ok(Entry {
            id: self.id,
            employee_id: self.employee_id,
            entry_type,
            user_id: self.user_id,
            entry_date: self.entry_date,
            duration: self.duration,
            note: self.note,
            employee_approved: self.employee_approved,
            employee_approval_time: self.employee_approval_time,
            approved: self.approved,
            approval_time: self.approval_time,
            approved_by: self.approved_by,
            deleted: self.deleted,
            deleted_by: self.deleted_by,
            pay_period_id: self.pay_period_id,
            week,
            created_at: self.created_at,
            actions: Vec::new(),
            errors: Vec::new(),
            is_clocked_in: false,
        })
    }
}

#[derive(Debug, FromRow)]
struct ActionRow {
    id: i64,
    entry_id: i64,
    action_type: i64,
    time: DateTime<Utc>,
    ip: String,
    notes: String,
    created_at: DateTime<Utc>,
}

impl ActionRow {
    fn into_action(self) -> EntryAction {
        let notes = serde_json::from_str(&self.notes)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));
        EntryAction {
            id: self.id,
            entry_id: self.entry_id,
            action_type: ActionType::from_bits(self.action_type),
            time: self.time,
            ip: self.ip,
            notes,
            created_at: self.created_at,
        }
    }
}

pub struct SqliteEntryRepository {
    pool: SqlitePool,
}

impl SqliteEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryRepository for SqliteEntryRepository {
    async fn insert(
        &self,
        entry: &NewEntry,
        entry_date: DateTime<Utc>,
        pay_period_id: i64,
    ) -> Result<i64, ServiceError> {
        let result = sqlx::query(
            "INSERT INTO entries (employee_id, entry_type, user_id, entry_date, duration, note, pay_period_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.employee_id)
        .bind(entry.entry_type.code())
        .bind(entry.user_id)
        .bind(entry_date)
        .bind(entry.duration)
        .bind(&entry.note)
        .bind(pay_period_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, update: &EntryUpdate, pay_period_id: i64) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE entries SET entry_type = ?, entry_date = ?, duration = ?, note = ?, \
             user_id = ?, pay_period_id = ? WHERE id = ?",
        )
        .bind(update.entry_type.code())
        .bind(update.entry_date)
        .bind(update.duration)
        .bind(&update.note)
        .bind(update.user_id)
        .bind(pay_period_id)
        .bind(update.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_duration(&self, id: i64, duration: i64) -> Result<(), ServiceError> {
        sqlx::query("UPDATE entries SET duration = ? WHERE id = ?")
            .bind(duration)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn soft_delete(&self, id: i64, deleted_by: i64, note: &str) -> Result<(), ServiceError> {
        sqlx::query("UPDATE entries SET deleted = 1, deleted_by = ?, note = ? WHERE id = ?")
            .bind(deleted_by)
            .bind(note)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_ids(&self, employee_id: i64, ids: &[i64]) -> Result<Vec<Entry>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "{} WHERE e.employee_id = ? AND e.id IN ({}) ORDER BY e.entry_date, e.entry_type",
            ENTRY_SELECT, placeholders
        );
        let mut query = sqlx::query_as::<_, EntryRow>(&sql).bind(employee_id);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn find_in_range(
        &self,
        employee_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, ServiceError> {
        let sql = format!(
            "{} WHERE e.employee_id = ? AND e.entry_date BETWEEN ? AND ? \
             ORDER BY e.entry_date, e.entry_type",
            ENTRY_SELECT
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(employee_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(EntryRow::into_entry).collect()
    }

    async fn find_latest_open_id(
        &self,
        employee_id: i64,
        entry_type: EntryType,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, ServiceError> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT e.id FROM entries e \
             INNER JOIN (SELECT MIN(start_date) AS start_date, MAX(end_date) AS end_date \
                         FROM pay_periods WHERE completed = 0 AND start_date <= ?) w \
                        ON e.entry_date BETWEEN w.start_date AND w.end_date \
             WHERE e.deleted = 0 AND e.employee_id = ? AND e.entry_type = ? AND e.entry_date <= ? \
             ORDER BY e.entry_date DESC LIMIT 1",
        )
        .bind(now)
        .bind(employee_id)
        .bind(entry_type.code())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn set_employee_approval(
        &self,
        employee_id: i64,
        pay_period_id: i64,
        approved: bool,
        approval_time: Option<DateTime<Utc>>,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE entries SET employee_approved = ?, employee_approval_time = ? \
             WHERE employee_id = ? AND pay_period_id = ?",
        )
        .bind(approved)
        .bind(approval_time)
        .bind(employee_id)
        .bind(pay_period_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_supervisor_approval(
        &self,
        employee_id: i64,
        pay_period_id: i64,
        approved: bool,
        approved_by: Option<i64>,
        approval_time: Option<DateTime<Utc>>,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE entries SET approved = ?, approval_time = ?, approved_by = ? \
             WHERE employee_id = ? AND pay_period_id = ?",
        )
        .bind(approved)
        .bind(approval_time)
        .bind(approved_by)
        .bind(employee_id)
        .bind(pay_period_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_action(&self, action: &NewAction) -> Result<EntryAction, ServiceError> {
        let notes = serde_json::to_string(&action.notes)
            .map_err(|err| ServiceError::Internal(format!("Encoding action notes: {}", err)))?;
        let result = sqlx::query(
            "INSERT INTO entry_actions (entry_id, action_type, time, ip, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(action.entry_id)
        .bind(action.action_type.bits())
        .bind(action.time)
        .bind(&action.ip)
        .bind(notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, ActionRow>(
            "SELECT id, entry_id, action_type, time, ip, notes, created_at \
             FROM entry_actions WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_action())
    }

    async fn list_actions(&self, entry_ids: &[i64]) -> Result<Vec<EntryAction>, ServiceError> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; entry_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, entry_id, action_type, time, ip, notes, created_at \
             FROM entry_actions WHERE entry_id IN ({}) ORDER BY id",
            placeholders
        );
        let mut query = sqlx::query_as::<_, ActionRow>(&sql);
        for id in entry_ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(ActionRow::into_action).collect())
    }
}
