use crate::models::{PayPeriod, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[async_trait]
pub trait PayPeriodRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<PayPeriod>, ServiceError>;
    async fn find_all(&self) -> Result<Vec<PayPeriod>, ServiceError>;
    /// The single period whose window contains the given instant.
    async fn find_containing(&self, at: DateTime<Utc>) -> Result<Option<PayPeriod>, ServiceError>;
    /// Latest period by end date.
    async fn find_latest(&self) -> Result<Option<PayPeriod>, ServiceError>;
    async fn insert(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<i64, ServiceError>;
    async fn mark_completed(&self, id: i64) -> Result<(), ServiceError>;
}

pub struct SqlitePayPeriodRepository {
    pool: SqlitePool,
}

impl SqlitePayPeriodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const PERIOD_SELECT: &str = "SELECT id, start_date, end_date, completed FROM pay_periods";

#[async_trait]
impl PayPeriodRepository for SqlitePayPeriodRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<PayPeriod>, ServiceError> {
        let period = sqlx::query_as::<_, PayPeriod>(&format!("{} WHERE id = ?", PERIOD_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(period)
    }

    async fn find_all(&self) -> Result<Vec<PayPeriod>, ServiceError> {
        let periods = sqlx::query_as::<_, PayPeriod>(&format!(
            "{} ORDER BY completed, start_date DESC",
            PERIOD_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(periods)
    }

    async fn find_containing(&self, at: DateTime<Utc>) -> Result<Option<PayPeriod>, ServiceError> {
        let period = sqlx::query_as::<_, PayPeriod>(&format!(
            "{} WHERE ? BETWEEN start_date AND end_date",
            PERIOD_SELECT
        ))
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(period)
    }

    async fn find_latest(&self) -> Result<Option<PayPeriod>, ServiceError> {
        let period = sqlx::query_as::<_, PayPeriod>(&format!(
            "{} ORDER BY end_date DESC LIMIT 1",
            PERIOD_SELECT
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(period)
    }

    async fn insert(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<i64, ServiceError> {
        let result = sqlx::query("INSERT INTO pay_periods (start_date, end_date) VALUES (?, ?)")
            .bind(start_date)
            .bind(end_date)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn mark_completed(&self, id: i64) -> Result<(), ServiceError> {
        sqlx::query("UPDATE pay_periods SET completed = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
