use crate::models::{PayPeriod, ServiceError};
use crate::repositories::PayPeriodRepository;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Hard cap on periods created by one `generate_upcoming_periods` call; a
/// data anomaly in the latest period must not turn into an infinite loop.
const MAX_PERIODS_PER_RUN: usize = 52;

pub struct PayPeriodService {
    pay_periods: Arc<dyn PayPeriodRepository>,
}

impl PayPeriodService {
    pub fn new(pay_periods: Arc<dyn PayPeriodRepository>) -> Self {
        Self { pay_periods }
    }

    pub async fn list(&self, id: Option<i64>) -> Result<Vec<PayPeriod>, ServiceError> {
        match id {
            Some(id) => Ok(self.pay_periods.find_by_id(id).await?.into_iter().collect()),
            None => self.pay_periods.find_all().await,
        }
    }

    pub async fn find(&self, id: i64) -> Result<Option<PayPeriod>, ServiceError> {
        self.pay_periods.find_by_id(id).await
    }

    /// The single period containing the given instant (defaults to now).
    pub async fn current(
        &self,
        at: Option<DateTime<Utc>>,
    ) -> Result<Option<PayPeriod>, ServiceError> {
        self.pay_periods
            .find_containing(at.unwrap_or_else(Utc::now))
            .await
    }

    /// One-way completion. Refused while the period's end is still in the
    /// future and once the period is already completed.
    pub async fn mark_completed(&self, id: i64) -> Result<PayPeriod, ServiceError> {
        let period = self
            .pay_periods
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Pay period {} not found", id)))?;
        if period.completed {
            return Err(ServiceError::Lifecycle(format!(
                "Pay period {} is already completed",
                id
            )));
        }
        if period.end_date > Utc::now() {
            return Err(ServiceError::Lifecycle(format!(
                "Pay period {} has not ended yet",
                id
            )));
        }
        self.pay_periods.mark_completed(id).await?;
        info!(pay_period_id = id, "pay period completed");
        self.pay_periods.find_by_id(id).await?.ok_or_else(|| {
            ServiceError::Internal(format!("Pay period {} not found after update", id))
        })
    }

    /// Extends the contiguous period chain: starting from the latest
    /// existing period, creates sequential 14-day windows (start at midnight
    /// UTC the day after the prior end, end 14 days minus one second later)
    /// until a created period starts past the current year, capped at
    /// `MAX_PERIODS_PER_RUN`. Returns the number created.
    pub async fn generate_upcoming_periods(&self) -> Result<usize, ServiceError> {
        let Some(latest) = self.pay_periods.find_latest().await? else {
            return Ok(0);
        };
        let current_year = Utc::now().year();
        if latest.start_date.year() > current_year {
            return Ok(0);
        }

        let mut created = 0;
        let mut prior_end = latest.end_date;
        loop {
            let start_date = (prior_end + Duration::days(1))
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc();
            let end_date = start_date + Duration::days(14) - Duration::seconds(1);
            self.pay_periods.insert(start_date, end_date).await?;
            created += 1;
            if start_date.year() != current_year || created >= MAX_PERIODS_PER_RUN {
                break;
            }
            prior_end = end_date;
        }
        info!(created, "generated upcoming pay periods");
        Ok(created)
    }
}
