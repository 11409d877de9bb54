use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use crate::services::PayPeriodService;

/// Background loop that keeps the pay-period chain extended ahead of "now"
/// so entry creation always finds an owning period.
pub struct BackgroundScheduler {
    pay_periods: Arc<PayPeriodService>,
}

impl BackgroundScheduler {
    pub fn new(pay_periods: Arc<PayPeriodService>) -> Self {
        Self { pay_periods }
    }

    pub fn start(&self) {
        let pay_periods = Arc::clone(&self.pay_periods);

        tokio::spawn(async move {
            info!("background scheduler started");
            // Once a day is plenty; a missed tick just delays period creation.
            let mut interval = interval(Duration::from_secs(24 * 60 * 60));

            loop {
                interval.tick().await;

                match pay_periods.generate_upcoming_periods().await {
                    Ok(created) if created > 0 => {
                        info!(created, "scheduler created upcoming pay periods");
                    }
                    Ok(_) => {}
                    Err(err) => error!("pay period generation failed: {}", err),
                }
            }
        });
    }
}
