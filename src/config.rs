use chrono::Duration;

/// Server and database settings, loaded from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
}

impl AppConfig {
    pub fn from_env() -> AppConfig {
        AppConfig {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:instance/timeclock.db?mode=rwc".to_string()),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
        }
    }
}

/// Immutable timeclock rules, injected into the services that need them
/// instead of living as ambient globals.
#[derive(Debug, Clone, Copy)]
pub struct ClockRules {
    /// Standard work week in seconds (overtime threshold and salary
    /// reconciliation target).
    pub standard_week_secs: i64,
    /// Hours after an unmatched clock-in before the entry is treated as
    /// closed with a missing clock-out.
    pub missing_clock_max_hours: i64,
}

impl ClockRules {
    pub fn missing_clock_cutoff(&self) -> Duration {
        Duration::hours(self.missing_clock_max_hours)
    }
}

impl Default for ClockRules {
    fn default() -> Self {
        ClockRules {
            standard_week_secs: 40 * 60 * 60,
            missing_clock_max_hours: 16,
        }
    }
}
