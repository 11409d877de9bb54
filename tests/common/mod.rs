use actix_web::{web, App};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tempfile::TempDir;
use timeclock_api::{
    config::ClockRules,
    handlers,
    repositories::{SqliteEmployeeRepository, SqliteEntryRepository, SqlitePayPeriodRepository},
    services::{ClockService, EmployeeService, EntryService, PayPeriodService},
};

pub struct TestApp {
    pub pool: SqlitePool,
    pub rules: ClockRules,
    /// Current pay period seeded around "now".
    pub current_period_id: i64,
    /// Completed period immediately before the current one.
    pub previous_period_id: i64,
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        // Create temporary database
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to create database pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let (previous_period_id, current_period_id) = Self::seed_pay_periods(&pool).await;

        Self {
            pool,
            rules: ClockRules::default(),
            current_period_id,
            previous_period_id,
            temp_dir,
        }
    }

    /// Seeds a completed period that ended in the past and the current open
    /// period containing "now" (now falls in its first week).
    async fn seed_pay_periods(pool: &SqlitePool) -> (i64, i64) {
        let current_start = (Utc::now() - Duration::days(3))
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let current_end = current_start + Duration::days(14) - Duration::seconds(1);
        let previous_start = current_start - Duration::days(14);
        let previous_end = current_start - Duration::seconds(1);

        let previous_id = sqlx::query(
            "INSERT INTO pay_periods (start_date, end_date, completed) VALUES (?, ?, 1)",
        )
        .bind(previous_start)
        .bind(previous_end)
        .execute(pool)
        .await
        .expect("Failed to seed previous pay period")
        .last_insert_rowid();

        let current_id = sqlx::query(
            "INSERT INTO pay_periods (start_date, end_date, completed) VALUES (?, ?, 0)",
        )
        .bind(current_start)
        .bind(current_end)
        .execute(pool)
        .await
        .expect("Failed to seed current pay period")
        .last_insert_rowid();

        (previous_id, current_id)
    }

    pub async fn seed_employee(&self, login_code: &str, pay_method: &str) -> i64 {
        sqlx::query(
            "INSERT INTO employees (employee_key, first_name, last_name, department, \
             employee_number, login_code, pay_method, status) \
             VALUES (?, 'Test', 'Employee', 'WH', '0042', ?, ?, 'A')",
        )
        .bind(format!("EMP-{}", login_code))
        .bind(login_code)
        .bind(pay_method)
        .execute(&self.pool)
        .await
        .expect("Failed to seed employee")
        .last_insert_rowid()
    }

    pub async fn current_period_start(&self) -> DateTime<Utc> {
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT start_date FROM pay_periods WHERE id = ?")
            .bind(self.current_period_id)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to load current period start")
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let entry_repository = Arc::new(SqliteEntryRepository::new(self.pool.clone()));
        let pay_period_repository = Arc::new(SqlitePayPeriodRepository::new(self.pool.clone()));
        let employee_repository = Arc::new(SqliteEmployeeRepository::new(self.pool.clone()));

        let entry_service = Arc::new(EntryService::new(
            entry_repository,
            pay_period_repository.clone(),
            employee_repository.clone(),
            self.rules,
        ));
        let clock_service = web::Data::new(ClockService::new(
            entry_service.clone(),
            employee_repository.clone(),
        ));
        let employee_service = web::Data::new(EmployeeService::new(employee_repository));
        let pay_period_service =
            web::Data::new(PayPeriodService::new(pay_period_repository));
        let entry_service = web::Data::from(entry_service);

        App::new()
            .app_data(entry_service)
            .app_data(clock_service)
            .app_data(employee_service)
            .app_data(pay_period_service)
            .app_data(web::Data::new(self.pool.clone()))
            .route(
                "/api/timeclock/clock/in",
                web::post().to(handlers::post_clock_in),
            )
            .route(
                "/api/timeclock/clock/out",
                web::post().to(handlers::post_clock_out),
            )
            .route(
                "/api/timeclock/employees",
                web::get().to(handlers::get_employees),
            )
            .route(
                "/api/timeclock/employees/{id}",
                web::get().to(handlers::get_employee),
            )
            .route(
                "/api/timeclock/employees/{id}/login-code",
                web::put().to(handlers::put_login_code),
            )
            .route(
                "/api/timeclock/employees/{id}/entries",
                web::post().to(handlers::post_entry),
            )
            .route(
                "/api/timeclock/employees/{id}/entries/{entryId}",
                web::get().to(handlers::get_entry),
            )
            .route(
                "/api/timeclock/employees/{id}/entries/{entryId}",
                web::put().to(handlers::put_entry),
            )
            .route(
                "/api/timeclock/employees/{id}/entries/{entryId}",
                web::delete().to(handlers::delete_entry),
            )
            .route(
                "/api/timeclock/employees/{id}/entries/{entryId}/adjust",
                web::post().to(handlers::post_adjust_clock),
            )
            .route(
                "/api/timeclock/employees/{id}/pay-period/{periodId}",
                web::get().to(handlers::get_pay_period_entries),
            )
            .route(
                "/api/timeclock/employees/{id}/pay-period/{periodId}/approve/employee",
                web::put().to(handlers::put_employee_approval),
            )
            .route(
                "/api/timeclock/employees/{id}/pay-period/{periodId}/approve/supervisor",
                web::put().to(handlers::put_supervisor_approval),
            )
            .route(
                "/api/timeclock/pay-periods",
                web::get().to(handlers::get_pay_periods),
            )
            .route(
                "/api/timeclock/pay-periods/current",
                web::get().to(handlers::get_current_pay_period),
            )
            .route(
                "/api/timeclock/pay-periods/build",
                web::post().to(handlers::post_build_pay_periods),
            )
            .route(
                "/api/timeclock/pay-periods/{id}",
                web::get().to(handlers::get_pay_period),
            )
            .route(
                "/api/timeclock/pay-periods/{id}/complete",
                web::post().to(handlers::post_complete_pay_period),
            )
    }
}
