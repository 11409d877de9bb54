use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use timeclock_api::config::{AppConfig, ClockRules};
use timeclock_api::handlers;
use timeclock_api::repositories::{
    SqliteEmployeeRepository, SqliteEntryRepository, SqlitePayPeriodRepository,
};
use timeclock_api::scheduler::BackgroundScheduler;
use timeclock_api::services::{ClockService, EmployeeService, EntryService, PayPeriodService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let rules = ClockRules::default();

    // Initialize database
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Initialize repositories
    let entry_repository = Arc::new(SqliteEntryRepository::new(pool.clone()));
    let pay_period_repository = Arc::new(SqlitePayPeriodRepository::new(pool.clone()));
    let employee_repository = Arc::new(SqliteEmployeeRepository::new(pool.clone()));

    // Initialize services with dependency injection
    let entry_service = Arc::new(EntryService::new(
        entry_repository,
        pay_period_repository.clone(),
        employee_repository.clone(),
        rules,
    ));
    let pay_period_service = Arc::new(PayPeriodService::new(pay_period_repository));
    let clock_service = web::Data::new(ClockService::new(
        entry_service.clone(),
        employee_repository.clone(),
    ));
    let employee_service = web::Data::new(EmployeeService::new(employee_repository));
    let entry_service = web::Data::from(entry_service);

    // Keep the pay-period chain extended ahead of time
    let scheduler = BackgroundScheduler::new(pay_period_service.clone());
    scheduler.start();

    let pay_period_service = web::Data::from(pay_period_service);

    info!("Timeclock API listening on http://{}", config.bind_address);

    let bind_address = config.bind_address.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(entry_service.clone())
            .app_data(clock_service.clone())
            .app_data(employee_service.clone())
            .app_data(pay_period_service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .wrap(Logger::default())
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
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
