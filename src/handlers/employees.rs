use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::models::{EmployeeFilter, LoginCodeForm, ServiceError};
use crate::services::{rules, EmployeeService, EntryService, PayPeriodService};

pub async fn get_employees(
    employee_service: web::Data<EmployeeService>,
    filter: web::Query<EmployeeFilter>,
) -> Result<HttpResponse, ServiceError> {
    let employees = employee_service.lookup(&filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "employees": employees })))
}

/// Employee card for the punch-clock UI: directory record plus the current
/// pay period's validated entries and week totals.
pub async fn get_employee(
    employee_service: web::Data<EmployeeService>,
    entry_service: web::Data<EntryService>,
    pay_period_service: web::Data<PayPeriodService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = path.into_inner();
    let employee = employee_service
        .find(employee_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Employee {} not found", employee_id)))?;

    let period = pay_period_service.current(None).await?;
    let entries = match &period {
        Some(period) => {
            entry_service
                .load_pay_period_entries(employee_id, period.id)
                .await?
        }
        None => Vec::new(),
    };
    let has_errors = entries.iter().any(|entry| entry.has_errors());
    let totals = rules::week_totals(&entries, false, entry_service.rules());
    Ok(HttpResponse::Ok().json(json!({
        "employee": employee,
        "pay_period": period,
        "entries": entries,
        "has_errors": has_errors,
        "totals": totals
    })))
}

pub async fn put_login_code(
    employee_service: web::Data<EmployeeService>,
    path: web::Path<i64>,
    form: web::Json<LoginCodeForm>,
) -> Result<HttpResponse, ServiceError> {
    let employee = employee_service
        .set_login_code(path.into_inner(), &form.login_code)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "employee": employee })))
}
