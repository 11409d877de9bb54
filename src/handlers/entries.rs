use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde_json::json;

use crate::models::{
    AdjustClockForm, ApprovalForm, DeleteEntryForm, EntryForm, EntryUpdate, NewAction, NewEntry,
    ServiceError,
};
use crate::services::{rules, ClockService, EntryService};

use super::{caller_user_id, client_ip};

pub async fn post_entry(
    entry_service: web::Data<EntryService>,
    path: web::Path<i64>,
    form: web::Json<EntryForm>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let employee_id = path.into_inner();
    let form = form.into_inner();
    let entry = entry_service
        .create_entry(NewEntry {
            employee_id,
            entry_type: form.entry_type,
            entry_date: form.entry_date,
            duration: form.duration,
            note: form.note,
            user_id: caller_user_id(&req),
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "entry": entry })))
}

pub async fn put_entry(
    entry_service: web::Data<EntryService>,
    path: web::Path<(i64, i64)>,
    form: web::Json<EntryForm>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let (employee_id, entry_id) = path.into_inner();
    let form = form.into_inner();
    let entry_date = form
        .entry_date
        .ok_or_else(|| ServiceError::Validation("Invalid entry date".to_string()))?;
    let entry = entry_service
        .update_entry(EntryUpdate {
            id: entry_id,
            employee_id,
            entry_type: form.entry_type,
            entry_date,
            duration: form.duration,
            note: form.note,
            user_id: caller_user_id(&req),
        })
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "entry": entry })))
}

pub async fn get_entry(
    entry_service: web::Data<EntryService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (employee_id, entry_id) = path.into_inner();
    let entry = entry_service.load_entry(employee_id, entry_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "entry": entry })))
}

pub async fn post_adjust_clock(
    clock_service: web::Data<ClockService>,
    path: web::Path<(i64, i64)>,
    form: web::Json<AdjustClockForm>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let (employee_id, entry_id) = path.into_inner();
    let form = form.into_inner();
    let action = NewAction {
        entry_id,
        action_type: form.action.action_type,
        time: form.action.time,
        ip: client_ip(&req),
        notes: form
            .action
            .notes
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
    };
    let result = clock_service
        .adjust_clock(
            employee_id,
            entry_id,
            caller_user_id(&req),
            action,
            form.comment,
        )
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn delete_entry(
    clock_service: web::Data<ClockService>,
    path: web::Path<(i64, i64)>,
    form: web::Json<DeleteEntryForm>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let (employee_id, entry_id) = path.into_inner();
    let result = clock_service
        .delete_entry(
            employee_id,
            entry_id,
            caller_user_id(&req),
            form.into_inner().comment,
            client_ip(&req),
        )
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// The payroll-export feed: a pay period's validated entries with their
/// error lists populated, plus the two week totals.
pub async fn get_pay_period_entries(
    entry_service: web::Data<EntryService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (employee_id, pay_period_id) = path.into_inner();
    let entries = entry_service
        .load_pay_period_entries(employee_id, pay_period_id)
        .await?;
    let has_errors = entries.iter().any(|entry| entry.has_errors());
    let totals = rules::week_totals(&entries, false, entry_service.rules());
    Ok(HttpResponse::Ok().json(json!({
        "entries": entries,
        "has_errors": has_errors,
        "totals": totals
    })))
}

pub async fn put_employee_approval(
    entry_service: web::Data<EntryService>,
    path: web::Path<(i64, i64)>,
    form: web::Json<ApprovalForm>,
) -> Result<HttpResponse, ServiceError> {
    let (employee_id, pay_period_id) = path.into_inner();
    entry_service
        .set_employee_approval(employee_id, pay_period_id, form.approved)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub async fn put_supervisor_approval(
    entry_service: web::Data<EntryService>,
    path: web::Path<(i64, i64)>,
    form: web::Json<ApprovalForm>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let (employee_id, pay_period_id) = path.into_inner();
    entry_service
        .set_supervisor_approval(employee_id, pay_period_id, caller_user_id(&req), form.approved)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
