use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::models::ServiceError;
use crate::services::PayPeriodService;

pub async fn get_pay_periods(
    pay_period_service: web::Data<PayPeriodService>,
) -> Result<HttpResponse, ServiceError> {
    let periods = pay_period_service.list(None).await?;
    Ok(HttpResponse::Ok().json(json!({ "periods": periods })))
}

pub async fn get_pay_period(
    pay_period_service: web::Data<PayPeriodService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let periods = pay_period_service.list(Some(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(json!({ "periods": periods })))
}

pub async fn get_current_pay_period(
    pay_period_service: web::Data<PayPeriodService>,
) -> Result<HttpResponse, ServiceError> {
    let period = pay_period_service.current(None).await?;
    Ok(HttpResponse::Ok().json(json!({ "period": period })))
}

pub async fn post_complete_pay_period(
    pay_period_service: web::Data<PayPeriodService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let period = pay_period_service
        .mark_completed(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "period": period })))
}

pub async fn post_build_pay_periods(
    pay_period_service: web::Data<PayPeriodService>,
) -> Result<HttpResponse, ServiceError> {
    let created = pay_period_service.generate_upcoming_periods().await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "created": created })))
}
