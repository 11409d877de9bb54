use actix_web::{web, HttpRequest, HttpResponse, Result};

use crate::models::{ClockInForm, ClockOptions, ClockOutForm, ServiceError};
use crate::services::ClockService;

use super::{caller_user_id, client_ip};

pub async fn post_clock_in(
    clock_service: web::Data<ClockService>,
    form: web::Json<ClockInForm>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();
    let options = ClockOptions {
        override_state: form.override_state,
        user_id: caller_user_id(&req),
        entry_id: None,
        entry_date: form.entry_date,
        notes: form.notes,
        ip: client_ip(&req),
    };
    let result = clock_service.clock_in(&form.login_code, options).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn post_clock_out(
    clock_service: web::Data<ClockService>,
    form: web::Json<ClockOutForm>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();
    let options = ClockOptions {
        override_state: form.override_state,
        user_id: caller_user_id(&req),
        entry_id: form.entry_id,
        entry_date: form.entry_date,
        notes: form.notes,
        ip: client_ip(&req),
    };
    let result = clock_service.clock_out(&form.login_code, options).await?;
    Ok(HttpResponse::Ok().json(result))
}
