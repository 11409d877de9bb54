pub mod clock;
pub mod employees;
pub mod entries;
pub mod pay_periods;

pub use clock::*;
pub use employees::*;
pub use entries::*;
pub use pay_periods::*;

use actix_web::HttpRequest;

/// Caller identity resolved by the upstream gateway; this service performs
/// no authentication of its own.
pub(crate) fn caller_user_id(req: &HttpRequest) -> i64 {
    req.headers()
        .get("X-User-Id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or_default()
        .to_string()
}
