use actix_web::{http::StatusCode, test};
use chrono::{Duration, Utc};
use serde_json::json;

mod common;
use common::TestApp;

const HOUR: i64 = 60 * 60;

#[actix_web::test]
async fn test_create_entry_stamps_pay_period_and_week() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/timeclock/employees/{}/entries", employee_id))
        .set_json(json!({
            "entry_type": 2,
            "duration": 8 * HOUR,
            "note": "Forgot to punch"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["entry"]["pay_period_id"], test_app.current_period_id);
    assert_eq!(body["entry"]["week"], 0);
    assert_eq!(body["entry"]["duration"], 8 * HOUR);

    // An entry dated in the second half of the period lands in week 1.
    let week_2_date = test_app.current_period_start().await + Duration::days(8);
    let req = test::TestRequest::post()
        .uri(&format!("/api/timeclock/employees/{}/entries", employee_id))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": week_2_date,
            "duration": 4 * HOUR
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["entry"]["week"], 1);
}

#[actix_web::test]
async fn test_create_entry_outside_any_pay_period_fails() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let orphan_date = test_app.current_period_start().await - Duration::days(30);
    let req = test::TestRequest::post()
        .uri(&format!("/api/timeclock/employees/{}/entries", employee_id))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": orphan_date,
            "duration": HOUR
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_date_move_restamps_pay_period_and_week() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let previous_date = test_app.current_period_start().await - Duration::days(2);
    let req = test::TestRequest::post()
        .uri(&format!("/api/timeclock/employees/{}/entries", employee_id))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": previous_date,
            "duration": 8 * HOUR
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let entry_id = body["entry"]["id"].as_i64().unwrap();
    assert_eq!(body["entry"]["pay_period_id"], test_app.previous_period_id);

    // Moving the date into the current period's first week restamps the
    // owning period and the week bucket follows.
    let moved_date = Utc::now();
    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": moved_date,
            "duration": 8 * HOUR
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["entry"]["pay_period_id"], test_app.current_period_id);
    assert_eq!(body["entry"]["week"], 0);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/timeclock/employees/{}/pay-period/{}",
            employee_id, test_app.current_period_id
        ))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["totals"][0]["duration"], 8 * HOUR);
    assert_eq!(body["totals"][1]["duration"], 0);

    // A date no period covers is rejected and leaves the row alone.
    let orphan_date = test_app.current_period_start().await - Duration::days(30);
    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": orphan_date,
            "duration": 8 * HOUR
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["entry"]["pay_period_id"], test_app.current_period_id);
}

#[actix_web::test]
async fn test_update_keeps_timeclock_duration() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let clock_in_time = Utc::now() - Duration::hours(2);
    let req = test::TestRequest::post()
        .uri("/api/timeclock/clock/in")
        .set_json(json!({ "login_code": "1234", "entry_date": clock_in_time }))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/api/timeclock/clock/out")
        .set_json(json!({ "login_code": "1234" }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let entry_id = body["entry"]["id"].as_i64().unwrap();
    let stored = body["entry"]["duration"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .set_json(json!({
            "entry_type": 1,
            "entry_date": clock_in_time,
            "duration": 999,
            "note": "tampered"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["entry"]["duration"].as_i64().unwrap(), stored);
    assert_eq!(body["entry"]["note"], "tampered");
}

#[actix_web::test]
async fn test_update_without_entry_date_fails() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/1",
            employee_id
        ))
        .set_json(json!({ "entry_type": 2, "duration": HOUR }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_type_change_resets_approvals_only_when_required() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let entry_date = Utc::now();
    let req = test::TestRequest::post()
        .uri(&format!("/api/timeclock/employees/{}/entries", employee_id))
        .set_json(json!({
            "entry_type": 3,
            "entry_date": entry_date,
            "duration": 8 * HOUR
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let entry_id = body["entry"]["id"].as_i64().unwrap();

    let approve = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/pay-period/{}/approve/supervisor",
            employee_id, test_app.current_period_id
        ))
        .insert_header(("X-User-Id", "7"))
        .set_json(json!({ "approved": true }))
        .to_request();
    test::call_service(&app, approve).await;

    // Holiday -> Manual is in the free transition set: approval survives.
    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": entry_date,
            "duration": 8 * HOUR
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["entry"]["approved"], true);
    assert_eq!(body["entry"]["approved_by"], 7);

    // Manual -> Holiday is not free: approval is reset for the period.
    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .set_json(json!({
            "entry_type": 3,
            "entry_date": entry_date,
            "duration": 8 * HOUR
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["entry"]["approved"], false);
    assert!(body["entry"]["approved_by"].is_null());
    assert!(body["entry"]["approval_time"].is_null());
}

#[actix_web::test]
async fn test_duration_change_on_approved_entry_resets_approvals() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let entry_date = Utc::now();
    let req = test::TestRequest::post()
        .uri(&format!("/api/timeclock/employees/{}/entries", employee_id))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": entry_date,
            "duration": 8 * HOUR
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let entry_id = body["entry"]["id"].as_i64().unwrap();

    let approve = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/pay-period/{}/approve/supervisor",
            employee_id, test_app.current_period_id
        ))
        .insert_header(("X-User-Id", "7"))
        .set_json(json!({ "approved": true }))
        .to_request();
    test::call_service(&app, approve).await;

    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .set_json(json!({
            "entry_type": 2,
            "entry_date": entry_date,
            "duration": 9 * HOUR
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["entry"]["approved"], false);
    assert_eq!(body["entry"]["duration"], 9 * HOUR);
}

#[actix_web::test]
async fn test_delete_entry_is_soft_and_keeps_actions() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let req = test::TestRequest::post()
        .uri("/api/timeclock/clock/in")
        .set_json(json!({ "login_code": "1234" }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let entry_id = body["entry"]["id"].as_i64().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}",
            employee_id, entry_id
        ))
        .insert_header(("X-User-Id", "7"))
        .set_json(json!({ "comment": "duplicate punch" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let entry = &body["entry"];
    assert_eq!(entry["deleted"], true);
    assert_eq!(entry["deleted_by"], 7);
    assert_eq!(entry["is_clocked_in"], false);
    assert!(entry["note"].as_str().unwrap().contains("duplicate punch"));
    // History survives: the original clock-in plus the deletion comment.
    let actions = entry["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 2);

    // A deleted entry no longer contributes to week totals.
    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/timeclock/employees/{}/pay-period/{}",
            employee_id, test_app.current_period_id
        ))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["totals"][0]["duration"], 0);
}

#[actix_web::test]
async fn test_delete_missing_entry_not_found() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/4242",
            employee_id
        ))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_get_entry_zero_id_is_null() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/0",
            employee_id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["entry"].is_null());
}

#[actix_web::test]
async fn test_adjust_clock_closes_open_entry() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let clock_in_time = Utc::now() - Duration::hours(3);
    let req = test::TestRequest::post()
        .uri("/api/timeclock/clock/in")
        .set_json(json!({ "login_code": "1234", "entry_date": clock_in_time }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    let entry_id = body["entry"]["id"].as_i64().unwrap();

    // Supervisor appends an adjustment carrying the clock-out flag.
    let clock_out_time = clock_in_time + Duration::hours(8);
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/{}/adjust",
            employee_id, entry_id
        ))
        .insert_header(("X-User-Id", "7"))
        .set_json(json!({
            "action": {
                "action_type": { "adjustment": true, "clock_out": true },
                "time": clock_out_time
            },
            "comment": "left without punching"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["entry"]["is_clocked_in"], false);
    assert_eq!(body["entry"]["duration"], 8 * HOUR);
    assert!(body["entry"]["note"]
        .as_str()
        .unwrap()
        .contains("left without punching"));
}

#[actix_web::test]
async fn test_adjust_clock_creates_entry_for_clock_in_action() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    let time = Utc::now() - Duration::hours(1);
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/0/adjust",
            employee_id
        ))
        .insert_header(("X-User-Id", "7"))
        .set_json(json!({
            "action": {
                "action_type": { "adjustment": true, "clock_in": true },
                "time": time
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.get("warning").is_none());
    assert_eq!(body["entry"]["is_clocked_in"], true);

    // A non-creating action against a missing entry only warns.
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/timeclock/employees/{}/entries/4242/adjust",
            employee_id
        ))
        .set_json(json!({
            "action": {
                "action_type": { "comment": true },
                "time": time
            }
        }))
        .to_request();
    let body: serde_json::Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["warning"], "Entry not found.");
    assert!(body["entry"].is_null());
}

#[actix_web::test]
async fn test_pay_period_feed_reports_totals_and_errors() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;
    let employee_id = test_app.seed_employee("1234", "H").await;

    // Stale open session from yesterday plus a manual entry today.
    let stale_in = Utc::now() - Duration::hours(30);
    let req = test::TestRequest::post()
        .uri("/api/timeclock/clock/in")
        .set_json(json!({ "login_code": "1234", "entry_date": stale_in }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/timeclock/employees/{}/entries", employee_id))
        .set_json(json!({ "entry_type": 2, "duration": 8 * HOUR }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/timeclock/employees/{}/pay-period/{}",
            employee_id, test_app.current_period_id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["has_errors"], true);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["totals"][0]["duration"], 8 * HOUR);
    assert_eq!(body["totals"][0]["has_errors"], true);
    assert_eq!(body["totals"][1]["duration"], 0);
}
