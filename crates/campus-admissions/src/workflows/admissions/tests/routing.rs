use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::admissions::router::{application_handler, review_handler};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn intake_payload(name: &str) -> Value {
    json!({
        "student_name": name,
        "course": "B.Tech Computer Science",
        "document_status": "verified",
        "applied_date": "2024-06-10",
    })
}

fn kind_of(payload: &Value) -> Option<&str> {
    payload.get("kind").and_then(Value::as_str)
}

#[tokio::test]
async fn submit_route_creates_application() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/admissions/applications",
            intake_payload("Aarav Sharma"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("application_id").and_then(Value::as_str),
        Some("APP2024001")
    );
    assert_eq!(
        payload.get("status").and_then(Value::as_str),
        Some("submitted")
    );
}

#[tokio::test]
async fn blank_intake_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/admissions/applications",
            intake_payload("  "),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(kind_of(&payload), Some("invalid_intake"));
}

#[tokio::test]
async fn application_handler_reports_missing_records() {
    let (service, _, _) = build_service();

    let response = application_handler(State(Arc::new(service)), Path("APP2024404".to_string()))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(kind_of(&payload), Some("not_found"));
}

#[tokio::test]
async fn illegal_transition_is_conflict() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let application = service
        .submit(intake("Aarav Sharma", "BBA"))
        .expect("intake");
    service
        .approve(&application.application_id)
        .expect("approve");

    let response = review_handler(
        State(service.clone()),
        Path(application.application_id.0.clone()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(kind_of(&payload), Some("invalid_transition"));
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .is_some_and(|message| message.contains("approved")));
}

#[tokio::test]
async fn offer_with_oversized_scholarship_is_unprocessable() {
    let (service, _, _) = build_service();
    let application = approved_application(&service, "Aarav Sharma");
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/admissions/offers",
            json!({
                "application_id": application.application_id,
                "fee_amount": 10_000,
                "scholarship": 12_000,
                "offer_date": "2024-07-01",
                "expiry_date": "2024-07-31",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(kind_of(&payload), Some("invalid_amount"));
}

#[tokio::test]
async fn late_acceptance_is_conflict() {
    let (service, _, _) = build_service();
    let application = approved_application(&service, "Aarav Sharma");
    let offer = service
        .create_offer(offer_command(&application.application_id))
        .expect("offer");
    let router = router_with_service(service);

    let response = router
        .oneshot(post_empty(&format!(
            "/api/v1/admissions/offers/{}/accept?today=2024-08-15",
            offer.offer_id
        )))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(kind_of(&payload), Some("offer_expired"));
}

#[tokio::test]
async fn offers_list_reports_effective_status() {
    let (service, _, _) = build_service();
    let application = approved_application(&service, "Aarav Sharma");
    service
        .create_offer(offer_command(&application.application_id))
        .expect("offer");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/v1/admissions/offers?today=2024-07-15"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["effective_status"], json!("pending"));
    assert_eq!(payload[0]["final_amount"], json!(45_000));

    let response = router
        .oneshot(get(
            "/api/v1/admissions/offers?acceptance=expired&today=2024-09-01",
        ))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["acceptance_status"], json!("pending"));
}

#[tokio::test]
async fn enrollment_routes_walk_eligible_candidates() {
    let (service, payments, notices) = build_service();
    let offer = paid_acceptance(&service, &payments, "Aarav Sharma");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/v1/admissions/enrollments/eligible?today=2024-07-15"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload[0]["application_id"],
        json!(offer.application_id.0.as_str())
    );

    let enroll = json!({ "application_id": offer.application_id });
    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/admissions/enrollments?today=2024-07-15",
            enroll.clone(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["student_id"], json!("STU2024001"));

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/admissions/enrollments?today=2024-07-16",
            enroll,
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(kind_of(&payload), Some("duplicate_enrollment"));

    let response = router
        .oneshot(get("/api/v1/admissions/enrollments?search=aarav"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(notices.templates().last().map(String::as_str), Some("student_enrolled"));
}

#[tokio::test]
async fn bulk_route_reports_enrolled_students() {
    let (service, payments, _) = build_service();
    paid_acceptance(&service, &payments, "Aarav Sharma");
    paid_acceptance(&service, &payments, "Diya Patel");
    let router = router_with_service(service);

    let response = router
        .oneshot(post_empty(
            "/api/v1/admissions/enrollments/bulk?today=2024-07-15",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["enrolled"][0]["student_id"], json!("STU2024001"));
    assert_eq!(payload["enrolled"][1]["student_id"], json!("STU2024002"));
    assert_eq!(payload["skipped"], json!([]));
}

#[tokio::test]
async fn catalog_offer_route_prices_from_catalog() {
    let (service, _, _) = build_service();
    let application = approved_application(&service, "Aarav Sharma");
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/admissions/offers/catalog",
            json!({
                "application_id": application.application_id,
                "scholarship": 5_000,
                "offer_date": "2024-07-01",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["fee_amount"], json!(50_000));
    assert_eq!(payload["expiry_date"], json!("2024-07-31"));
    assert_eq!(payload["status"], json!("draft"));
}

#[tokio::test]
async fn catalog_offer_route_rejects_dates_at_calendar_end() {
    let (service, _, _) = build_service();
    let application = approved_application(&service, "Aarav Sharma");
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/admissions/offers/catalog",
            json!({
                "application_id": application.application_id,
                "offer_date": "+262142-12-31",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(kind_of(&payload), Some("invalid_intake"));
}
