//! HTTP-level tests: every route wired, status codes per error class and the
//! JSON error envelope.


use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use fixtures::{local, test_app};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Parses a JSON timestamp field; comparisons go through `DateTime` so the
/// exact RFC 3339 rendering does not matter.
fn ts(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn booking_payload(resource_id: &str, start: &str, end: &str) -> Value {
    json!({
        "customer_name": "Ngoc",
        "phone": "0900000010",
        "service_id": "svc_stone",
        "branch_id": "branch_main",
        "resource_id": resource_id,
        "start_time": start,
        "end_time": end,
    })
}

#[tokio::test]
async fn resources_lists_virtual_and_explicit_beds() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/resources?branch_id=branch_main", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"room_body_bed_1"));
    assert!(ids.contains(&"room_body_bed_2"));
    assert!(ids.contains(&"vip_bed_left"));
    assert!(ids.contains(&"room_head"));
}

#[tokio::test]
async fn resources_unknown_branch_is_404() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/resources?branch_id=nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn availability_reflects_a_booking() {
    let app = test_app();
    let create = booking_payload(
        "room_head",
        &local(10, 0).to_rfc3339(),
        &local(11, 0).to_rfc3339(),
    );
    let (status, _) = send(&app, "POST", "/bookings", Some(create)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        "/availability?branch_id=branch_main&date=2026-03-02&room_type=HEAD_SPA",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no_resources"], false);
    let ranges = body["ranges"].as_array().unwrap();
    assert_eq!(ranges.len(), 2);
    // Longest first: 11:00-18:00 local, then 09:00-10:00 local.
    assert_eq!(ts(&ranges[0]["start"]), local(11, 0));
    assert_eq!(ts(&ranges[0]["end"]), local(18, 0));
}

#[tokio::test]
async fn availability_distinguishes_no_resources() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "GET",
        "/availability?branch_id=branch_main&date=2026-03-02&room_type=OTHER",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no_resources"], true);
    assert!(body["ranges"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn availability_rejects_malformed_date() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "GET",
        "/availability?branch_id=branch_main&date=March-2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn double_booking_is_409_with_the_conflicting_id() {
    let app = test_app();
    let (status, first) = send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_head",
            &local(10, 0).to_rfc3339(),
            &local(11, 0).to_rfc3339(),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_head",
            &local(10, 30).to_rfc3339(),
            &local(11, 30).to_rfc3339(),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 409);
    assert_eq!(body["error"]["conflicting_booking_id"], first["id"]);
}

#[tokio::test]
async fn inverted_interval_is_400() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_head",
            &local(11, 0).to_rfc3339(),
            &local(10, 0).to_rfc3339(),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn day_listing_returns_the_branch_bookings() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_head",
            &local(10, 0).to_rfc3339(),
            &local(11, 0).to_rfc3339(),
        )),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        "/bookings?branch_id=branch_main&date=2026-03-02",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Other branch, same day: empty.
    let (_, body) = send(
        &app,
        "GET",
        "/bookings?branch_id=branch_riverside&date=2026-03-02",
        None,
    )
    .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn propose_and_commit_gate_a_drag() {
    let app = test_app();
    let (_, booking) = send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_body_bed_1",
            &local(10, 0).to_rfc3339(),
            &local(11, 0).to_rfc3339(),
        )),
    )
    .await;

    // Dragging another booking onto the same bed is rejected at propose time.
    let (status, _) = send(
        &app,
        "POST",
        "/assignments/propose",
        Some(json!({
            "resource_id": "room_body_bed_1",
            "start_time": local(10, 30).to_rfc3339(),
            "end_time": local(11, 30).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Committing the booking to a free bed and slot succeeds.
    let (status, moved) = send(
        &app,
        "POST",
        "/assignments/commit",
        Some(json!({
            "booking_id": booking["id"],
            "resource_id": "room_body_bed_2",
            "start_time": local(14, 0).to_rfc3339(),
            "end_time": local(15, 0).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["bed_id"], "room_body_bed_2");
}

#[tokio::test]
async fn transition_endpoint_enforces_the_state_machine() {
    let app = test_app();
    let (_, booking) = send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_head",
            &local(10, 0).to_rfc3339(),
            &local(11, 0).to_rfc3339(),
        )),
    )
    .await;
    let id = booking["id"].as_str().unwrap().to_string();

    // Skipping straight to complete is an invalid transition.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/bookings/{id}/transition"),
        Some(json!({"action": "complete"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid transition"));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/bookings/{id}/transition"),
        Some(json!({"action": "approve"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["valid_actions"], json!(["check_in", "cancel"]));
}

#[tokio::test]
async fn transition_unknown_booking_is_404() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/bookings/00000000-0000-0000-0000-000000000000/transition",
        Some(json!({"action": "approve"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn waitlist_crud_and_mismatch_warning() {
    let app = test_app();
    let (status, item) = send(
        &app,
        "POST",
        "/waitlist",
        Some(json!({
            "customer_name": "Thu",
            "phone": "0900000011",
            "service_name": "Gel Polish",
            "preferred_time": local(14, 0).to_rfc3339(),
            "duration_minutes": 45,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item_id = item["id"].as_str().unwrap().to_string();

    let (_, listed) = send(&app, "GET", "/waitlist", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Dropping a nail entry onto a head room warns instead of booking.
    let (status, outcome) = send(
        &app,
        "POST",
        &format!("/waitlist/{item_id}/match"),
        Some(json!({
            "resource_id": "room_head",
            "drop_time": local(14, 0).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "type_mismatch");
    assert_eq!(outcome["expected"], "NAIL_SPA");

    // Matching onto the nail station books and dequeues.
    let (status, outcome) = send(
        &app,
        "POST",
        &format!("/waitlist/{item_id}/match"),
        Some(json!({
            "resource_id": "room_nail",
            "drop_time": local(14, 0).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "booked");

    let (status, _) = send(&app, "DELETE", &format!("/waitlist/{item_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn changes_feed_reports_revisions() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/bookings/changes?since=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revision"], 0);

    send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_head",
            &local(10, 0).to_rfc3339(),
            &local(11, 0).to_rfc3339(),
        )),
    )
    .await;

    let (_, body) = send(&app, "GET", "/bookings/changes?since=0", None).await;
    assert_eq!(body["revision"], 1);
    assert_eq!(body["bookings"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/bookings/changes?since=1", None).await;
    assert!(body["bookings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upsell_endpoint_chains_a_booking() {
    let app = test_app();
    let (_, booking) = send(
        &app,
        "POST",
        "/bookings",
        Some(booking_payload(
            "room_head",
            &local(10, 0).to_rfc3339(),
            &local(11, 0).to_rfc3339(),
        )),
    )
    .await;
    let id = booking["id"].as_str().unwrap().to_string();

    let (status, chained) = send(
        &app,
        "POST",
        &format!("/bookings/{id}/upsell"),
        Some(json!({"service_name": "Hot Stone Massage", "qty": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chained["double_booking_risk"], false);
    assert_eq!(chained["booking"]["source"], "linked");
    assert_eq!(ts(&chained["booking"]["start_time"]), local(11, 0));
}
