//! Router-level tests against an in-memory database

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wealthplan_core::EngineDefaults;
use wealthplan_server::{app, db};

fn test_app() -> Router {
    let conn = db::open(":memory:").unwrap();
    app(conn, EngineDefaults::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
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

async fn create_client(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, "POST", "/clients", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn post_snapshot(
    app: &Router,
    client: i64,
    kind: &str,
    as_of_date: &str,
    total_value: f64,
    allocations: Value,
) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/portfolios",
        Some(json!({
            "client_id": client,
            "kind": kind,
            "as_of_date": as_of_date,
            "total_value": total_value,
            "allocations": allocations,
        })),
    )
    .await
}

async fn client_with_baseline(app: &Router) -> i64 {
    let client = create_client(app, "Ada").await;
    let (status, _) = post_snapshot(
        app,
        client,
        "CURRENT",
        "2025-01-15",
        100_000.0,
        json!([{ "asset_class": "EQUITIES", "percent": 100.0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    client
}

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

// ============================================================================
// Clients
// ============================================================================

#[tokio::test]
async fn test_client_create_and_get() {
    let app = test_app();
    let id = create_client(&app, "Ada").await;

    let (status, body) = send(&app, "GET", &format!("/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");
    assert!(body["alignment_percent"].is_null());
    assert!(body["alignment_category"].is_null());

    let (status, body) = send(&app, "GET", "/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_not_found_and_empty_name() {
    let app = test_app();

    let (status, _) = send(&app, "GET", "/clients/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/clients", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "name");
}

// ============================================================================
// Snapshots and alignment
// ============================================================================

#[tokio::test]
async fn test_snapshot_rejects_bad_allocation_sum() {
    let app = test_app();
    let client = create_client(&app, "Ada").await;

    let (status, body) = post_snapshot(
        &app,
        client,
        "CURRENT",
        "2025-01-01",
        50_000.0,
        json!([
            { "asset_class": "EQUITIES", "percent": 60.0 },
            { "asset_class": "CASH", "percent": 30.0 }
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "allocations");
}

#[tokio::test]
async fn test_alignment_is_recomputed_on_snapshot_write() {
    let app = test_app();
    let client = create_client(&app, "Ada").await;

    // Only a Current snapshot: nothing to align against
    let (status, body) = post_snapshot(
        &app,
        client,
        "CURRENT",
        "2025-01-01",
        100_000.0,
        json!([
            { "asset_class": "EQUITIES", "percent": 60.0 },
            { "asset_class": "FIXED_INCOME", "percent": 40.0 }
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["alignment"]["percent"].is_null());
    assert!(body["alignment"]["category"].is_null());

    let (status, body) = post_snapshot(
        &app,
        client,
        "PLAN",
        "2025-01-01",
        100_000.0,
        json!([
            { "asset_class": "EQUITIES", "percent": 50.0 },
            { "asset_class": "FIXED_INCOME", "percent": 50.0 }
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_close(&body["alignment"]["percent"], 0.9);
    assert_eq!(body["alignment"]["category"], "MILD_DRIFT");
    assert_close(&body["alignment"]["aligned_value"], 90_000.0);

    let (status, body) = send(&app, "GET", &format!("/clients/{client}/alignment"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_close(&body["percent"], 0.9);
    assert_eq!(body["category"], "MILD_DRIFT");
    assert_close(&body["aligned_value"], 90_000.0);

    let (_, body) = send(&app, "GET", &format!("/clients/{client}"), None).await;
    assert_eq!(body["alignment_category"], "MILD_DRIFT");
}

#[tokio::test]
async fn test_snapshot_same_date_replaces_previous() {
    let app = test_app();
    let client = create_client(&app, "Ada").await;

    let (_, first) = post_snapshot(
        &app,
        client,
        "CURRENT",
        "2025-03-31",
        100_000.0,
        json!([{ "asset_class": "CASH", "percent": 100.0 }]),
    )
    .await;
    let (status, second) = post_snapshot(
        &app,
        client,
        "CURRENT",
        "2025-03-31",
        200_000.0,
        json!([
            { "asset_class": "EQUITIES", "percent": 50.0 },
            { "asset_class": "FIXED_INCOME", "percent": 50.0 }
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["snapshot_id"], second["snapshot_id"]);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/portfolios?clientId={client}&kind=CURRENT"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let snapshots = body.as_array().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_close(&snapshots[0]["total_value"], 200_000.0);
    assert_eq!(snapshots[0]["allocations"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Events and goals
// ============================================================================

#[tokio::test]
async fn test_event_crud_and_filters() {
    let app = test_app();
    let client = create_client(&app, "Ada").await;

    let (status, body) = send(
        &app,
        "POST",
        "/events",
        Some(json!({
            "client_id": client,
            "kind": "CONTRIBUTION",
            "frequency": "MONTHLY",
            "amount": 0.0,
            "start": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "amount");

    let (status, monthly) = send(
        &app,
        "POST",
        "/events",
        Some(json!({
            "client_id": client,
            "kind": "CONTRIBUTION",
            "frequency": "MONTHLY",
            "amount": 500.0,
            "start": "2025-01-01",
            "end": "2026-12-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let monthly_id = monthly["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/events",
        Some(json!({
            "client_id": client,
            "kind": "DEPOSIT",
            "frequency": "ONE_TIME",
            "amount": 10_000.0,
            "start": "2030-06-01",
            "description": "inheritance"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/events?clientId={client}&type=DEPOSIT"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["description"], "inheritance");

    // Activity window 2027..2028 matches neither event
    let (_, body) = send(
        &app,
        "GET",
        &format!("/events?clientId={client}&from=2027-01-01&to=2028-12-31"),
        None,
    )
    .await;
    assert_eq!(body["total"], 0);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/events?clientId={client}&perPage=1"),
        None,
    )
    .await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["id"], monthly_id);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/events/{monthly_id}"),
        Some(json!({ "amount": 750.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_close(&body["amount"], 750.0);
    assert_eq!(body["frequency"], "MONTHLY");
    assert_eq!(body["end"], "2026-12-31");

    // An explicit null makes the event open-ended again
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/events/{monthly_id}"),
        Some(json!({ "end": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("end").is_none());
    assert_close(&body["amount"], 750.0);

    let (_, body) = send(&app, "GET", &format!("/events/{monthly_id}"), None).await;
    assert!(body.get("end").is_none());

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/events/{monthly_id}"),
        Some(json!({ "end": "2024-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/events/{monthly_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/events/{monthly_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/events/{monthly_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_goals_are_listed_by_target_date() {
    let app = test_app();
    let client = create_client(&app, "Ada").await;

    for (name, date) in [("Retirement", "2050-12-31"), ("House", "2030-06-30")] {
        let (status, _) = send(
            &app,
            "POST",
            "/goals",
            Some(json!({
                "client_id": client,
                "name": name,
                "target_value": 500_000.0,
                "target_date": date
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", &format!("/goals?clientId={client}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "House");
    assert_eq!(body[1]["name"], "Retirement");

    let (status, _) = send(
        &app,
        "POST",
        "/goals",
        Some(json!({
            "client_id": 999,
            "name": "Orphan",
            "target_value": 1.0,
            "target_date": "2030-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Projection
// ============================================================================

#[tokio::test]
async fn test_projection_requires_baseline() {
    let app = test_app();
    let client = create_client(&app, "Ada").await;

    let (status, _) = send(&app, "GET", &format!("/clients/{client}/projection"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // An explicit initial value stands in for the snapshot
    let (status, body) = send(
        &app,
        "GET",
        &format!("/clients/{client}/projection?initialValue=1000&rate=0&untilYear=3000&mode=yearly"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_close(&body["last_value"], 1000.0);
}

#[tokio::test]
async fn test_projection_yearly_compounding() {
    let app = test_app();
    let client = client_with_baseline(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!(
            "/clients/{client}/projection?rate=0.05&untilYear=2027&mode=yearly&includeEvents=false"
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start_year"], 2025);
    assert_eq!(body["mode"], "yearly");
    assert_eq!(body["points"], 3);
    assert_close(&body["series"][0]["value"], 100_000.0);
    assert_close(&body["series"][1]["value"], 105_000.0);
    assert_close(&body["series"][2]["value"], 110_250.0);
    assert_close(&body["last_value"], 110_250.0);
}

#[tokio::test]
async fn test_projection_monthly_default() {
    let app = test_app();
    let client = client_with_baseline(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/clients/{client}/projection?rate=0.05&untilYear=2025"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "monthly");
    assert_eq!(body["points"], 1);
    assert_close(&body["last_value"], 104_999.99);
}

#[tokio::test]
async fn test_projection_rejects_inverted_horizon() {
    let app = test_app();
    let client = client_with_baseline(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/clients/{client}/projection?startYear=2030&untilYear=2025"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "startYear");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/clients/{client}/projection?rate=1.5"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "rate");
}

// ============================================================================
// Simulation history
// ============================================================================

#[tokio::test]
async fn test_simulation_versions_and_history() {
    let app = test_app();
    let client = client_with_baseline(&app).await;
    let uri = format!("/clients/{client}/simulations");
    let body = json!({ "name": "base case", "rate": 0.05, "untilYear": 2027, "includeEvents": false });

    let (status, first) = send(&app, "POST", &uri, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["version"], 1);
    assert_eq!(first["inputs"]["mode"], "yearly");
    assert_eq!(first["inputs"]["source"], "snapshot");
    assert_eq!(first["inputs"]["snapshot_year"], 2025);
    assert_close(&first["inputs"]["initial_value_used"], 100_000.0);
    assert_eq!(first["series"].as_array().unwrap().len(), 3);

    let (status, second) = send(&app, "POST", &uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["version"], 2);

    let (status, page) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["per_page"], 20);
    assert_eq!(page["items"][0]["version"], 2);
    assert!(page["items"][0].get("series").is_none());

    let (_, page) = send(&app, "GET", &format!("{uri}?perPage=1&page=2&withSeries=true"), None).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["version"], 1);
    assert_eq!(page["items"][0]["series"].as_array().unwrap().len(), 3);

    let (status, _) = send(&app, "GET", &format!("{uri}?perPage=101"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = first["id"].as_str().unwrap();
    let (status, run) = send(&app, "GET", &format!("/simulations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run["name"], "base case");
    assert_close(&run["series"][2]["value"], 110_250.0);

    let (status, _) = send(&app, "GET", "/simulations/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_simulate_is_stateless() {
    let app = test_app();
    let events = json!([{
        "kind": "CONTRIBUTION",
        "frequency": "MONTHLY",
        "amount": 100.0,
        "start": "2025-01-01"
    }]);

    let (status, body) = send(
        &app,
        "POST",
        "/simulate",
        Some(json!({
            "initial_value": 1000.0,
            "annual_rate": 0.0,
            "start_year": 2025,
            "horizon_year": 2027,
            "events": events
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], 3);
    assert_close(&body["series"][0]["value"], 2_200.0);
    assert_close(&body["series"][2]["value"], 4_600.0);
    assert!(body["series"][0].get("flow").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/simulate",
        Some(json!({
            "initial_value": 1000.0,
            "annual_rate": 0.0,
            "start_year": 2025,
            "horizon_year": 2027,
            "mode": "yearly",
            "events": events
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_close(&body["series"][0]["flow"], 1_200.0);
    assert_close(&body["last_value"], 4_600.0);

    let (status, _) = send(
        &app,
        "POST",
        "/simulate",
        Some(json!({
            "initial_value": 1000.0,
            "annual_rate": 0.05,
            "start_year": 2030,
            "horizon_year": 2025
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Suggestions
// ============================================================================

#[tokio::test]
async fn test_suggestions_without_baseline() {
    let app = test_app();
    let client = create_client(&app, "Ada").await;

    let (status, body) = send(&app, "GET", &format!("/clients/{client}/suggestions"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 0);
    assert_eq!(body["meta"]["reason"], "No CURRENT snapshot");
}

#[tokio::test]
async fn test_suggestions_contribution_for_goal() {
    let app = test_app();
    let client = client_with_baseline(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        "/goals",
        Some(json!({
            "client_id": client,
            "name": "Retirement",
            "target_value": 200_000.0,
            "target_date": "2034-12-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/clients/{client}/suggestions?rate=0.04&roundStep=10"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    let s = &suggestions[0];
    assert_eq!(s["type"], "CONTRIBUTION");
    assert_eq!(s["details"]["outcome"], "contribution");
    assert_eq!(s["details"]["months"], 120);
    assert_close(&s["details"]["projected_at_goal"], 148_024.42);
    assert_close(&s["details"]["suggested_monthly"], 360.0);
    assert!((s["details"]["required_monthly"].as_f64().unwrap() - 354.31).abs() < 0.01);
    assert_eq!(
        s["message"],
        "Increase monthly contributions by 360 for 120 months to reach \"Retirement\" by 2034."
    );

    assert_close(&body["meta"]["annual_rate"], 0.04);
    assert_eq!(body["meta"]["start_date"], "2025-01-15");
    assert_close(&body["meta"]["initial_value"], 100_000.0);
}

#[tokio::test]
async fn test_suggestions_validate_query() {
    let app = test_app();
    let client = client_with_baseline(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/clients/{client}/suggestions?roundStep=0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "roundStep");

    let (status, _) = send(&app, "GET", "/clients/404/suggestions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
