//! HTTP API tests driving the axum router in-process.

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use shiftplan::config::AppConfig;
use shiftplan::db::FullRepository;
use shiftplan::http::{create_router, AppState};
use shiftplan::models::TenantId;

use support::{demo_repo, EMP001, EMP002, SHIFT_MORNING, TENANT};

fn app() -> Router {
    let repo = Arc::new(demo_repo()) as Arc<dyn FullRepository>;
    create_router(AppState::new(repo, AppConfig::default()))
}

async fn send(app: &Router, method: Method, uri: &str, tenant: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header("X-Tenant-Id", tenant);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(TENANT), None).await
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "connected");
}

#[tokio::test]
async fn test_tenant_header_is_mandatory() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/v1/schedules", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["message"], "En-tête X-Tenant-Id manquant");

    let (status, _) = send(&app, Method::GET, "/v1/schedules", Some("acme"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schedule_lifecycle() {
    let app = app();
    let payload = json!({
        "employeeId": EMP001,
        "shiftId": SHIFT_MORNING,
        "dateDebut": "2026-04-27",
        "dateFin": "2026-05-03",
        "notes": "Inventaire"
    });

    let (status, created) = send(&app, Method::POST, "/v1/schedules", Some(TENANT), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["created"], 5);
    assert_eq!(created["excluded"][0]["reason"], "JOUR_FERIE");
    assert_eq!(created["dateRange"]["start"], "2026-04-27");

    let (status, dup) = send(&app, Method::POST, "/v1/schedules", Some(TENANT), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(dup["code"], "CONFLICT");

    let uri = format!("/v1/schedules?employeeId={}&startDate=2026-04-27&endDate=2026-05-03&limit=2", EMP001);
    let (status, list) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], 5);
    assert_eq!(list["meta"]["totalPages"], 3);
    assert_eq!(list["data"].as_array().unwrap().len(), 2);
    assert_eq!(list["data"][0]["employee"]["matricule"], "EMP001");

    let id = list["data"][0]["id"].as_str().unwrap().to_string();
    let (status, one) = get(&app, &format!("/v1/schedules/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["date"], "2026-04-27");

    let (status, patched) = send(
        &app,
        Method::PATCH,
        &format!("/v1/schedules/{}", id),
        Some(TENANT),
        Some(json!({ "notes": "Quai 3", "customStartTime": "09:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["notes"], "Quai 3");
    assert_eq!(patched["customStartTime"], "09:00");

    let (status, deleted) = send(&app, Method::DELETE, &format!("/v1/schedules/{}", id), Some(TENANT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Planning supprimé avec succès");

    let (status, missing) = get(&app, &format!("/v1/schedules/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Planning non trouvé");
}

#[tokio::test]
async fn test_other_tenants_see_nothing() {
    let app = app();
    let payload = json!({
        "employeeId": EMP001,
        "shiftId": SHIFT_MORNING,
        "dateDebut": "2026-03-02"
    });
    let (status, _) = send(&app, Method::POST, "/v1/schedules", Some(TENANT), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    let stranger = TenantId::generate().to_string();
    let (status, list) = send(&app, Method::GET, "/v1/schedules", Some(&stranger), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["meta"]["total"], 0);
}

#[tokio::test]
async fn test_bulk_create_and_delete() {
    let app = app();
    let payload = json!({
        "schedules": [
            { "employeeId": EMP001, "shiftId": SHIFT_MORNING, "dateDebut": "2026-03-02", "dateFin": "2026-03-03" },
            { "employeeId": EMP002, "shiftId": SHIFT_MORNING, "dateDebut": "2026-03-02" }
        ]
    });
    let (status, body) = send(&app, Method::POST, "/v1/schedules/bulk", Some(TENANT), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 3);

    let (_, list) = get(&app, "/v1/schedules").await;
    let ids: Vec<Value> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].clone())
        .collect();
    assert_eq!(ids.len(), 3);

    let (status, body) = send(&app, Method::DELETE, "/v1/schedules/bulk", Some(TENANT), Some(json!({ "ids": ids }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 3);

    let (status, _) = send(&app, Method::DELETE, "/v1/schedules/bulk", Some(TENANT), Some(json!({ "ids": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_week_and_month_views() {
    let app = app();
    let (status, week) = get(&app, "/v1/schedules/week/2026-03-04").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(week["startDate"], "2026-03-02");
    assert_eq!(week["endDate"], "2026-03-08");
    assert_eq!(week["leaves"].as_array().unwrap().len(), 1);

    let (status, month) = get(&app, "/v1/schedules/month/2026-02-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(month["endDate"], "2026-02-28");

    let (status, _) = get(&app, "/v1/schedules/week/demain").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_alerts_endpoint() {
    let (status, alerts) = get(&app(), "/v1/schedules/alerts?startDate=2026-03-02&endDate=2026-03-08").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 6);
    assert_eq!(alerts[0]["type"], "MINIMUM_STAFFING");
    assert_eq!(alerts[0]["severity"], "WARNING");
}

#[tokio::test]
async fn test_rotation_endpoints() {
    let app = app();
    let employees = json!([{ "employeeId": EMP001, "startDate": "2026-03-02" }]);

    let (status, preview) = send(
        &app,
        Method::POST,
        "/v1/schedules/rotation/preview",
        Some(TENANT),
        Some(json!({ "workDays": 2, "restDays": 1, "endDate": "2026-03-08", "employees": employees })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["totalSchedulesToCreate"], 5);
    assert_eq!(preview["preview"][0]["schedule"][2]["isWorkDay"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/schedules/rotation/preview",
        Some(TENANT),
        Some(json!({ "workDays": 8, "restDays": 1, "endDate": "2026-03-08", "employees": employees })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, result) = send(
        &app,
        Method::POST,
        "/v1/schedules/rotation/generate",
        Some(TENANT),
        Some(json!({
            "workDays": 2,
            "restDays": 1,
            "shiftId": SHIFT_MORNING,
            "endDate": "2026-03-08",
            "employees": employees
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(result["success"], 5);
}

#[tokio::test]
async fn test_replacement_endpoints() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/schedules",
        Some(TENANT),
        Some(json!({ "employeeId": EMP001, "shiftId": SHIFT_MORNING, "dateDebut": "2026-03-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!(
        "/v1/schedules/replacements/suggestions?originalEmployeeId={}&date=2026-03-03&shiftId={}",
        EMP001, SHIFT_MORNING
    );
    let (status, suggestions) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(suggestions[0]["employee"]["matricule"], "EMP002");

    let (status, pending) = send(
        &app,
        Method::POST,
        "/v1/schedules/replacements",
        Some(TENANT),
        Some(json!({
            "date": "2026-03-03",
            "originalEmployeeId": EMP001,
            "replacementEmployeeId": EMP002,
            "shiftId": SHIFT_MORNING
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pending["status"], "PENDING");

    let (status, listed) = get(&app, "/v1/schedules/replacements?status=PENDING").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let id = pending["id"].as_str().unwrap().to_string();
    let approve = format!("/v1/schedules/replacements/{}/approve", id);
    let (status, approved) = send(&app, Method::PATCH, &approve, Some(TENANT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "APPROVED");

    let reject = format!("/v1/schedules/replacements/{}/reject", id);
    let (status, _) = send(&app, Method::PATCH, &reject, Some(TENANT), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::PATCH, "/v1/schedules/replacements/abc/approve", Some(TENANT), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_csv_import_endpoints() {
    let app = app();
    let csv = "Matricule,Date Début,Date Fin,Code Shift\nEMP001,02/03/2026,04/03/2026,M\nEMP404,02/03/2026,,M\n";
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/schedules/import/csv")
        .header("X-Tenant-Id", TENANT)
        .header("content-type", "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["success"], 3);
    assert_eq!(body["data"]["failed"], 1);
    assert_eq!(body["data"]["errors"][0]["row"], 3);

    let response = app
        .oneshot(
            Request::get("/v1/schedules/import/template")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Matricule,Date Début"));
}
