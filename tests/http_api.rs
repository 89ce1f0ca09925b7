//! End-to-end tests of the HTTP API over the in-memory store

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use contestdesk::{AppState, Config, Repositories};

fn test_app() -> Router {
    contestdesk::app(AppState::new(Repositories::in_memory(), Config::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(format!("/api/v1{uri}"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str, organization: &str, phone: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/participants",
        Some(json!({ "name": name, "organization": organization, "phone": phone })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_checkin_flow() {
    let app = test_app();
    let participant = register(&app, "张三", "North", "13812345678").await;
    let qr = participant["qr_code_id"].as_str().unwrap().to_string();
    let id = participant["id"].as_i64().unwrap();

    let (_, info) = send(&app, "GET", &format!("/checkin/qr/{qr}"), None).await;
    assert_eq!(info["participant_exists"], true);
    assert_eq!(info["is_checked_in"], false);

    let verify = json!({ "qr_code_id": qr, "phone_last4": "5678", "name": "张三" });
    let (status, first) = send(&app, "POST", "/checkin/verify", Some(verify.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["data"]["participant"]["checkin_status"], "CHECKED_IN");

    let (status, second) = send(&app, "POST", "/checkin/verify", Some(verify)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["success"], false);
    assert_eq!(second["error_code"], "ALREADY_CHECKED_IN");
    assert!(second["details"]["checkin_time"].is_string());

    let wrong = json!({ "qr_code_id": qr, "phone_last4": "0000", "name": "张三" });
    let (_, rejected) = send(&app, "POST", "/checkin/verify", Some(wrong)).await;
    assert_eq!(rejected["error_code"], "IDENTITY_VERIFICATION_FAILED");

    let (_, status_body) = send(&app, "GET", &format!("/checkin/participants/{id}"), None).await;
    assert_eq!(status_body["history"].as_array().unwrap().len(), 1);

    let (_, stats) = send(&app, "GET", "/checkin/statistics", None).await;
    assert_eq!(stats["checked_in_participants"], 1);
    assert_eq!(stats["checkin_rate"], 100.0);
}

#[tokio::test]
async fn test_grouping_and_draw() {
    let app = test_app();
    for i in 0..25 {
        register(&app, &format!("A{i}"), "A", &format!("1380000{i:04}")).await;
    }

    let (_, grouped) = send(&app, "POST", "/groups/auto", Some(json!({ "max_group_size": 20 }))).await;
    assert_eq!(grouped["success"], true);
    assert_eq!(grouped["data"]["groups_created"], 2);
    let sizes: Vec<i64> = grouped["data"]["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["member_count"].as_i64().unwrap())
        .collect();
    assert_eq!(sizes, vec![20, 5]);

    let (_, drawn) = send(&app, "POST", "/groups/draw", None).await;
    assert_eq!(drawn["success"], true);
    let mut orders: Vec<i64> = drawn["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["draw_order"].as_i64().unwrap())
        .collect();
    orders.sort();
    assert_eq!(orders, vec![1, 2]);

    let (_, groups) = send(&app, "GET", "/groups", None).await;
    assert_eq!(groups[0]["draw_order"], 1);
    assert_eq!(groups[1]["draw_order"], 2);
}

#[tokio::test]
async fn test_invalid_grouping_bounds_and_empty_draw() {
    let app = test_app();

    let (status, merged) = send(
        &app,
        "POST",
        "/groups/merge",
        Some(json!({ "min_group_size": 10, "max_group_size": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["error_code"], "INVALID_GROUP_SIZE");

    let (_, drawn) = send(&app, "POST", "/groups/draw", None).await;
    assert_eq!(drawn["error_code"], "NO_GROUPS");
}

#[tokio::test]
async fn test_scoring_flow() {
    let app = test_app();
    let alice = register(&app, "Alice", "North", "13800000001").await;
    let bob = register(&app, "Bob", "South", "13800000002").await;
    let (_, judge) = send(&app, "POST", "/judges", Some(json!({ "name": "Judge Li" }))).await;
    let judge_id = judge["data"]["id"].as_i64().unwrap();

    let submit = |participant: &Value, score: f64| {
        json!({ "participant_id": participant["id"], "judge_id": judge_id, "score": score })
    };

    let (_, created) = send(&app, "POST", "/scores", Some(submit(&alice, 8.0))).await;
    assert_eq!(created["data"]["action"], "created");
    let (_, updated) = send(&app, "POST", "/scores", Some(submit(&alice, 9.5))).await;
    assert_eq!(updated["data"]["action"], "updated");
    assert_eq!(updated["data"]["score"]["score"], 9.5);

    let (_, rejected) = send(&app, "POST", "/scores", Some(submit(&bob, 11.0))).await;
    assert_eq!(rejected["success"], false);
    assert_eq!(rejected["error_code"], "INVALID_SCORE_RANGE");

    let (_, average) = send(
        &app,
        "GET",
        &format!("/scores/participants/{}/average", bob["id"]),
        None,
    )
    .await;
    assert_eq!(average["score_count"], 0);
    assert!(average["average_score"].is_null());

    send(&app, "POST", "/scores", Some(submit(&bob, 7.0))).await;
    let (_, ranking) = send(&app, "GET", "/scores/ranking?round_number=1", None).await;
    let ranking = ranking["ranking"].as_array().unwrap();
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["participant_name"], "Alice");
    assert_eq!(ranking[0]["rank"], 1);
    assert_eq!(ranking[0]["average_score"], 9.5);

    let (_, progress) = send(&app, "GET", "/scores/progress", None).await;
    assert_eq!(progress["completion_rate"], 100.0);
}

#[tokio::test]
async fn test_lookups_of_missing_records_are_not_found() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/participants/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PARTICIPANT_NOT_FOUND");

    let (status, body) = send(&app, "GET", "/groups/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "GROUP_NOT_FOUND");
}

#[tokio::test]
async fn test_batch_registration_reports_failures_per_index() {
    let app = test_app();
    let (status, report) = send(
        &app,
        "POST",
        "/participants/batch",
        Some(json!({
            "participants": [
                { "name": "A", "organization": "North", "phone": "13800000001" },
                { "name": "B", "organization": "North", "phone": "not-a-phone" },
                { "name": "C", "organization": "South", "phone": "13800000003" },
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["success_count"], 2);
    assert_eq!(report["error_count"], 1);
    assert_eq!(report["errors"][0]["index"], 1);
    assert_eq!(report["errors"][0]["error_code"], "VALIDATION_ERROR");
}
