mod common;

use axum::http::{Method, StatusCode};
use common::{app, get, send, ScriptedSource, TOKEN};
use serde_json::json;

#[tokio::test]
async fn test_profile_lifecycle() {
    let app = app(ScriptedSource::new(Ok(Vec::new())));

    let (status, body) = get(&app, "/api/user/profile").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let update = json!({
        "name": "  Ada  ",
        "healthData": { "age": 34, "conditions": ["asthma"], "sensitivity": "high" },
        "preferences": {
            "alertsEnabled": false,
            "alertThreshold": "unhealthy",
            "location": { "latitude": 34.05, "longitude": -118.24, "city": "Los Angeles" }
        }
    });
    let (status, body) =
        send(&app, Method::PUT, "/api/user/profile", Some(TOKEN), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["id"], "u1");
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["healthData"]["conditions"], json!(["asthma"]));

    let (status, body) = get(&app, "/api/user/profile").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("message").is_none());
    assert_eq!(body["user"]["preferences"]["alertThreshold"], "unhealthy");
    assert_eq!(body["user"]["preferences"]["alertsEnabled"], false);
    assert_eq!(body["user"]["preferences"]["location"]["city"], "Los Angeles");

    // the stored threshold shows up on the alerts endpoint
    let (_, body) = get(&app, "/api/airquality/alerts").await;
    assert_eq!(body["userThreshold"], "unhealthy");
    assert_eq!(body["userThresholdAqi"], 151);

    // a partial update leaves the other sections alone
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/user/profile",
        Some(TOKEN),
        Some(json!({ "name": "Ada L" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ada L");
    assert_eq!(body["user"]["healthData"]["sensitivity"], "high");

    let (status, body) = send(&app, Method::DELETE, "/api/user/account", Some(TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account deleted successfully");

    let (status, _) = get(&app, "/api/user/profile").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_profile_update_is_rejected() {
    let app = app(ScriptedSource::new(Ok(Vec::new())));

    let update = json!({
        "name": "A",
        "healthData": { "age": 130, "conditions": ["asthma"] },
        "preferences": { "alertThreshold": "sometimes" }
    });
    let (status, body) =
        send(&app, Method::PUT, "/api/user/profile", Some(TOKEN), Some(update)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["healthData.age", "name", "preferences"]);
    assert_eq!(body["errors"][0]["message"], "Age must be between 0 and 120");

    // nothing was stored
    let (status, _) = get(&app, "/api/user/profile").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_routes_require_token() {
    let app = app(ScriptedSource::new(Ok(Vec::new())));

    let (status, _) = send(&app, Method::GET, "/api/user/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/user/account",
        Some("Bearer demo-token-"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
