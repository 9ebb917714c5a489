mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use server::{
    AppState,
    auth::{Claims, JwtService},
    config::ServerConfig,
    routes,
};

use common::*;

const TEST_SECRET: &str = "dGhpcy1pcy1hLTMyLWJ5dGUtdGVzdC1zZWNyZXQtISE=";

async fn test_app() -> (Router, Arc<JwtService>, sqlx::SqlitePool) {
    let pool = setup_pool().await;
    let (mailer, _outbox) = RecordingMailer::new();
    let jwt_secret = SecretString::new(TEST_SECRET.into());
    let jwt = Arc::new(JwtService::new(&jwt_secret));
    let config = ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        app_public_base_url: "http://localhost:3000".to_string(),
        jwt_secret,
        mail: None,
        reminder_hour_utc: 13,
    };
    let state = AppState::new(pool.clone(), config, Arc::clone(&jwt), mailer);
    (routes::router(state), jwt, pool)
}

fn bearer_for(jwt: &JwtService, user_id: Uuid, email: &str, name: &str) -> String {
    let claims = Claims {
        sub: user_id,
        email: Some(email.to_string()),
        name: Some(name.to_string()),
        picture: None,
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    format!("Bearer {}", jwt.issue(&claims).unwrap())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _jwt, _pool) = test_app().await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let (app, _jwt, _pool) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/notifications").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::get("/notifications")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_lookup_is_public_and_opaque() {
    let (app, _jwt, _pool) = test_app().await;

    let response = app
        .oneshot(
            Request::get("/invitations/token/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, Value::Null);
}

#[tokio::test]
async fn invitation_flow_over_http() {
    let (app, jwt, pool) = test_app().await;
    let inviter = create_user(&pool, "jane@example.com", "Jane Doe").await;
    let auth = bearer_for(&jwt, inviter.id, &inviter.email, &inviter.name);

    let payload = json!({
        "email": "new@example.com",
        "role": "member",
        "type": "workspace",
    });
    let response = app
        .clone()
        .oneshot(
            Request::post("/invitations")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let invitation = body_json(response).await;
    assert_eq!(invitation["status"], "pending");
    let token = invitation["token"].as_str().unwrap().to_string();

    // The public invite page can resolve the token.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/invitations/token/{token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let found = body_json(response).await;
    assert_eq!(found["email"], "new@example.com");

    // A duplicate while pending is rejected.
    let response = app
        .clone()
        .oneshot(
            Request::post("/invitations")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Decline needs no authorization.
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/invitations/token/{token}/decline"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let declined = body_json(response).await;
    assert_eq!(declined["status"], "declined");

    // The inviter sees the fanout notification.
    let response = app
        .oneshot(
            Request::get("/notifications")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["notifications"][0]["title"], "Invitation Declined");
}
