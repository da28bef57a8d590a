//! End-to-end tests driving the router with in-memory SurrealDB.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use keygate_auth::{AuthConfig, OwnerAccount};
use keygate_core::credential::hash_password;
use keygate_server::{AppState, router};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

const ALICE_PASSWORD: &str = "alice-password";

async fn app() -> Router {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    let repo = keygate_db::open(db).await.unwrap();

    let config = AuthConfig {
        owners: vec![OwnerAccount::admin(
            "alice",
            hash_password(ALICE_PASSWORD, None).unwrap(),
        )],
        ..AuthConfig::default()
    };
    router(AppState::new(repo, &config))
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        request = request.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(v) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn alice() -> Option<String> {
    Some(basic("alice", ALICE_PASSWORD))
}

#[tokio::test]
async fn create_returns_credential_once() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/_permission",
        alice(),
        Some(json!({ "ops": ["read"], "acls": ["search"] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let username = body["username"].as_str().unwrap();
    assert_eq!(username.len(), 12);
    assert!(!body["password"].as_str().unwrap().is_empty());
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["ops"], json!(["read"]));
    assert_eq!(body["acls"], json!(["search"]));
    assert!(body.get("password_hash").is_none());

    let (status, fetched) = send(
        &app,
        Method::GET,
        &format!("/_permission/{username}"),
        alice(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["username"], username);
    assert!(fetched.get("password").is_none());
}

#[tokio::test]
async fn missing_credentials_is_401() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/_permission/anything", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");

    let (status, _) = send(
        &app,
        Method::GET,
        "/_permission/anything",
        Some(basic("alice", "wrong")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn negative_ttl_is_400() {
    let app = app().await;
    let (_, created) = send(&app, Method::PUT, "/_permission", alice(), Some(json!({}))).await;
    let username = created["username"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/_permission/{username}"),
        alice(),
        Some(json!({ "limits": { "ttl_sec": -5 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/_permission")
        .header(header::AUTHORIZATION, basic("alice", ALICE_PASSWORD))
        .body(Body::from("{\"ops\": ["))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_unknown_is_404() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::DELETE,
        "/_permission/doesnotexist",
        alice(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn patch_then_delete() {
    let app = app().await;
    let (_, created) = send(&app, Method::PUT, "/_permission", alice(), Some(json!({}))).await;
    let uri = format!("/_permission/{}", created["username"].as_str().unwrap());

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        alice(),
        Some(json!({ "limits": { "docs_limit": 5 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (_, fetched) = send(&app, Method::GET, &uri, alice(), None).await;
    assert_eq!(fetched["limits"]["docs_limit"], 5);
    assert_eq!(fetched["limits"]["search_limit"], 30);

    let (status, _) = send(&app, Method::DELETE, &uri, alice(), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &uri, alice(), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delegated_non_admin_cannot_mutate() {
    let app = app().await;
    let (_, created) = send(
        &app,
        Method::PUT,
        "/_permission",
        alice(),
        Some(json!({ "ops": ["read", "write"], "acls": ["permission"] })),
    )
    .await;
    let username = created["username"].as_str().unwrap();
    let delegated = Some(basic(username, created["password"].as_str().unwrap()));

    // Reads pass the first four stages.
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/_permission/{username}"),
        delegated.clone(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/_permission",
        delegated.clone(),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");

    // Its own grant is off limits too.
    let own = format!("/_permission/{username}");
    let (status, _) = send(
        &app,
        Method::PATCH,
        &own,
        delegated.clone(),
        Some(json!({ "ops": ["read", "write", "delete"], "acls": ["permission", "user"] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &own, delegated.clone(), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{own}/_password"),
        delegated.clone(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, after) = send(&app, Method::GET, &own, delegated, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["ops"], json!(["read", "write"]));
    assert_eq!(after["acls"], json!(["permission"]));
}

#[tokio::test]
async fn out_of_range_ttl_is_400() {
    let app = app().await;
    let huge = json!({ "limits": { "ttl_sec": 10_000_000_000_000_i64 } });

    let (status, body) = send(&app, Method::PUT, "/_permission", alice(), Some(huge.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let (_, created) = send(&app, Method::PUT, "/_permission", alice(), Some(json!({}))).await;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/_permission/{}", created["username"].as_str().unwrap()),
        alice(),
        Some(huge),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delegated_without_acl_is_403() {
    let app = app().await;
    let (_, created) = send(
        &app,
        Method::PUT,
        "/_permission",
        alice(),
        Some(json!({ "ops": ["read"], "acls": ["search"] })),
    )
    .await;
    let username = created["username"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/_permission/{username}"),
        Some(basic(username, created["password"].as_str().unwrap())),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rotate_password_replaces_credential() {
    let app = app().await;
    let (_, created) = send(
        &app,
        Method::PUT,
        "/_permission",
        alice(),
        Some(json!({ "acls": ["permission"] })),
    )
    .await;
    let username = created["username"].as_str().unwrap();
    let old_password = created["password"].as_str().unwrap();

    let (status, rotated) = send(
        &app,
        Method::POST,
        &format!("/_permission/{username}/_password"),
        alice(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rotated["username"], username);
    let new_password = rotated["password"].as_str().unwrap();
    assert_ne!(new_password, old_password);

    let uri = format!("/_permission/{username}");
    let (status, _) = send(&app, Method::GET, &uri, Some(basic(username, old_password)), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::GET, &uri, Some(basic(username, new_password)), None).await;
    assert_eq!(status, StatusCode::OK);
}
