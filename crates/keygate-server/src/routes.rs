//! HTTP route definitions and handlers for the permission endpoints.
//!
//! Every handler follows the same shape: resolve credentials, run the
//! guard pipeline for its endpoint, and only then decode the body and
//! call the service.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{post, put};
use axum::{Json, Router};
use keygate_auth::{Authenticator, Endpoint, Pipeline, RequestContext};
use keygate_core::error::{ErrorKind, KeygateError, KeygateResult};
use keygate_core::models::permission::{NewPermission, Permission};
use keygate_core::models::principal::Principal;
use keygate_core::repository::PermissionRepository;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::api_error::ApiResult;
use crate::extract::basic_credentials;
use crate::state::AppState;

pub fn router<R>(state: Arc<AppState<R>>) -> Router
where
    R: PermissionRepository + 'static,
{
    Router::new()
        .route("/_permission", put(create_permission::<R>))
        .route(
            "/_permission/{username}",
            axum::routing::get(get_permission::<R>)
                .patch(patch_permission::<R>)
                .delete(delete_permission::<R>),
        )
        .route(
            "/_permission/{username}/_password",
            post(rotate_password::<R>),
        )
        .with_state(state)
}

/// Authenticate and run the guard pipeline for `endpoint`.
///
/// Bad credentials leave the context without a principal so the
/// credential stage reports them; store failures abort immediately.
async fn admit<R: PermissionRepository>(
    state: &AppState<R>,
    endpoint: Endpoint,
    headers: &HeaderMap,
) -> KeygateResult<Principal> {
    let mut ctx = RequestContext::new(endpoint);

    if let Some(credentials) = basic_credentials(headers) {
        match state.authenticator.authenticate(&credentials).await {
            Ok(principal) => ctx.principal = Some(principal),
            Err(e) if e.kind() == ErrorKind::Unauthenticated => {
                debug!(username = %credentials.username, error = %e, "credential rejected");
            }
            Err(e) => return Err(e),
        }
    }

    Pipeline::for_endpoint(endpoint).run(&mut ctx)?;

    ctx.principal
        .ok_or_else(|| KeygateError::Internal("pipeline admitted a request without principal".into()))
}

fn parse_body(body: &Bytes) -> KeygateResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| KeygateError::validation("body", e.to_string()))
}

async fn get_permission<R: PermissionRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Permission>> {
    let principal = admit(&state, Endpoint::GetPermission, &headers).await?;
    let permission = state.service.fetch(&principal, &username).await?;
    Ok(Json(permission))
}

async fn create_permission<R: PermissionRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<NewPermission>> {
    let principal = admit(&state, Endpoint::CreatePermission, &headers).await?;
    let body = parse_body(&body)?;
    let created = state.service.create(&principal, &body).await?;
    Ok(Json(created))
}

async fn patch_permission<R: PermissionRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(username): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let principal = admit(&state, Endpoint::PatchPermission, &headers).await?;
    let body = parse_body(&body)?;
    state.service.patch(&principal, &username, &body).await?;
    Ok(Json(json!({ "message": "successfully updated permission" })))
}

async fn delete_permission<R: PermissionRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let principal = admit(&state, Endpoint::DeletePermission, &headers).await?;
    state.service.delete(&principal, &username).await?;
    Ok(Json(json!({ "message": "successfully deleted permission" })))
}

async fn rotate_password<R: PermissionRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let principal = admit(&state, Endpoint::RotatePassword, &headers).await?;
    let rotated = state.service.rotate_password(&principal, &username).await?;
    Ok(Json(json!({
        "username": rotated.username,
        "password": rotated.password,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_empty_object() {
        assert_eq!(parse_body(&Bytes::from_static(b"")).unwrap(), json!({}));
        assert_eq!(parse_body(&Bytes::from_static(b" \n")).unwrap(), json!({}));
    }

    #[test]
    fn malformed_body_is_validation_error() {
        let err = parse_body(&Bytes::from_static(b"{\"ops\":")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
