//! Admin login and logout. A successful login sets an `HttpOnly` session
//! cookie; logout revokes the session and clears the cookie.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::{AdminSession, RequestId, SESSION_COOKIE};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    pub authenticated: bool,
}

pub async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if !state.auth.verify(&request.username, &request.password) {
        tracing::warn!(username = %request.username, "admin login rejected");
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "invalid username or password",
        ));
    }

    let token = state.sessions.create().await;
    let max_age = state.sessions.ttl().as_secs();
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );

    tracing::info!(username = %request.username, "admin session opened");

    let mut response = Json(ApiResponse {
        data: SessionData {
            authenticated: true,
        },
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    Ok(response)
}

pub async fn logout(
    session: AdminSession,
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    state.sessions.revoke(&session.token).await;

    let mut response = Json(ApiResponse {
        data: SessionData {
            authenticated: false,
        },
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response();
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}
