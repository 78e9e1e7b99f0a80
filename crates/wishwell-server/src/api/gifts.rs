//! Gift CRUD handlers. Reads are public; mutations require an admin session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use wishwell_core::{validate_gift_payload, GiftPayloadInput};

use crate::middleware::{AdminSession, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub async fn list_gifts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let gifts = wishwell_db::list_gifts(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: gifts,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub async fn get_gift(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let gift = wishwell_db::get_gift(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: gift,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub async fn create_gift(
    _session: AdminSession,
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(input): Json<GiftPayloadInput>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validate_gift_payload(&input)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    let gift = wishwell_db::create_gift(&state.pool, &payload)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: gift,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub async fn update_gift(
    _session: AdminSession,
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(input): Json<GiftPayloadInput>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = validate_gift_payload(&input)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    let gift = wishwell_db::update_gift(&state.pool, id, &payload)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: gift,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub async fn delete_gift(
    _session: AdminSession,
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    wishwell_db::delete_gift(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
