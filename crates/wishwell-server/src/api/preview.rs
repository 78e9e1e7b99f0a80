//! Link preview endpoint: runs the extraction pipeline for one URL so the
//! admin form can be pre-filled. Pipeline degradations come back as warnings
//! in the payload; only an unusable URL is a request error.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;

use wishwell_extract::ExtractError;

use crate::middleware::{AdminSession, RequestId};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub url: String,
}

pub async fn preview(
    _session: AdminSession,
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<PreviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.extractor.extract(&request.url).await.map_err(|e| {
        match e {
            ExtractError::InvalidUrl(_) | ExtractError::UnsafeUrl { .. } => {
                ApiError::new(req_id.0.clone(), "bad_request", e.to_string())
            }
            ExtractError::Http(ref inner) => {
                tracing::error!(error = %inner, "preview pipeline failed");
                ApiError::new(req_id.0.clone(), "internal_error", "extraction failed")
            }
        }
    })?;

    Ok(Json(ApiResponse {
        data: response,
        meta: ResponseMeta::new(req_id.0),
    }))
}
