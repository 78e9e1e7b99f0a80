//! Queries for the `gifts` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use wishwell_core::GiftPayload;

use crate::DbError;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftRow {
    pub id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub images: Json<Vec<String>>,
    pub main_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const GIFT_COLUMNS: &str =
    "id, title, url, description, price, currency, images, main_image, created_at, updated_at";

/// List every gift, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_gifts(pool: &PgPool) -> Result<Vec<GiftRow>, DbError> {
    let rows = sqlx::query_as::<_, GiftRow>(&format!(
        "SELECT {GIFT_COLUMNS} FROM gifts ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a single gift by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id, [`DbError::Sqlx`] otherwise.
pub async fn get_gift(pool: &PgPool, id: Uuid) -> Result<GiftRow, DbError> {
    sqlx::query_as::<_, GiftRow>(&format!("SELECT {GIFT_COLUMNS} FROM gifts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Insert a new gift from a validated payload.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_gift(pool: &PgPool, payload: &GiftPayload) -> Result<GiftRow, DbError> {
    let row = sqlx::query_as::<_, GiftRow>(&format!(
        "INSERT INTO gifts (title, url, description, price, currency, images, main_image) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {GIFT_COLUMNS}"
    ))
    .bind(&payload.title)
    .bind(&payload.url)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(&payload.currency)
    .bind(Json(payload.images.clone()))
    .bind(&payload.main_image)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Replace every editable field of an existing gift and touch `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id, [`DbError::Sqlx`] otherwise.
pub async fn update_gift(
    pool: &PgPool,
    id: Uuid,
    payload: &GiftPayload,
) -> Result<GiftRow, DbError> {
    sqlx::query_as::<_, GiftRow>(&format!(
        "UPDATE gifts SET title = $2, url = $3, description = $4, price = $5, \
         currency = $6, images = $7, main_image = $8, updated_at = now() \
         WHERE id = $1 RETURNING {GIFT_COLUMNS}"
    ))
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.url)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(&payload.currency)
    .bind(Json(payload.images.clone()))
    .bind(&payload.main_image)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Delete a gift by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id, [`DbError::Sqlx`] otherwise.
pub async fn delete_gift(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM gifts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
