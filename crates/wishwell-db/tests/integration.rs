//! Integration tests for gift queries. Each test gets a fresh migrated
//! database via `#[sqlx::test]`.

use sqlx::PgPool;
use wishwell_core::GiftPayload;
use wishwell_db::{create_gift, delete_gift, get_gift, list_gifts, update_gift, DbError};

fn payload(title: &str) -> GiftPayload {
    GiftPayload {
        title: title.to_string(),
        url: Some("https://shop.example.com/item".to_string()),
        description: Some("A very nice thing".to_string()),
        price: Some(49.99),
        currency: Some("EUR".to_string()),
        images: vec![
            "https://cdn.example.com/a.jpg".to_string(),
            "https://cdn.example.com/b.jpg".to_string(),
        ],
        main_image: Some("https://cdn.example.com/a.jpg".to_string()),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_then_get_round_trips(pool: PgPool) {
    let created = create_gift(&pool, &payload("Lego Set"))
        .await
        .expect("create");

    let fetched = get_gift(&pool, created.id).await.expect("get");
    assert_eq!(fetched.title, "Lego Set");
    assert_eq!(fetched.price, Some(49.99));
    assert_eq!(fetched.currency.as_deref(), Some("EUR"));
    assert_eq!(fetched.images.0.len(), 2);
    assert_eq!(
        fetched.main_image.as_deref(),
        Some("https://cdn.example.com/a.jpg")
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_orders_newest_first(pool: PgPool) {
    create_gift(&pool, &payload("first")).await.expect("create");
    // Force distinct created_at values; now() has microsecond resolution but
    // two inserts in the same transaction batch can tie.
    sqlx::query("UPDATE gifts SET created_at = created_at - INTERVAL '1 minute'")
        .execute(&pool)
        .await
        .expect("backdate");
    create_gift(&pool, &payload("second"))
        .await
        .expect("create");

    let gifts = list_gifts(&pool).await.expect("list");
    assert_eq!(gifts.len(), 2);
    assert_eq!(gifts[0].title, "second");
    assert_eq!(gifts[1].title, "first");
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_unknown_id_is_not_found(pool: PgPool) {
    let result = get_gift(&pool, uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_replaces_fields_and_touches_updated_at(pool: PgPool) {
    let created = create_gift(&pool, &payload("before")).await.expect("create");

    let mut updated_payload = payload("after");
    updated_payload.price = None;
    updated_payload.images = Vec::new();
    updated_payload.main_image = None;

    let updated = update_gift(&pool, created.id, &updated_payload)
        .await
        .expect("update");
    assert_eq!(updated.title, "after");
    assert!(updated.price.is_none());
    assert!(updated.images.0.is_empty());
    assert!(updated.updated_at >= created.updated_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_unknown_id_is_not_found(pool: PgPool) {
    let result = update_gift(&pool, uuid::Uuid::new_v4(), &payload("ghost")).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_removes_row(pool: PgPool) {
    let created = create_gift(&pool, &payload("ephemeral"))
        .await
        .expect("create");

    delete_gift(&pool, created.id).await.expect("delete");
    assert!(matches!(
        get_gift(&pool, created.id).await,
        Err(DbError::NotFound)
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_unknown_id_is_not_found(pool: PgPool) {
    let result = delete_gift(&pool, uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}
