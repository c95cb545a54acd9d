//! Integration tests for the property catalog repositories (rooms, hosts,
//! pricing, media, content) using in-memory SurrealDB.

use chrono::NaiveDate;
use nestsite_core::error::NestError;
use nestsite_core::models::host::{CreateHost, UpdateHost};
use nestsite_core::models::media::{CreateMediaAsset, MediaKind, UpdateMediaAsset};
use nestsite_core::models::pricing::{CreatePricingRule, UpdatePricingRule};
use nestsite_core::models::room::{CreateRoom, UpdateRoom};
use nestsite_core::repository::{
    ContentRepository, HostRepository, MediaRepository, PricingRepository, RoomRepository,
};
use nestsite_db::repository::{
    SurrealContentRepository, SurrealHostRepository, SurrealMediaRepository,
    SurrealPricingRepository, SurrealRoomRepository,
};
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    nestsite_db::run_migrations(&db).await.unwrap();
    db
}

fn room(property_id: Uuid, slug: &str, sort_order: u32) -> CreateRoom {
    CreateRoom {
        property_id,
        name: slug.to_uppercase(),
        slug: slug.into(),
        description: None,
        capacity: 2,
        beds: 1,
        sort_order,
    }
}

#[tokio::test]
async fn rooms_are_ordered_by_sort_order() {
    let db = setup().await;
    let repo = SurrealRoomRepository::new(db);
    let property_id = Uuid::new_v4();

    repo.create(room(property_id, "garden", 2)).await.unwrap();
    repo.create(room(property_id, "sea-view", 1)).await.unwrap();

    let slugs: Vec<String> = repo
        .list_by_property(property_id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.slug)
        .collect();
    assert_eq!(slugs, ["sea-view", "garden"]);
}

#[tokio::test]
async fn room_slug_is_unique_per_property() {
    let db = setup().await;
    let repo = SurrealRoomRepository::new(db);
    let property_id = Uuid::new_v4();

    repo.create(room(property_id, "garden", 0)).await.unwrap();
    let err = repo
        .create(room(property_id, "garden", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, NestError::AlreadyExists { .. }), "got {err:?}");
}

#[tokio::test]
async fn update_and_delete_room() {
    let db = setup().await;
    let repo = SurrealRoomRepository::new(db);
    let property_id = Uuid::new_v4();

    let created = repo.create(room(property_id, "loft", 0)).await.unwrap();
    let updated = repo
        .update(
            created.id,
            UpdateRoom {
                capacity: Some(4),
                description: Some(Some("Under the roof".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.capacity, 4);
    assert_eq!(updated.beds, 1);
    assert_eq!(updated.description.as_deref(), Some("Under the roof"));

    repo.delete(created.id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(created.id).await,
        Err(NestError::NotFound { .. })
    ));
}

#[tokio::test]
async fn host_update_clears_photo() {
    let db = setup().await;
    let repo = SurrealHostRepository::new(db);
    let property_id = Uuid::new_v4();

    let host = repo
        .create(CreateHost {
            property_id,
            name: "Marta".into(),
            bio: Some("Your host since 2009".into()),
            photo_url: Some("https://cdn.example/marta.jpg".into()),
            sort_order: 0,
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            host.id,
            UpdateHost {
                photo_url: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.photo_url.is_none());
    assert_eq!(updated.bio, host.bio);

    repo.delete_by_property(property_id).await.unwrap();
    assert!(repo.list_by_property(property_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn pricing_dates_survive_storage() {
    let db = setup().await;
    let repo = SurrealPricingRepository::new(db);
    let property_id = Uuid::new_v4();
    let room_id = Uuid::new_v4();
    let starts = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let ends = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();

    let rule = repo
        .create(CreatePricingRule {
            property_id,
            room_id: Some(room_id),
            label: "Summer".into(),
            amount_minor: 12_500,
            currency: "EUR".into(),
            starts_on: Some(starts),
            ends_on: Some(ends),
            min_nights: 3,
            sort_order: 0,
        })
        .await
        .unwrap();

    let fetched = repo.get_by_id(rule.id).await.unwrap();
    assert_eq!(fetched.room_id, Some(room_id));
    assert_eq!(fetched.starts_on, Some(starts));
    assert_eq!(fetched.ends_on, Some(ends));
    assert_eq!(fetched.amount_minor, 12_500);

    let widened = repo
        .update(
            rule.id,
            UpdatePricingRule {
                room_id: Some(None),
                ends_on: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(widened.room_id.is_none());
    assert!(widened.ends_on.is_none());
    assert_eq!(widened.starts_on, Some(starts));
}

#[tokio::test]
async fn media_create_update_and_list() {
    let db = setup().await;
    let repo = SurrealMediaRepository::new(db);
    let property_id = Uuid::new_v4();

    let asset = repo
        .create(CreateMediaAsset {
            property_id,
            room_id: None,
            kind: MediaKind::Image,
            storage_key: Some("tenants/t/properties/p/hero.jpg".into()),
            public_url: "/media/tenants/t/properties/p/hero.jpg".into(),
            alt_text: None,
            sort_order: 0,
        })
        .await
        .unwrap();
    assert_eq!(asset.kind, MediaKind::Image);

    let updated = repo
        .update(
            asset.id,
            UpdateMediaAsset {
                alt_text: Some(Some("Terrace at dusk".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.alt_text.as_deref(), Some("Terrace at dusk"));
    assert_eq!(updated.storage_key, asset.storage_key);

    assert_eq!(repo.list_by_property(property_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn content_upsert_replaces_value() {
    let db = setup().await;
    let repo = SurrealContentRepository::new(db);
    let property_id = Uuid::new_v4();

    let first = repo
        .upsert(property_id, "hero.title", json!("Welcome"))
        .await
        .unwrap();
    let second = repo
        .upsert(property_id, "hero.title", json!("Bienvenue"))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.value, json!("Bienvenue"));

    repo.upsert(property_id, "about.body", json!({"text": "Old stone house"}))
        .await
        .unwrap();

    let keys: Vec<String> = repo
        .list_by_property(property_id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.key)
        .collect();
    assert_eq!(keys, ["about.body", "hero.title"]);

    repo.delete(property_id, "hero.title").await.unwrap();
    assert!(repo.get(property_id, "hero.title").await.unwrap().is_none());

    repo.delete_by_property(property_id).await.unwrap();
    assert!(repo.list_by_property(property_id).await.unwrap().is_empty());
}
