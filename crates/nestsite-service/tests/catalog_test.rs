//! Integration tests for rooms, pricing and property cleanup against
//! in-memory SurrealDB.

use std::collections::HashMap;
use std::sync::Arc;

use nestsite_auth::Principal;
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::agency::CreateAgency;
use nestsite_core::models::media::MediaKind;
use nestsite_core::models::pricing::UpdatePricingRule;
use nestsite_core::models::property::CreateProperty;
use nestsite_core::repository::{
    AgencyRepository, MediaRepository, ObjectStore, PricingRepository, PropertyRepository,
    Repositories, RoomRepository,
};
use nestsite_db::SurrealRepositories;
use nestsite_service::{
    CatalogService, MediaService, NewExternalMedia, NewPricingRule, NewRoom, NewTenant,
    PropertyService, TenantService, Upload,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Repos = SurrealRepositories<Db>;

/// Accepts writes but fails every delete.
struct BrokenDeletes;

impl ObjectStore for BrokenDeletes {
    async fn put(&self, _key: &str, _content_type: &str, _bytes: Vec<u8>) -> NestResult<()> {
        Ok(())
    }

    async fn delete(&self, key: &str) -> NestResult<()> {
        Err(NestError::Storage(format!("bucket unavailable: {key}")))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.example/{key}")
    }
}

async fn setup() -> (Arc<Repos>, Principal, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    nestsite_db::run_migrations(&db).await.unwrap();
    let repos = Arc::new(SurrealRepositories::new(db));

    let agency = repos
        .agencies()
        .create(CreateAgency {
            name: "Coastline Stays".into(),
            slug: "coastline".into(),
            metadata: None,
        })
        .await
        .unwrap();
    let staff = Principal {
        user_id: Uuid::new_v4(),
        agency_id: Some(agency.id),
        memberships: HashMap::new(),
    };

    let tenants = TenantService::new(repos.clone(), Arc::new(BrokenDeletes));
    let tenant = tenants
        .create(
            &staff,
            NewTenant {
                agency_id: None,
                name: "Lumen".into(),
                slug: "lumen".into(),
                metadata: None,
            },
        )
        .await
        .unwrap();
    let property = PropertyService::new(repos.clone(), Arc::new(BrokenDeletes))
        .create(
            &staff,
            CreateProperty {
                tenant_id: tenant.id,
                slug: "casa-lumen".into(),
                name: "Casa Lumen".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    (repos, staff, property.id)
}

fn room(name: &str) -> NewRoom {
    NewRoom {
        name: name.into(),
        slug: None,
        description: None,
        capacity: 2,
        beds: 1,
        sort_order: 0,
    }
}

fn rule(label: &str, room_id: Option<Uuid>, amount_minor: u64) -> NewPricingRule {
    NewPricingRule {
        room_id,
        label: label.into(),
        amount_minor,
        currency: "EUR".into(),
        starts_on: None,
        ends_on: None,
        min_nights: 1,
        sort_order: 0,
    }
}

#[tokio::test]
async fn deleting_room_drops_its_rules_and_detaches_media() {
    let (repos, staff, property_id) = setup().await;
    let catalog = CatalogService::new(repos.clone());
    let media = MediaService::new(repos.clone(), Arc::new(BrokenDeletes));

    let sea_view = catalog.add_room(&staff, property_id, room("Sea View")).await.unwrap();
    let garden = catalog.add_room(&staff, property_id, room("Garden")).await.unwrap();

    let sea_rule = catalog
        .add_pricing(&staff, property_id, rule("Sea view", Some(sea_view.id), 12_000))
        .await
        .unwrap();
    let garden_rule = catalog
        .add_pricing(&staff, property_id, rule("Garden", Some(garden.id), 9_000))
        .await
        .unwrap();
    let base_rule = catalog
        .add_pricing(&staff, property_id, rule("Base", None, 8_000))
        .await
        .unwrap();

    let photo = media
        .register_external(
            &staff,
            property_id,
            NewExternalMedia {
                url: "https://cdn.example/sea.jpg".into(),
                kind: MediaKind::default(),
                room_id: Some(sea_view.id),
                alt_text: Some("Balcony".into()),
                sort_order: 0,
            },
        )
        .await
        .unwrap();

    catalog.delete_room(&staff, sea_view.id).await.unwrap();

    assert!(matches!(
        repos.rooms().get_by_id(sea_view.id).await.unwrap_err(),
        NestError::NotFound { .. }
    ));
    let remaining: Vec<Uuid> = repos
        .pricing()
        .list_by_property(property_id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert!(!remaining.contains(&sea_rule.id));
    assert!(remaining.contains(&garden_rule.id));
    assert!(remaining.contains(&base_rule.id));

    let photo = repos.media().get_by_id(photo.id).await.unwrap();
    assert_eq!(photo.room_id, None);
    assert_eq!(photo.alt_text.as_deref(), Some("Balcony"));
}

#[tokio::test]
async fn price_beyond_storage_range_is_rejected_before_writing() {
    let (repos, staff, property_id) = setup().await;
    let catalog = CatalogService::new(repos.clone());

    let err = catalog
        .add_pricing(&staff, property_id, rule("Base", None, u64::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, NestError::Validation { .. }));

    let ok = catalog
        .add_pricing(&staff, property_id, rule("Base", None, 8_000))
        .await
        .unwrap();
    let err = catalog
        .update_pricing(
            &staff,
            ok.id,
            UpdatePricingRule {
                amount_minor: Some(u64::MAX),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NestError::Validation { .. }));

    let rules = catalog.list_pricing(&staff, property_id).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].amount_minor, 8_000);
}

#[tokio::test]
async fn property_delete_ignores_storage_failures() {
    let (repos, staff, property_id) = setup().await;
    let store = Arc::new(BrokenDeletes);
    let media = MediaService::new(repos.clone(), store.clone());
    let properties = PropertyService::new(repos.clone(), store);

    media
        .upload(
            &staff,
            property_id,
            Upload {
                filename: "pool.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: vec![0xff, 0xd8, 0xff],
                room_id: None,
                alt_text: None,
                sort_order: 0,
            },
        )
        .await
        .unwrap();

    properties.delete(&staff, property_id).await.unwrap();

    assert!(matches!(
        repos.properties().get_by_id(property_id).await.unwrap_err(),
        NestError::NotFound { .. }
    ));
    assert!(repos.media().list_by_property(property_id).await.unwrap().is_empty());
}
