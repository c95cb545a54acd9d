//! Integration tests for the Agency, Tenant and Property repositories
//! using in-memory SurrealDB.

use nestsite_core::error::NestError;
use nestsite_core::models::agency::{CreateAgency, UpdateAgency};
use nestsite_core::models::property::{CreateProperty, PropertyStatus, UpdateProperty};
use nestsite_core::models::tenant::{CreateTenant, UpdateTenant};
use nestsite_core::models::theme::Theme;
use nestsite_core::repository::{
    AgencyRepository, Pagination, PropertyRepository, TenantRepository,
};
use nestsite_db::repository::{
    SurrealAgencyRepository, SurrealPropertyRepository, SurrealTenantRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    nestsite_db::run_migrations(&db).await.unwrap();
    db
}

fn agency(slug: &str) -> CreateAgency {
    CreateAgency {
        name: format!("Agency {slug}"),
        slug: slug.into(),
        metadata: None,
    }
}

fn tenant(agency_id: Uuid, slug: &str) -> CreateTenant {
    CreateTenant {
        agency_id,
        name: format!("Tenant {slug}"),
        slug: slug.into(),
        metadata: None,
    }
}

fn property(tenant_id: Uuid, slug: &str) -> CreateProperty {
    CreateProperty {
        tenant_id,
        slug: slug.into(),
        name: format!("Property {slug}"),
        ..Default::default()
    }
}

// -----------------------------------------------------------------------
// Agency tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_agency() {
    let db = setup().await;
    let repo = SurrealAgencyRepository::new(db);

    let created = repo.create(agency("lumen")).await.unwrap();
    assert_eq!(created.slug, "lumen");
    assert!(created.metadata.is_object());

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, "Agency lumen");

    let by_slug = repo.get_by_slug("lumen").await.unwrap();
    assert_eq!(by_slug.id, created.id);
}

#[tokio::test]
async fn duplicate_agency_slug_is_a_conflict() {
    let db = setup().await;
    let repo = SurrealAgencyRepository::new(db);

    repo.create(agency("lumen")).await.unwrap();
    let err = repo.create(agency("lumen")).await.unwrap_err();
    assert!(matches!(err, NestError::AlreadyExists { .. }), "got {err:?}");
}

#[tokio::test]
async fn update_and_list_agencies() {
    let db = setup().await;
    let repo = SurrealAgencyRepository::new(db);

    let a = repo.create(agency("one")).await.unwrap();
    repo.create(agency("two")).await.unwrap();

    let updated = repo
        .update(
            a.id,
            UpdateAgency {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.slug, "one");

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn missing_agency_is_not_found() {
    let db = setup().await;
    let repo = SurrealAgencyRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, NestError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Tenant tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn tenant_slug_is_unique_per_agency() {
    let db = setup().await;
    let agencies = SurrealAgencyRepository::new(db.clone());
    let repo = SurrealTenantRepository::new(db);

    let a = agencies.create(agency("a")).await.unwrap();
    let b = agencies.create(agency("b")).await.unwrap();

    repo.create(tenant(a.id, "casa")).await.unwrap();
    // Same slug under another agency is fine.
    repo.create(tenant(b.id, "casa")).await.unwrap();

    let err = repo.create(tenant(a.id, "casa")).await.unwrap_err();
    assert!(matches!(err, NestError::AlreadyExists { .. }), "got {err:?}");

    let fetched = repo.get_by_slug(b.id, "casa").await.unwrap();
    assert_eq!(fetched.agency_id, b.id);
}

#[tokio::test]
async fn list_tenants_by_slug_across_agencies() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let first = repo.create(tenant(Uuid::new_v4(), "villa")).await.unwrap();
    let second = repo.create(tenant(Uuid::new_v4(), "villa")).await.unwrap();
    repo.create(tenant(Uuid::new_v4(), "other")).await.unwrap();

    let found: Vec<Uuid> = repo
        .list_by_slug("villa")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(found.len(), 2);
    assert!(found.contains(&first.id));
    assert!(found.contains(&second.id));
    assert!(repo.list_by_slug("nope").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_delete_and_paginate_tenants() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);
    let agency_id = Uuid::new_v4();

    let first = repo.create(tenant(agency_id, "t1")).await.unwrap();
    repo.create(tenant(agency_id, "t2")).await.unwrap();
    repo.create(tenant(agency_id, "t3")).await.unwrap();
    repo.create(tenant(Uuid::new_v4(), "other")).await.unwrap();

    let updated = repo
        .update(
            first.id,
            UpdateTenant {
                slug: Some("t1-renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.slug, "t1-renamed");

    let page = repo
        .list_by_agency(
            agency_id,
            Pagination {
                offset: 1,
                limit: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);

    repo.delete(first.id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(first.id).await,
        Err(NestError::NotFound { .. })
    ));
}

// -----------------------------------------------------------------------
// Property tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn property_defaults_to_classic_draft() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);
    let tenant_id = Uuid::new_v4();

    let created = repo.create(property(tenant_id, "casa")).await.unwrap();
    assert_eq!(created.theme, Theme::Classic);
    assert_eq!(created.status, PropertyStatus::Draft);
    assert!(created.tagline.is_none());

    let fetched = repo.get_by_slug(tenant_id, "casa").await.unwrap();
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn property_slug_is_unique_per_tenant() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);
    let tenant_id = Uuid::new_v4();

    repo.create(property(tenant_id, "casa")).await.unwrap();
    repo.create(property(Uuid::new_v4(), "casa")).await.unwrap();

    let err = repo.create(property(tenant_id, "casa")).await.unwrap_err();
    assert!(matches!(err, NestError::AlreadyExists { .. }), "got {err:?}");
}

#[tokio::test]
async fn update_sets_and_clears_optional_fields() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    let created = repo
        .create(CreateProperty {
            tagline: Some("By the sea".into()),
            ..property(Uuid::new_v4(), "casa")
        })
        .await
        .unwrap();
    assert_eq!(created.tagline.as_deref(), Some("By the sea"));

    let updated = repo
        .update(
            created.id,
            UpdateProperty {
                tagline: Some(None),
                check_in_time: Some(Some("15:00".into())),
                status: Some(PropertyStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.tagline.is_none());
    assert_eq!(updated.check_in_time.as_deref(), Some("15:00"));
    assert_eq!(updated.status, PropertyStatus::Published);
    assert_eq!(updated.name, created.name);
}

#[tokio::test]
async fn set_theme_and_list_by_tenant() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);
    let tenant_id = Uuid::new_v4();

    let p = repo.create(property(tenant_id, "one")).await.unwrap();
    repo.create(property(tenant_id, "two")).await.unwrap();

    let themed = repo.set_theme(p.id, Theme::Coastal).await.unwrap();
    assert_eq!(themed.theme, Theme::Coastal);

    let page = repo
        .list_by_tenant(tenant_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].slug, "one");

    repo.delete(p.id).await.unwrap();
    let page = repo
        .list_by_tenant(tenant_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn set_theme_on_missing_property_is_not_found() {
    let db = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    let err = repo
        .set_theme(Uuid::new_v4(), Theme::Alpine)
        .await
        .unwrap_err();
    assert!(matches!(err, NestError::NotFound { .. }));
}
