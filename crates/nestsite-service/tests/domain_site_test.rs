//! Integration tests for domain management and public site resolution.

use std::collections::HashMap;
use std::sync::Arc;

use nestsite_auth::Principal;
use nestsite_core::error::NestError;
use nestsite_core::models::agency::CreateAgency;
use nestsite_core::models::property::{CreateProperty, Property, PropertyStatus, UpdateProperty};
use nestsite_core::models::tenant::CreateTenant;
use nestsite_core::repository::{AgencyRepository, Repositories, TenantRepository};
use nestsite_db::SurrealRepositories;
use nestsite_service::{
    AddDomain, CatalogService, DomainService, LocalObjectStore, PropertyService, SiteResolver,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Repos = SurrealRepositories<Db>;

struct Fixture {
    repos: Arc<Repos>,
    staff: Principal,
    properties: PropertyService<Repos, LocalObjectStore>,
    domains: DomainService<Repos>,
    tenant_id: Uuid,
}

async fn setup() -> Fixture {
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
    let tenant = repos
        .tenants()
        .create(CreateTenant {
            agency_id: agency.id,
            name: "Lumen Group".into(),
            slug: "lumen-group".into(),
            metadata: None,
        })
        .await
        .unwrap();

    let store = Arc::new(LocalObjectStore::new(std::env::temp_dir(), "/media"));
    Fixture {
        properties: PropertyService::new(repos.clone(), store),
        domains: DomainService::new(repos.clone()),
        repos,
        staff: Principal {
            user_id: Uuid::new_v4(),
            agency_id: Some(agency.id),
            memberships: HashMap::new(),
        },
        tenant_id: tenant.id,
    }
}

async fn property(fx: &Fixture, slug: &str, published: bool) -> Property {
    let property = fx
        .properties
        .create(
            &fx.staff,
            CreateProperty {
                tenant_id: fx.tenant_id,
                slug: slug.into(),
                name: format!("Property {slug}"),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    if !published {
        return property;
    }
    fx.properties
        .update(
            &fx.staff,
            property.id,
            UpdateProperty {
                status: Some(PropertyStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

fn domain(hostname: &str, is_primary: bool) -> AddDomain {
    AddDomain {
        hostname: hostname.into(),
        is_primary,
    }
}

#[tokio::test]
async fn primary_domain_unsets_the_others() {
    let fx = setup().await;
    let p = property(&fx, "casa-lumen", false).await;

    let first = fx
        .domains
        .add(&fx.staff, p.id, domain("casalumen.example", false))
        .await
        .unwrap();
    // The first domain of a property becomes primary on its own.
    assert!(first.is_primary);

    let second = fx
        .domains
        .add(&fx.staff, p.id, domain("casa-lumen.example", false))
        .await
        .unwrap();
    assert!(!second.is_primary);

    let third = fx
        .domains
        .add(&fx.staff, p.id, domain("www.casalumen.example", true))
        .await
        .unwrap();
    assert!(third.is_primary);

    let listed = fx.domains.list(&fx.staff, p.id).await.unwrap();
    let primaries: Vec<&str> = listed
        .iter()
        .filter(|d| d.is_primary)
        .map(|d| d.hostname.as_str())
        .collect();
    assert_eq!(primaries, vec!["www.casalumen.example"]);
    assert_eq!(listed[0].id, third.id);
}

#[tokio::test]
async fn set_primary_moves_the_flag() {
    let fx = setup().await;
    let p = property(&fx, "casa-lumen", false).await;
    let a = fx
        .domains
        .add(&fx.staff, p.id, domain("casalumen.example", true))
        .await
        .unwrap();
    let b = fx
        .domains
        .add(&fx.staff, p.id, domain("casa-lumen.example", false))
        .await
        .unwrap();

    let b = fx.domains.set_primary(&fx.staff, b.id).await.unwrap();
    assert!(b.is_primary);
    let listed = fx.domains.list(&fx.staff, p.id).await.unwrap();
    assert_eq!(listed.iter().filter(|d| d.is_primary).count(), 1);
    assert!(listed.iter().any(|d| d.id == a.id && !d.is_primary));
}

#[tokio::test]
async fn hostnames_are_normalized_and_globally_unique() {
    let fx = setup().await;
    let p = property(&fx, "casa-lumen", false).await;
    let q = property(&fx, "villa-mare", false).await;

    let d = fx
        .domains
        .add(&fx.staff, p.id, domain("https://CasaLumen.Example:443/rooms", false))
        .await
        .unwrap();
    assert_eq!(d.hostname, "casalumen.example");

    let err = fx
        .domains
        .add(&fx.staff, q.id, domain("casalumen.example.", false))
        .await
        .unwrap_err();
    assert!(matches!(err, NestError::AlreadyExists { .. }));

    let err = fx
        .domains
        .add(&fx.staff, q.id, domain("localhost", false))
        .await
        .unwrap_err();
    assert!(matches!(err, NestError::Validation { .. }));
}

#[tokio::test]
async fn deleting_primary_does_not_promote() {
    let fx = setup().await;
    let p = property(&fx, "casa-lumen", false).await;
    let a = fx
        .domains
        .add(&fx.staff, p.id, domain("casalumen.example", true))
        .await
        .unwrap();
    fx.domains
        .add(&fx.staff, p.id, domain("casa-lumen.example", false))
        .await
        .unwrap();

    fx.domains.delete(&fx.staff, a.id).await.unwrap();
    let listed = fx.domains.list(&fx.staff, p.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].is_primary);
}

#[tokio::test]
async fn resolves_exact_www_and_platform_hosts() {
    let fx = setup().await;
    let p = property(&fx, "casa-lumen", true).await;
    fx.domains
        .add(&fx.staff, p.id, domain("casalumen.example", true))
        .await
        .unwrap();
    CatalogService::new(fx.repos.clone())
        .put_content(&fx.staff, p.id, "hero.title", "Benvenuti".into())
        .await
        .unwrap();

    let resolver = SiteResolver::new(fx.repos.clone(), Some("nestsite.app".into()));

    let (_, exact) = resolver.resolve("CasaLumen.example:8080").await.unwrap();
    assert_eq!(exact.id, p.id);

    let (_, www) = resolver.resolve("www.casalumen.example").await.unwrap();
    assert_eq!(www.id, p.id);

    let (tenant, platform) = resolver
        .resolve("casa-lumen.lumen-group.nestsite.app")
        .await
        .unwrap();
    assert_eq!(platform.id, p.id);
    assert_eq!(tenant.slug, "lumen-group");

    let site = resolver.load("www.casalumen.example").await.unwrap();
    assert_eq!(site.canonical_host.as_deref(), Some("casalumen.example"));
    assert!(site.needs_redirect("www.casalumen.example"));
    assert!(!site.needs_redirect("casalumen.example"));
    assert_eq!(site.content["hero.title"], "Benvenuti");

    let err = resolver.resolve("unknown.example").await.unwrap_err();
    assert!(matches!(err, NestError::NotFound { .. }));
}

#[tokio::test]
async fn drafts_do_not_resolve() {
    let fx = setup().await;
    let p = property(&fx, "casa-lumen", false).await;
    fx.domains
        .add(&fx.staff, p.id, domain("casalumen.example", true))
        .await
        .unwrap();

    let resolver = SiteResolver::new(fx.repos.clone(), None);
    let err = resolver.resolve("casalumen.example").await.unwrap_err();
    assert!(matches!(err, NestError::NotFound { .. }));
}

#[tokio::test]
async fn platform_host_reaches_tenants_sharing_a_slug() {
    let fx = setup().await;
    let older_draft = property(&fx, "casa", false).await;
    let older_villa = property(&fx, "villa", true).await;

    let agency = fx
        .repos
        .agencies()
        .create(CreateAgency {
            name: "Alpine Retreats".into(),
            slug: "alpine".into(),
            metadata: None,
        })
        .await
        .unwrap();
    let namesake = fx
        .repos
        .tenants()
        .create(CreateTenant {
            agency_id: agency.id,
            name: "Lumen Group (Alps)".into(),
            slug: "lumen-group".into(),
            metadata: None,
        })
        .await
        .unwrap();
    let other_staff = Principal {
        user_id: Uuid::new_v4(),
        agency_id: Some(agency.id),
        memberships: HashMap::new(),
    };
    let casa = fx
        .properties
        .create(
            &other_staff,
            CreateProperty {
                tenant_id: namesake.id,
                slug: "casa".into(),
                name: "Casa".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    fx.properties
        .update(
            &other_staff,
            casa.id,
            UpdateProperty {
                status: Some(PropertyStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let resolver = SiteResolver::new(fx.repos.clone(), Some("nestsite.app".into()));

    let (tenant, found) = resolver
        .resolve("casa.lumen-group.nestsite.app")
        .await
        .unwrap();
    assert_eq!(found.id, casa.id);
    assert_ne!(found.id, older_draft.id);
    assert_eq!(tenant.id, namesake.id);

    let (tenant, found) = resolver
        .resolve("villa.lumen-group.nestsite.app")
        .await
        .unwrap();
    assert_eq!(found.id, older_villa.id);
    assert_eq!(tenant.id, fx.tenant_id);
}
