//! SurrealDB repository implementations.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use nestsite_core::repository::Repositories;

use crate::error::DbError;

mod agency;
mod content;
mod domain;
mod host;
mod media;
mod membership;
mod pricing;
mod property;
mod room;
mod tenant;
mod user;

pub use agency::SurrealAgencyRepository;
pub use content::SurrealContentRepository;
pub use domain::SurrealDomainRepository;
pub use host::SurrealHostRepository;
pub use media::SurrealMediaRepository;
pub use membership::SurrealMembershipRepository;
pub use pricing::SurrealPricingRepository;
pub use property::SurrealPropertyRepository;
pub use room::SurrealRoomRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(entity: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode {
        entity: entity.into(),
        message: format!("invalid UUID '{raw}': {e}"),
    })
}

pub(crate) fn parse_opt_uuid(entity: &str, raw: Option<String>) -> Result<Option<Uuid>, DbError> {
    raw.map(|s| parse_uuid(entity, &s)).transpose()
}

/// First row of a result set, or `NotFound`.
pub(crate) fn single<T>(rows: Vec<T>, entity: &str, id: impl ToString) -> Result<T, DbError> {
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: entity.into(),
        id: id.to_string(),
    })
}

/// Every repository over one shared client.
#[derive(Clone)]
pub struct SurrealRepositories<C: Connection> {
    agencies: SurrealAgencyRepository<C>,
    tenants: SurrealTenantRepository<C>,
    properties: SurrealPropertyRepository<C>,
    domains: SurrealDomainRepository<C>,
    users: SurrealUserRepository<C>,
    memberships: SurrealMembershipRepository<C>,
    rooms: SurrealRoomRepository<C>,
    hosts: SurrealHostRepository<C>,
    pricing: SurrealPricingRepository<C>,
    media: SurrealMediaRepository<C>,
    content: SurrealContentRepository<C>,
}

impl<C: Connection> SurrealRepositories<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            agencies: SurrealAgencyRepository::new(db.clone()),
            tenants: SurrealTenantRepository::new(db.clone()),
            properties: SurrealPropertyRepository::new(db.clone()),
            domains: SurrealDomainRepository::new(db.clone()),
            users: SurrealUserRepository::new(db.clone()),
            memberships: SurrealMembershipRepository::new(db.clone()),
            rooms: SurrealRoomRepository::new(db.clone()),
            hosts: SurrealHostRepository::new(db.clone()),
            pricing: SurrealPricingRepository::new(db.clone()),
            media: SurrealMediaRepository::new(db.clone()),
            content: SurrealContentRepository::new(db),
        }
    }
}

impl<C: Connection> Repositories for SurrealRepositories<C> {
    type Agencies = SurrealAgencyRepository<C>;
    type Tenants = SurrealTenantRepository<C>;
    type Properties = SurrealPropertyRepository<C>;
    type Domains = SurrealDomainRepository<C>;
    type Users = SurrealUserRepository<C>;
    type Memberships = SurrealMembershipRepository<C>;
    type Rooms = SurrealRoomRepository<C>;
    type Hosts = SurrealHostRepository<C>;
    type Pricing = SurrealPricingRepository<C>;
    type Media = SurrealMediaRepository<C>;
    type Content = SurrealContentRepository<C>;

    fn agencies(&self) -> &Self::Agencies {
        &self.agencies
    }

    fn tenants(&self) -> &Self::Tenants {
        &self.tenants
    }

    fn properties(&self) -> &Self::Properties {
        &self.properties
    }

    fn domains(&self) -> &Self::Domains {
        &self.domains
    }

    fn users(&self) -> &Self::Users {
        &self.users
    }

    fn memberships(&self) -> &Self::Memberships {
        &self.memberships
    }

    fn rooms(&self) -> &Self::Rooms {
        &self.rooms
    }

    fn hosts(&self) -> &Self::Hosts {
        &self.hosts
    }

    fn pricing(&self) -> &Self::Pricing {
        &self.pricing
    }

    fn media(&self) -> &Self::Media {
        &self.media
    }

    fn content(&self) -> &Self::Content {
        &self.content
    }
}
