//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Child entities (domains, rooms,
//! media, ...) are addressed by their own id and carry the id of the
//! property or tenant they belong to; tenant isolation is enforced by the
//! service layer, which authorizes against the owning tenant before any
//! mutation.

use uuid::Uuid;

use crate::error::NestResult;
use crate::models::{
    agency::{Agency, CreateAgency, UpdateAgency},
    content::ContentBlock,
    domain::{CreateDomain, Domain},
    host::{CreateHost, Host, UpdateHost},
    media::{CreateMediaAsset, MediaAsset, UpdateMediaAsset},
    membership::{CreateMembership, Membership, MembershipRole},
    pricing::{CreatePricingRule, PricingRule, UpdatePricingRule},
    property::{CreateProperty, Property, UpdateProperty},
    room::{CreateRoom, Room, UpdateRoom},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    theme::Theme,
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Agency & Tenant
// ---------------------------------------------------------------------------

pub trait AgencyRepository: Send + Sync {
    fn create(&self, input: CreateAgency) -> impl Future<Output = NestResult<Agency>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<Agency>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = NestResult<Agency>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAgency,
    ) -> impl Future<Output = NestResult<Agency>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = NestResult<PaginatedResult<Agency>>> + Send;
}

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = NestResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<Tenant>> + Send;
    fn get_by_slug(
        &self,
        agency_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = NestResult<Tenant>> + Send;
    /// Every tenant carrying `slug`, across all agencies, oldest first.
    fn list_by_slug(&self, slug: &str) -> impl Future<Output = NestResult<Vec<Tenant>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = NestResult<Tenant>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn list_by_agency(
        &self,
        agency_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = NestResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Properties & Domains
// ---------------------------------------------------------------------------

pub trait PropertyRepository: Send + Sync {
    fn create(&self, input: CreateProperty) -> impl Future<Output = NestResult<Property>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<Property>> + Send;
    fn get_by_slug(
        &self,
        tenant_id: Uuid,
        slug: &str,
    ) -> impl Future<Output = NestResult<Property>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProperty,
    ) -> impl Future<Output = NestResult<Property>> + Send;
    fn set_theme(&self, id: Uuid, theme: Theme)
    -> impl Future<Output = NestResult<Property>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = NestResult<PaginatedResult<Property>>> + Send;
}

pub trait DomainRepository: Send + Sync {
    fn create(&self, input: CreateDomain) -> impl Future<Output = NestResult<Domain>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<Domain>> + Send;
    /// Exact match on the normalized hostname.
    fn get_by_hostname(
        &self,
        hostname: &str,
    ) -> impl Future<Output = NestResult<Option<Domain>>> + Send;
    /// Primary domain first, then alphabetical by hostname.
    fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> impl Future<Output = NestResult<Vec<Domain>>> + Send;
    /// Unset `is_primary` on every domain of the property.
    fn clear_primary(&self, property_id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn set_primary(
        &self,
        id: Uuid,
        is_primary: bool,
    ) -> impl Future<Output = NestResult<Domain>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn delete_by_property(&self, property_id: Uuid)
    -> impl Future<Output = NestResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Users & Memberships
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = NestResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = NestResult<Option<User>>> + Send;
    fn get_by_invite_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = NestResult<Option<User>>> + Send;
    fn update(&self, id: Uuid, input: UpdateUser) -> impl Future<Output = NestResult<User>> + Send;
}

pub trait MembershipRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = NestResult<Membership>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<Membership>> + Send;
    fn get(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> impl Future<Output = NestResult<Option<Membership>>> + Send;
    fn list_by_user(&self, user_id: Uuid)
    -> impl Future<Output = NestResult<Vec<Membership>>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = NestResult<Vec<Membership>>> + Send;
    fn update_role(
        &self,
        id: Uuid,
        role: MembershipRole,
    ) -> impl Future<Output = NestResult<Membership>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn delete_by_tenant(&self, tenant_id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Property catalog (rooms, hosts, pricing, media, content)
// ---------------------------------------------------------------------------

pub trait RoomRepository: Send + Sync {
    fn create(&self, input: CreateRoom) -> impl Future<Output = NestResult<Room>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<Room>> + Send;
    fn update(&self, id: Uuid, input: UpdateRoom) -> impl Future<Output = NestResult<Room>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    /// Ordered by `sort_order`, then creation time.
    fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> impl Future<Output = NestResult<Vec<Room>>> + Send;
    fn delete_by_property(&self, property_id: Uuid)
    -> impl Future<Output = NestResult<()>> + Send;
}

pub trait HostRepository: Send + Sync {
    fn create(&self, input: CreateHost) -> impl Future<Output = NestResult<Host>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<Host>> + Send;
    fn update(&self, id: Uuid, input: UpdateHost) -> impl Future<Output = NestResult<Host>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> impl Future<Output = NestResult<Vec<Host>>> + Send;
    fn delete_by_property(&self, property_id: Uuid)
    -> impl Future<Output = NestResult<()>> + Send;
}

pub trait PricingRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePricingRule,
    ) -> impl Future<Output = NestResult<PricingRule>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<PricingRule>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePricingRule,
    ) -> impl Future<Output = NestResult<PricingRule>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> impl Future<Output = NestResult<Vec<PricingRule>>> + Send;
    fn delete_by_property(&self, property_id: Uuid)
    -> impl Future<Output = NestResult<()>> + Send;
}

pub trait MediaRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMediaAsset,
    ) -> impl Future<Output = NestResult<MediaAsset>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = NestResult<MediaAsset>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateMediaAsset,
    ) -> impl Future<Output = NestResult<MediaAsset>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = NestResult<()>> + Send;
    fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> impl Future<Output = NestResult<Vec<MediaAsset>>> + Send;
    fn delete_by_property(&self, property_id: Uuid)
    -> impl Future<Output = NestResult<()>> + Send;
}

pub trait ContentRepository: Send + Sync {
    /// Insert or replace the block stored under `key`.
    fn upsert(
        &self,
        property_id: Uuid,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = NestResult<ContentBlock>> + Send;
    fn get(
        &self,
        property_id: Uuid,
        key: &str,
    ) -> impl Future<Output = NestResult<Option<ContentBlock>>> + Send;
    /// Ordered by key.
    fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> impl Future<Output = NestResult<Vec<ContentBlock>>> + Send;
    fn delete(&self, property_id: Uuid, key: &str) -> impl Future<Output = NestResult<()>> + Send;
    fn delete_by_property(&self, property_id: Uuid)
    -> impl Future<Output = NestResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Aggregate access
// ---------------------------------------------------------------------------

/// One handle to every repository, so services can stay generic over a
/// single type parameter instead of one per table.
pub trait Repositories: Send + Sync {
    type Agencies: AgencyRepository;
    type Tenants: TenantRepository;
    type Properties: PropertyRepository;
    type Domains: DomainRepository;
    type Users: UserRepository;
    type Memberships: MembershipRepository;
    type Rooms: RoomRepository;
    type Hosts: HostRepository;
    type Pricing: PricingRepository;
    type Media: MediaRepository;
    type Content: ContentRepository;

    fn agencies(&self) -> &Self::Agencies;
    fn tenants(&self) -> &Self::Tenants;
    fn properties(&self) -> &Self::Properties;
    fn domains(&self) -> &Self::Domains;
    fn users(&self) -> &Self::Users;
    fn memberships(&self) -> &Self::Memberships;
    fn rooms(&self) -> &Self::Rooms;
    fn hosts(&self) -> &Self::Hosts;
    fn pricing(&self) -> &Self::Pricing;
    fn media(&self) -> &Self::Media;
    fn content(&self) -> &Self::Content;
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// Blob storage for uploaded media.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = NestResult<()>> + Send;
    fn delete(&self, key: &str) -> impl Future<Output = NestResult<()>> + Send;
    /// URL under which the object is publicly served.
    fn public_url(&self, key: &str) -> String;
}
