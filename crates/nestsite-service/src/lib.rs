//! NestSite services — orchestration on top of the repository traits.
//!
//! Every mutating operation takes the calling [`Principal`] and checks it
//! against the tenant that owns the target before touching storage.
//! Services are generic over a single [`Repositories`] implementation and,
//! where media is involved, an [`ObjectStore`].
//!
//! [`Principal`]: nestsite_auth::Principal
//! [`Repositories`]: nestsite_core::repository::Repositories
//! [`ObjectStore`]: nestsite_core::repository::ObjectStore

mod guard;

pub mod catalog;
pub mod domain;
pub mod import;
pub mod media;
pub mod property;
pub mod site;
pub mod storage;
pub mod tenant;
pub mod user;

pub use catalog::{CatalogService, NewHost, NewPricingRule, NewRoom};
pub use domain::{AddDomain, DomainService};
pub use import::{ImportPayload, ImportReport, ImportService};
pub use media::{MediaService, NewExternalMedia, Upload};
pub use property::PropertyService;
pub use site::{PublicSite, SiteResolver};
pub use storage::LocalObjectStore;
pub use tenant::{NewTenant, TenantService};
pub use user::{BootstrapAdmin, CreateUserInput, CreateUserOutput, Member, UserService};
