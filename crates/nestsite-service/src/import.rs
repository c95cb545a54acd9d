//! JSON property import.
//!
//! A payload describes one property with its domains, rooms, hosts,
//! pricing, external media and content blocks. It is validated as a
//! whole first, every problem reported with a path into the document;
//! only a clean payload is written. The write fans out over several
//! tables without a transaction: if a later insert fails, whatever was
//! already created stays and the error is returned.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use nestsite_auth::{Action, Principal};
use nestsite_core::error::{ImportIssue, NestError, NestResult};
use nestsite_core::models::domain::CreateDomain;
use nestsite_core::models::host::CreateHost;
use nestsite_core::models::media::{CreateMediaAsset, MediaKind};
use nestsite_core::models::pricing::CreatePricingRule;
use nestsite_core::models::property::{CreateProperty, Property, PropertyStatus};
use nestsite_core::models::room::CreateRoom;
use nestsite_core::models::theme::Theme;
use nestsite_core::repository::{
    ContentRepository, DomainRepository, HostRepository, MediaRepository, PricingRepository,
    PropertyRepository, Repositories, RoomRepository,
};
use nestsite_core::validation::{
    check_content_key, check_hostname, check_slug, normalize_hostname,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::{NewHost, NewRoom, check_rule_terms};
use crate::domain::AddDomain;
use crate::guard;
use crate::media::check_media_url;
use crate::property::check_new_property;

fn default_one() -> u32 {
    1
}

/// The `property` section. Everything is optional at the type level so
/// that missing fields surface as issues instead of parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyDraft {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub theme: Option<String>,
    pub status: Option<PropertyStatus>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingDraft {
    /// Slug of a room in the same payload.
    #[serde(default)]
    pub room: Option<String>,
    pub label: String,
    pub amount_minor: u64,
    pub currency: String,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    #[serde(default = "default_one")]
    pub min_nights: u32,
    #[serde(default)]
    pub sort_order: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaDraft {
    pub url: String,
    #[serde(default)]
    pub kind: MediaKind,
    /// Slug of a room in the same payload.
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub sort_order: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImportPayload {
    pub property: PropertyDraft,
    pub domains: Vec<AddDomain>,
    pub rooms: Vec<NewRoom>,
    pub hosts: Vec<NewHost>,
    pub pricing: Vec<PricingDraft>,
    pub media: Vec<MediaDraft>,
    pub content: BTreeMap<String, serde_json::Value>,
}

/// What an import wrote, or would write for a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub dry_run: bool,
    pub property_id: Option<Uuid>,
    pub domains: usize,
    pub rooms: usize,
    pub hosts: usize,
    pub pricing: usize,
    pub media: usize,
    pub content: usize,
}

impl ImportPayload {
    /// Decode a raw JSON document; shape errors become a single issue.
    pub fn from_json(value: serde_json::Value) -> NestResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| NestError::InvalidImport(vec![ImportIssue::new("$", e.to_string())]))
    }

    fn to_create_property(&self, tenant_id: Uuid) -> CreateProperty {
        let p = &self.property;
        CreateProperty {
            tenant_id,
            slug: p.slug.clone().unwrap_or_default(),
            name: p.name.clone().unwrap_or_default().trim().to_string(),
            tagline: p.tagline.clone(),
            description: p.description.clone(),
            address: p.address.clone(),
            contact_email: p.contact_email.as_deref().map(str::to_ascii_lowercase),
            contact_phone: p.contact_phone.clone(),
            check_in_time: p.check_in_time.clone(),
            check_out_time: p.check_out_time.clone(),
            theme: p.theme.as_deref().and_then(Theme::parse),
            status: p.status,
            metadata: p.metadata.clone(),
        }
    }

    /// Every structural problem with the payload. Empty means importable.
    pub fn validate(&self) -> Vec<ImportIssue> {
        let mut issues = Vec::new();

        if self.property.slug.is_none() {
            issues.push(ImportIssue::new("property.slug", "is required"));
        }
        if self.property.name.is_none() {
            issues.push(ImportIssue::new("property.name", "is required"));
        }
        for (field, reason) in check_new_property(&self.to_create_property(Uuid::nil())) {
            let missing = match field {
                "slug" => self.property.slug.is_none(),
                "name" => self.property.name.is_none(),
                _ => false,
            };
            if !missing {
                issues.push(ImportIssue::new(format!("property.{field}"), reason));
            }
        }
        if let Some(theme) = &self.property.theme {
            if Theme::parse(theme).is_none() {
                issues.push(ImportIssue::new(
                    "property.theme",
                    format!("unknown theme '{theme}'"),
                ));
            }
        }

        let mut hostnames = HashSet::new();
        let mut primaries = 0;
        for (i, domain) in self.domains.iter().enumerate() {
            let hostname = normalize_hostname(&domain.hostname);
            if let Err(reason) = check_hostname(&hostname) {
                issues.push(ImportIssue::new(format!("domains[{i}].hostname"), reason));
            } else if !hostnames.insert(hostname) {
                issues.push(ImportIssue::new(
                    format!("domains[{i}].hostname"),
                    "is listed more than once",
                ));
            }
            if domain.is_primary {
                primaries += 1;
                if primaries > 1 {
                    issues.push(ImportIssue::new(
                        format!("domains[{i}].is_primary"),
                        "only one domain may be primary",
                    ));
                }
            }
        }

        let mut room_slugs = HashSet::new();
        for (i, room) in self.rooms.iter().enumerate() {
            if room.name.trim().is_empty() {
                issues.push(ImportIssue::new(format!("rooms[{i}].name"), "must not be empty"));
            }
            let slug = room.slug();
            if let Err(reason) = check_slug(&slug) {
                issues.push(ImportIssue::new(format!("rooms[{i}].slug"), reason));
            } else if !room_slugs.insert(slug) {
                issues.push(ImportIssue::new(
                    format!("rooms[{i}].slug"),
                    "is used by another room",
                ));
            }
            if room.capacity == 0 {
                issues.push(ImportIssue::new(
                    format!("rooms[{i}].capacity"),
                    "must be at least 1",
                ));
            }
        }

        for (i, host) in self.hosts.iter().enumerate() {
            if host.name.trim().is_empty() {
                issues.push(ImportIssue::new(format!("hosts[{i}].name"), "must not be empty"));
            }
        }

        let unknown_room = |room: &Option<String>| {
            room.as_ref()
                .filter(|slug| !room_slugs.contains(slug.as_str()))
                .map(|slug| format!("references unknown room '{slug}'"))
        };

        for (i, rule) in self.pricing.iter().enumerate() {
            if rule.label.trim().is_empty() {
                issues.push(ImportIssue::new(
                    format!("pricing[{i}].label"),
                    "must not be empty",
                ));
            }
            for (field, reason) in check_rule_terms(
                rule.amount_minor,
                &rule.currency,
                rule.starts_on,
                rule.ends_on,
                rule.min_nights,
            ) {
                issues.push(ImportIssue::new(format!("pricing[{i}].{field}"), reason));
            }
            if let Some(reason) = unknown_room(&rule.room) {
                issues.push(ImportIssue::new(format!("pricing[{i}].room"), reason));
            }
        }

        for (i, item) in self.media.iter().enumerate() {
            if let Err(reason) = check_media_url(&item.url) {
                issues.push(ImportIssue::new(format!("media[{i}].url"), reason));
            }
            if let Some(reason) = unknown_room(&item.room) {
                issues.push(ImportIssue::new(format!("media[{i}].room"), reason));
            }
        }

        for key in self.content.keys() {
            if let Err(reason) = check_content_key(key) {
                issues.push(ImportIssue::new(format!("content.{key}"), reason));
            }
        }

        issues
    }

    fn report(&self, dry_run: bool, property_id: Option<Uuid>) -> ImportReport {
        ImportReport {
            dry_run,
            property_id,
            domains: self.domains.len(),
            rooms: self.rooms.len(),
            hosts: self.hosts.len(),
            pricing: self.pricing.len(),
            media: self.media.len(),
            content: self.content.len(),
        }
    }
}

pub struct ImportService<R> {
    repos: Arc<R>,
}

impl<R> Clone for ImportService<R> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
        }
    }
}

impl<R: Repositories> ImportService<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }

    /// Validate `payload` against itself and the stored data, then write
    /// it unless `dry_run` is set.
    pub async fn import(
        &self,
        principal: &Principal,
        tenant_id: Uuid,
        payload: ImportPayload,
        dry_run: bool,
    ) -> NestResult<ImportReport> {
        guard::tenant(&*self.repos, principal, tenant_id, Action::ImportProperty).await?;

        let issues = payload.validate();
        if !issues.is_empty() {
            return Err(NestError::InvalidImport(issues));
        }

        let conflicts = self.conflicts(tenant_id, &payload).await?;
        if !conflicts.is_empty() {
            return Err(NestError::InvalidImport(conflicts));
        }

        if dry_run {
            return Ok(payload.report(true, None));
        }

        let property = self
            .repos
            .properties()
            .create(payload.to_create_property(tenant_id))
            .await?;

        if let Err(e) = self.write_children(&property, &payload).await {
            error!(
                property_id = %property.id,
                tenant_id = %tenant_id,
                error = %e,
                "Import failed part-way; created records were kept"
            );
            return Err(e);
        }

        let report = payload.report(false, Some(property.id));
        info!(
            property_id = %property.id,
            tenant_id = %tenant_id,
            domains = report.domains,
            rooms = report.rooms,
            media = report.media,
            "Property imported"
        );
        Ok(report)
    }

    /// Issues that only show up against stored data: a taken property
    /// slug or hostname.
    async fn conflicts(
        &self,
        tenant_id: Uuid,
        payload: &ImportPayload,
    ) -> NestResult<Vec<ImportIssue>> {
        let mut issues = Vec::new();
        if let Some(slug) = &payload.property.slug {
            match self.repos.properties().get_by_slug(tenant_id, slug).await {
                Ok(_) => issues.push(ImportIssue::new("property.slug", "is already in use")),
                Err(NestError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        for (i, domain) in payload.domains.iter().enumerate() {
            let hostname = normalize_hostname(&domain.hostname);
            if self.repos.domains().get_by_hostname(&hostname).await?.is_some() {
                issues.push(ImportIssue::new(
                    format!("domains[{i}].hostname"),
                    "is already in use",
                ));
            }
        }
        Ok(issues)
    }

    async fn write_children(&self, property: &Property, payload: &ImportPayload) -> NestResult<()> {
        let repos = &*self.repos;
        let property_id = property.id;

        let any_primary = payload.domains.iter().any(|d| d.is_primary);
        for (i, domain) in payload.domains.iter().enumerate() {
            repos
                .domains()
                .create(CreateDomain {
                    property_id,
                    tenant_id: property.tenant_id,
                    hostname: normalize_hostname(&domain.hostname),
                    is_primary: domain.is_primary || (!any_primary && i == 0),
                })
                .await?;
        }

        let mut rooms = HashMap::new();
        for room in &payload.rooms {
            let slug = room.slug();
            let created = repos
                .rooms()
                .create(CreateRoom {
                    property_id,
                    name: room.name.trim().to_string(),
                    slug: slug.clone(),
                    description: room.description.clone(),
                    capacity: room.capacity,
                    beds: room.beds,
                    sort_order: room.sort_order,
                })
                .await?;
            rooms.insert(slug, created.id);
        }
        let room_id = |slug: &Option<String>| slug.as_ref().and_then(|s| rooms.get(s).copied());

        for host in &payload.hosts {
            repos
                .hosts()
                .create(CreateHost {
                    property_id,
                    name: host.name.trim().to_string(),
                    bio: host.bio.clone(),
                    photo_url: host.photo_url.clone(),
                    sort_order: host.sort_order,
                })
                .await?;
        }

        for rule in &payload.pricing {
            repos
                .pricing()
                .create(CreatePricingRule {
                    property_id,
                    room_id: room_id(&rule.room),
                    label: rule.label.trim().to_string(),
                    amount_minor: rule.amount_minor,
                    currency: rule.currency.clone(),
                    starts_on: rule.starts_on,
                    ends_on: rule.ends_on,
                    min_nights: rule.min_nights,
                    sort_order: rule.sort_order,
                })
                .await?;
        }

        for item in &payload.media {
            repos
                .media()
                .create(CreateMediaAsset {
                    property_id,
                    room_id: room_id(&item.room),
                    kind: item.kind,
                    storage_key: None,
                    public_url: item.url.clone(),
                    alt_text: item.alt_text.clone(),
                    sort_order: item.sort_order,
                })
                .await?;
        }

        for (key, value) in &payload.content {
            repos.content().upsert(property_id, key, value.clone()).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: serde_json::Value) -> ImportPayload {
        ImportPayload::from_json(value).unwrap()
    }

    fn paths(issues: &[ImportIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn minimal_payload_is_valid() {
        let p = payload(json!({ "property": { "slug": "casa-lumen", "name": "Casa Lumen" } }));
        assert!(p.validate().is_empty());
    }

    #[test]
    fn missing_slug_is_reported_once() {
        let p = payload(json!({ "property": { "name": "Casa Lumen" } }));
        assert_eq!(paths(&p.validate()), vec!["property.slug"]);

        let p = payload(json!({}));
        assert_eq!(paths(&p.validate()), vec!["property.slug", "property.name"]);
    }

    #[test]
    fn collects_issues_across_sections() {
        let p = payload(json!({
            "property": { "slug": "casa-lumen", "name": "Casa Lumen", "theme": "neon" },
            "domains": [
                { "hostname": "casalumen.example", "is_primary": true },
                { "hostname": "https://CasaLumen.example/", "is_primary": true },
                { "hostname": "nodot" }
            ],
            "rooms": [
                { "name": "Sea View" },
                { "name": "Sea view" }
            ],
            "pricing": [
                { "label": "Summer", "amount_minor": 15000, "currency": "EUR", "room": "garden" }
            ],
            "media": [ { "url": "pool.jpg" } ],
            "content": { "Hero.Title": "Welcome" }
        }));
        assert_eq!(
            paths(&p.validate()),
            vec![
                "property.theme",
                "domains[1].hostname",
                "domains[1].is_primary",
                "domains[2].hostname",
                "rooms[1].slug",
                "pricing[0].room",
                "media[0].url",
                "content.Hero.Title",
            ]
        );
    }

    #[test]
    fn shape_errors_become_issues() {
        let err = ImportPayload::from_json(json!({ "rooms": "none" })).unwrap_err();
        assert!(matches!(err, NestError::InvalidImport(issues) if issues[0].path == "$"));
    }
}
