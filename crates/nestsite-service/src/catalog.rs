//! Rooms, hosts, pricing rules and content blocks of a property.

use std::sync::Arc;

use chrono::NaiveDate;
use nestsite_auth::{Action, Principal};
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::content::ContentBlock;
use nestsite_core::models::host::{CreateHost, Host, UpdateHost};
use nestsite_core::models::media::UpdateMediaAsset;
use nestsite_core::models::pricing::{CreatePricingRule, PricingRule, UpdatePricingRule};
use nestsite_core::models::room::{CreateRoom, Room, UpdateRoom};
use nestsite_core::repository::{
    ContentRepository, HostRepository, MediaRepository, PricingRepository, Repositories,
    RoomRepository,
};
use nestsite_core::validation::{
    check_content_key, check_currency, require_text, slugify, validate_slug,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::guard;

fn default_one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
    pub name: String,
    /// Derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_one")]
    pub capacity: u32,
    #[serde(default = "default_one")]
    pub beds: u32,
    #[serde(default)]
    pub sort_order: u32,
}

impl NewRoom {
    pub(crate) fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHost {
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub sort_order: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPricingRule {
    #[serde(default)]
    pub room_id: Option<Uuid>,
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

/// Largest price the database integer column can hold.
pub(crate) const MAX_AMOUNT_MINOR: u64 = i64::MAX as u64;

/// Checks shared by rule creation, rule updates and the importer.
pub(crate) fn check_rule_terms(
    amount_minor: u64,
    currency: &str,
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
    min_nights: u32,
) -> Vec<(&'static str, String)> {
    let mut issues = Vec::new();
    if amount_minor > MAX_AMOUNT_MINOR {
        issues.push(("amount_minor", format!("must not exceed {MAX_AMOUNT_MINOR}")));
    }
    if let Err(reason) = check_currency(currency) {
        issues.push(("currency", reason));
    }
    if let (Some(start), Some(end)) = (starts_on, ends_on) {
        if start > end {
            issues.push(("ends_on", "must not be before starts_on".to_string()));
        }
    }
    if min_nights == 0 {
        issues.push(("min_nights", "must be at least 1".to_string()));
    }
    issues
}

fn reject(issues: Vec<(&'static str, String)>) -> NestResult<()> {
    match issues.into_iter().next() {
        Some((field, reason)) => Err(NestError::validation(format!("{field} {reason}"))),
        None => Ok(()),
    }
}

pub struct CatalogService<R> {
    repos: Arc<R>,
}

impl<R> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
        }
    }
}

impl<R: Repositories> CatalogService<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }

    async fn room_of(&self, property_id: Uuid, room_id: Uuid) -> NestResult<Room> {
        let room = self.repos.rooms().get_by_id(room_id).await?;
        if room.property_id != property_id {
            return Err(NestError::validation(format!(
                "room {room_id} does not belong to property {property_id}"
            )));
        }
        Ok(room)
    }

    // -- rooms ---------------------------------------------------------------

    pub async fn list_rooms(
        &self,
        principal: &Principal,
        property_id: Uuid,
    ) -> NestResult<Vec<Room>> {
        guard::property(&*self.repos, principal, property_id, Action::ViewProperty).await?;
        self.repos.rooms().list_by_property(property_id).await
    }

    pub async fn add_room(
        &self,
        principal: &Principal,
        property_id: Uuid,
        input: NewRoom,
    ) -> NestResult<Room> {
        guard::property(&*self.repos, principal, property_id, Action::EditContent).await?;
        require_text("name", &input.name)?;
        let slug = input.slug();
        validate_slug(&slug)?;
        if input.capacity == 0 {
            return Err(NestError::validation("capacity must be at least 1"));
        }

        let taken = self
            .repos
            .rooms()
            .list_by_property(property_id)
            .await?
            .iter()
            .any(|r| r.slug == slug);
        if taken {
            return Err(NestError::AlreadyExists {
                entity: "room".into(),
            });
        }

        let room = self
            .repos
            .rooms()
            .create(CreateRoom {
                property_id,
                name: input.name.trim().to_string(),
                slug,
                description: input.description,
                capacity: input.capacity,
                beds: input.beds,
                sort_order: input.sort_order,
            })
            .await?;
        info!(room_id = %room.id, property_id = %property_id, slug = %room.slug, "Room created");
        Ok(room)
    }

    pub async fn update_room(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdateRoom,
    ) -> NestResult<Room> {
        let room = self.repos.rooms().get_by_id(id).await?;
        guard::property(&*self.repos, principal, room.property_id, Action::EditContent).await?;
        if let Some(name) = &input.name {
            require_text("name", name)?;
        }
        if input.capacity == Some(0) {
            return Err(NestError::validation("capacity must be at least 1"));
        }
        self.repos.rooms().update(id, input).await
    }

    /// Delete a room. Pricing rules scoped to it go with it; media that
    /// pointed at it falls back to the property.
    pub async fn delete_room(&self, principal: &Principal, id: Uuid) -> NestResult<()> {
        let room = self.repos.rooms().get_by_id(id).await?;
        guard::property(&*self.repos, principal, room.property_id, Action::EditContent).await?;

        for rule in self.repos.pricing().list_by_property(room.property_id).await? {
            if rule.room_id == Some(id) {
                self.repos.pricing().delete(rule.id).await?;
            }
        }
        for asset in self.repos.media().list_by_property(room.property_id).await? {
            if asset.room_id == Some(id) {
                self.repos
                    .media()
                    .update(
                        asset.id,
                        UpdateMediaAsset {
                            room_id: Some(None),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }

        self.repos.rooms().delete(id).await?;
        info!(room_id = %id, property_id = %room.property_id, "Room deleted");
        Ok(())
    }

    // -- hosts ---------------------------------------------------------------

    pub async fn list_hosts(
        &self,
        principal: &Principal,
        property_id: Uuid,
    ) -> NestResult<Vec<Host>> {
        guard::property(&*self.repos, principal, property_id, Action::ViewProperty).await?;
        self.repos.hosts().list_by_property(property_id).await
    }

    pub async fn add_host(
        &self,
        principal: &Principal,
        property_id: Uuid,
        input: NewHost,
    ) -> NestResult<Host> {
        guard::property(&*self.repos, principal, property_id, Action::EditContent).await?;
        require_text("name", &input.name)?;
        let host = self
            .repos
            .hosts()
            .create(CreateHost {
                property_id,
                name: input.name.trim().to_string(),
                bio: input.bio,
                photo_url: input.photo_url,
                sort_order: input.sort_order,
            })
            .await?;
        info!(host_id = %host.id, property_id = %property_id, "Host created");
        Ok(host)
    }

    pub async fn update_host(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdateHost,
    ) -> NestResult<Host> {
        let host = self.repos.hosts().get_by_id(id).await?;
        guard::property(&*self.repos, principal, host.property_id, Action::EditContent).await?;
        if let Some(name) = &input.name {
            require_text("name", name)?;
        }
        self.repos.hosts().update(id, input).await
    }

    pub async fn delete_host(&self, principal: &Principal, id: Uuid) -> NestResult<()> {
        let host = self.repos.hosts().get_by_id(id).await?;
        guard::property(&*self.repos, principal, host.property_id, Action::EditContent).await?;
        self.repos.hosts().delete(id).await?;
        info!(host_id = %id, property_id = %host.property_id, "Host deleted");
        Ok(())
    }

    // -- pricing -------------------------------------------------------------

    pub async fn list_pricing(
        &self,
        principal: &Principal,
        property_id: Uuid,
    ) -> NestResult<Vec<PricingRule>> {
        guard::property(&*self.repos, principal, property_id, Action::ViewProperty).await?;
        self.repos.pricing().list_by_property(property_id).await
    }

    pub async fn add_pricing(
        &self,
        principal: &Principal,
        property_id: Uuid,
        input: NewPricingRule,
    ) -> NestResult<PricingRule> {
        guard::property(&*self.repos, principal, property_id, Action::EditContent).await?;
        require_text("label", &input.label)?;
        reject(check_rule_terms(
            input.amount_minor,
            &input.currency,
            input.starts_on,
            input.ends_on,
            input.min_nights,
        ))?;
        if let Some(room_id) = input.room_id {
            self.room_of(property_id, room_id).await?;
        }

        let rule = self
            .repos
            .pricing()
            .create(CreatePricingRule {
                property_id,
                room_id: input.room_id,
                label: input.label.trim().to_string(),
                amount_minor: input.amount_minor,
                currency: input.currency,
                starts_on: input.starts_on,
                ends_on: input.ends_on,
                min_nights: input.min_nights,
                sort_order: input.sort_order,
            })
            .await?;
        info!(rule_id = %rule.id, property_id = %property_id, "Pricing rule created");
        Ok(rule)
    }

    /// Patch a rule; the merged result must still satisfy the rule checks.
    pub async fn update_pricing(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdatePricingRule,
    ) -> NestResult<PricingRule> {
        let rule = self.repos.pricing().get_by_id(id).await?;
        guard::property(&*self.repos, principal, rule.property_id, Action::EditContent).await?;
        if let Some(label) = &input.label {
            require_text("label", label)?;
        }

        let amount_minor = input.amount_minor.unwrap_or(rule.amount_minor);
        let currency = input.currency.as_deref().unwrap_or(&rule.currency);
        let starts_on = input.starts_on.unwrap_or(rule.starts_on);
        let ends_on = input.ends_on.unwrap_or(rule.ends_on);
        let min_nights = input.min_nights.unwrap_or(rule.min_nights);
        reject(check_rule_terms(
            amount_minor,
            currency,
            starts_on,
            ends_on,
            min_nights,
        ))?;
        if let Some(Some(room_id)) = input.room_id {
            self.room_of(rule.property_id, room_id).await?;
        }

        self.repos.pricing().update(id, input).await
    }

    pub async fn delete_pricing(&self, principal: &Principal, id: Uuid) -> NestResult<()> {
        let rule = self.repos.pricing().get_by_id(id).await?;
        guard::property(&*self.repos, principal, rule.property_id, Action::EditContent).await?;
        self.repos.pricing().delete(id).await?;
        info!(rule_id = %id, property_id = %rule.property_id, "Pricing rule deleted");
        Ok(())
    }

    // -- content -------------------------------------------------------------

    pub async fn list_content(
        &self,
        principal: &Principal,
        property_id: Uuid,
    ) -> NestResult<Vec<ContentBlock>> {
        guard::property(&*self.repos, principal, property_id, Action::ViewProperty).await?;
        self.repos.content().list_by_property(property_id).await
    }

    pub async fn put_content(
        &self,
        principal: &Principal,
        property_id: Uuid,
        key: &str,
        value: serde_json::Value,
    ) -> NestResult<ContentBlock> {
        guard::property(&*self.repos, principal, property_id, Action::EditContent).await?;
        check_content_key(key)
            .map_err(|reason| NestError::validation(format!("content key '{key}' {reason}")))?;
        let block = self.repos.content().upsert(property_id, key, value).await?;
        info!(property_id = %property_id, key, "Content block saved");
        Ok(block)
    }

    pub async fn delete_content(
        &self,
        principal: &Principal,
        property_id: Uuid,
        key: &str,
    ) -> NestResult<()> {
        guard::property(&*self.repos, principal, property_id, Action::EditContent).await?;
        if self.repos.content().get(property_id, key).await?.is_none() {
            return Err(NestError::not_found("content_block", key));
        }
        self.repos.content().delete(property_id, key).await?;
        info!(property_id = %property_id, key, "Content block deleted");
        Ok(())
    }
}
