//! Media uploads and external media references.

use std::sync::Arc;

use nestsite_auth::{Action, Principal};
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::media::{CreateMediaAsset, MediaAsset, MediaKind, UpdateMediaAsset};
use nestsite_core::repository::{MediaRepository, ObjectStore, Repositories, RoomRepository};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::guard;

const MAX_FILENAME_LEN: usize = 100;

/// Raw bytes to store for a property.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub room_id: Option<Uuid>,
    pub alt_text: Option<String>,
    pub sort_order: u32,
}

/// A media item hosted elsewhere, referenced by URL.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExternalMedia {
    pub url: String,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub sort_order: u32,
}

/// Reduce an uploaded filename to `[a-z0-9._-]`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut out: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '-',
        })
        .collect();
    out = out.trim_start_matches(['.', '-']).to_string();
    if out.len() > MAX_FILENAME_LEN {
        out = out[out.len() - MAX_FILENAME_LEN..].to_string();
    }
    if out.is_empty() {
        "file".to_string()
    } else {
        out
    }
}

pub(crate) fn check_media_url(url: &str) -> Result<(), String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
        _ => Err("must be an absolute http(s) URL".into()),
    }
}

pub struct MediaService<R, S> {
    repos: Arc<R>,
    store: Arc<S>,
}

impl<R, S> Clone for MediaService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Repositories, S: ObjectStore> MediaService<R, S> {
    pub fn new(repos: Arc<R>, store: Arc<S>) -> Self {
        Self { repos, store }
    }

    async fn check_room(&self, property_id: Uuid, room_id: Option<Uuid>) -> NestResult<()> {
        if let Some(room_id) = room_id {
            let room = self.repos.rooms().get_by_id(room_id).await?;
            if room.property_id != property_id {
                return Err(NestError::validation(format!(
                    "room {room_id} does not belong to property {property_id}"
                )));
            }
        }
        Ok(())
    }

    pub async fn list(
        &self,
        principal: &Principal,
        property_id: Uuid,
    ) -> NestResult<Vec<MediaAsset>> {
        guard::property(&*self.repos, principal, property_id, Action::ViewProperty).await?;
        self.repos.media().list_by_property(property_id).await
    }

    /// Store the bytes under
    /// `tenants/{tenant}/properties/{property}/{uuid}-{name}` and record
    /// the asset with the store's public URL.
    pub async fn upload(
        &self,
        principal: &Principal,
        property_id: Uuid,
        upload: Upload,
    ) -> NestResult<MediaAsset> {
        let (tenant, _) =
            guard::property(&*self.repos, principal, property_id, Action::UploadMedia).await?;
        if upload.bytes.is_empty() {
            return Err(NestError::validation("upload body must not be empty"));
        }
        self.check_room(property_id, upload.room_id).await?;

        let key = format!(
            "tenants/{}/properties/{}/{}-{}",
            tenant.id,
            property_id,
            Uuid::new_v4(),
            sanitize_filename(&upload.filename)
        );
        let size = upload.bytes.len();
        self.store
            .put(&key, &upload.content_type, upload.bytes)
            .await?;

        let asset = self
            .repos
            .media()
            .create(CreateMediaAsset {
                property_id,
                room_id: upload.room_id,
                kind: MediaKind::from_content_type(&upload.content_type),
                public_url: self.store.public_url(&key),
                storage_key: Some(key),
                alt_text: upload.alt_text,
                sort_order: upload.sort_order,
            })
            .await?;
        info!(
            media_id = %asset.id,
            property_id = %property_id,
            kind = asset.kind.as_str(),
            size,
            "Media uploaded"
        );
        Ok(asset)
    }

    pub async fn register_external(
        &self,
        principal: &Principal,
        property_id: Uuid,
        input: NewExternalMedia,
    ) -> NestResult<MediaAsset> {
        guard::property(&*self.repos, principal, property_id, Action::UploadMedia).await?;
        check_media_url(&input.url)
            .map_err(|reason| NestError::validation(format!("url {reason}")))?;
        self.check_room(property_id, input.room_id).await?;

        let asset = self
            .repos
            .media()
            .create(CreateMediaAsset {
                property_id,
                room_id: input.room_id,
                kind: input.kind,
                storage_key: None,
                public_url: input.url,
                alt_text: input.alt_text,
                sort_order: input.sort_order,
            })
            .await?;
        info!(media_id = %asset.id, property_id = %property_id, "External media registered");
        Ok(asset)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdateMediaAsset,
    ) -> NestResult<MediaAsset> {
        let asset = self.repos.media().get_by_id(id).await?;
        guard::property(&*self.repos, principal, asset.property_id, Action::UploadMedia).await?;
        if let Some(room_id) = input.room_id {
            self.check_room(asset.property_id, room_id).await?;
        }
        self.repos.media().update(id, input).await
    }

    /// Delete the asset row, then its stored object if any. A failing
    /// object delete is logged and otherwise ignored.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> NestResult<()> {
        let asset = self.repos.media().get_by_id(id).await?;
        guard::property(&*self.repos, principal, asset.property_id, Action::UploadMedia).await?;

        self.repos.media().delete(id).await?;
        if let Some(key) = &asset.storage_key {
            if let Err(e) = self.store.delete(key).await {
                warn!(media_id = %id, key = %key, error = %e, "Failed to delete stored media");
            }
        }
        info!(media_id = %id, property_id = %asset.property_id, "Media deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_filenames() {
        assert_eq!(sanitize_filename("Terrace View.JPG"), "terrace-view.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\pool.png"), "pool.png");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("???"), "file");
    }

    #[test]
    fn media_urls_must_be_absolute() {
        assert!(check_media_url("https://cdn.example/pool.jpg").is_ok());
        assert!(check_media_url("http://cdn.example/a").is_ok());
        assert!(check_media_url("ftp://cdn.example/a").is_err());
        assert!(check_media_url("https:///a").is_err());
        assert!(check_media_url("/local/a.jpg").is_err());
    }
}
