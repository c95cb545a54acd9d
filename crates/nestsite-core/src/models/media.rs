//! Media asset model.
//!
//! Media either lives in the platform's object store (`storage_key` is
//! set) or is an external URL registered as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    Document,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
            MediaKind::Document => "Document",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Image" => Some(MediaKind::Image),
            "Video" => Some(MediaKind::Video),
            "Document" => Some(MediaKind::Document),
            _ => None,
        }
    }

    /// Guess the kind from a MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            MediaKind::Image
        } else if content_type.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Document
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_id: Option<Uuid>,
    pub kind: MediaKind,
    /// Key in the object store; `None` for external URLs.
    pub storage_key: Option<String>,
    pub public_url: String,
    pub alt_text: Option<String>,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMediaAsset {
    pub property_id: Uuid,
    pub room_id: Option<Uuid>,
    pub kind: MediaKind,
    pub storage_key: Option<String>,
    pub public_url: String,
    pub alt_text: Option<String>,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateMediaAsset {
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub room_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub alt_text: Option<Option<String>>,
    pub sort_order: Option<u32>,
}
