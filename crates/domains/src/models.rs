//! # Domain Models
//!
//! The content entities of Matinee and their write-boundary input shapes.
//! Field names serialize in camelCase to match the backend wire contract
//! and the embedded seed format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DataError, Result};

/// A published content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable identifier, assigned once at creation, never reassigned.
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Normalized video id, playable URL, or legacy embed markup. Opaque here.
    #[serde(default)]
    pub video_ref: String,
    /// Data-URI, relative upload path, or empty.
    #[serde(default)]
    pub thumbnail_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a post. Ids and timestamps are assigned by
/// the store, not the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub video_ref: String,
    #[serde(default)]
    pub thumbnail_ref: String,
}

impl NewPost {
    /// Write-boundary validation: the three required fields must be
    /// non-empty after trimming. Storage below this point assumes it.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                return Err(DataError::Validation(format!("{field} is required")));
            }
        }
        Ok(())
    }

    /// Materializes the draft into a full post with a fresh collision-resistant
    /// id and `created_at == updated_at == now`.
    pub fn into_post(self, now: DateTime<Utc>) -> Post {
        Post {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            category: self.category,
            video_ref: self.video_ref,
            thumbnail_ref: self.thumbnail_ref,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a post: unset fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_ref: Option<String>,
}

impl PostPatch {
    /// Merges the patch over an existing post. `created_at` is preserved,
    /// `updated_at` is stamped by the caller after a successful write.
    pub fn apply(&self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(description) = &self.description {
            post.description = description.clone();
        }
        if let Some(category) = &self.category {
            post.category = category.clone();
        }
        if let Some(video_ref) = &self.video_ref {
            post.video_ref = video_ref.clone();
        }
        if let Some(thumbnail_ref) = &self.thumbnail_ref {
            post.thumbnail_ref = thumbnail_ref.clone();
        }
        post.updated_at = now;
    }
}

/// The single global settings record. Created with defaults on first access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub adsense_code: String,
    #[serde(default)]
    pub analytics_code: String,
    pub last_modified: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            adsense_code: String::new(),
            analytics_code: String::new(),
            last_modified: Utc::now(),
        }
    }
}

/// Partial update for settings, shallow-merged over the current record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adsense_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_code: Option<String>,
}

impl SettingsPatch {
    pub fn apply(&self, settings: &mut Settings, now: DateTime<Utc>) {
        if let Some(adsense_code) = &self.adsense_code {
            settings.adsense_code = adsense_code.clone();
        }
        if let Some(analytics_code) = &self.analytics_code {
            settings.analytics_code = analytics_code.clone();
        }
        settings.last_modified = now;
    }
}

/// A self-contained, portable snapshot of the whole dataset: the embedded
/// seed format, the `GET /data` response, and the export format are all this
/// one shape, so exports round-trip back into the seed loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub admin_pin: String,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub settings: Option<Settings>,
    /// Stamped by the export surface; absent on the baked-in seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
