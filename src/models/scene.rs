use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Hotspot;

/// One panoramic image plus the explicit hotspots placed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub title: String,
    pub image: ImageRef,
    /// Explicit, operator-placed hotspots only. Order carries no meaning.
    pub hotspots: Vec<Hotspot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference to a scene's panoramic image asset.
///
/// During editing a scene may point at a local blob that has not been
/// uploaded yet; after the backend stores the asset the reference becomes a
/// persisted URL. The two states are resolved once here instead of being
/// re-inspected at every use site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImageRef {
    /// Local object reference while an upload is still in flight.
    Pending { blob: String },
    /// Backend-persisted asset URL.
    Persisted { url: String },
}

impl ImageRef {
    pub fn pending(blob: impl Into<String>) -> Self {
        Self::Pending { blob: blob.into() }
    }

    pub fn persisted(url: impl Into<String>) -> Self {
        Self::Persisted { url: url.into() }
    }

    /// The renderable reference, whichever state the image is in.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending { blob } => blob,
            Self::Persisted { url } => url,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }

    /// State tag used by the store.
    pub fn state_str(&self) -> &'static str {
        match self {
            Self::Pending { .. } => "pending",
            Self::Persisted { .. } => "persisted",
        }
    }

    /// Rebuild from the store's (state, reference) column pair. Unknown
    /// states are treated as persisted.
    pub fn from_parts(state: &str, reference: String) -> Self {
        match state {
            "pending" => Self::Pending { blob: reference },
            _ => Self::Persisted { url: reference },
        }
    }
}

/// Input for adding a scene to a tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSceneInput {
    /// Defaults to "Untitled Scene" if not specified.
    pub title: Option<String>,
    pub image: ImageRef,
}
