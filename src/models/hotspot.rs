use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A clickable marker at angular coordinates on a scene's panoramic sphere.
///
/// Hotspots are owned by exactly one scene; `scene_id` is a denormalized
/// back-reference, not an ownership pointer. Only explicit, operator-placed
/// hotspots are stored. Navigation links between consecutive scenes are
/// derived from scene order at render time and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: Uuid,
    pub scene_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Horizontal angle, wrapped into [-180, 180).
    pub yaw: f64,
    /// Vertical angle, clamped to [-90, 90].
    pub pitch: f64,
    pub kind: HotspotKind,
    /// Scene to jump to, for `scene` hotspots.
    pub target_scene_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a hotspot does when activated.
///
/// - `Info`: static annotation shown in place.
/// - `Scene`: navigation link that jumps the viewer to `target_scene_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HotspotKind {
    Info,
    Scene,
}

impl HotspotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Scene => "scene",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "scene" => Some(Self::Scene),
            _ => None,
        }
    }
}

/// Input for placing a new hotspot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHotspotInput {
    pub scene_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub yaw: f64,
    pub pitch: f64,
    /// Defaults to `Info` if not specified.
    pub kind: Option<HotspotKind>,
    pub target_scene_id: Option<Uuid>,
}

impl From<&Hotspot> for CreateHotspotInput {
    fn from(hotspot: &Hotspot) -> Self {
        Self {
            scene_id: hotspot.scene_id,
            title: hotspot.title.clone(),
            description: hotspot.description.clone(),
            yaw: hotspot.yaw,
            pitch: hotspot.pitch,
            kind: Some(hotspot.kind),
            target_scene_id: hotspot.target_scene_id,
        }
    }
}

/// Input for updating an existing hotspot. All fields are optional for
/// partial updates; id, owning scene and kind are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHotspotInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub yaw: Option<f64>,
    pub pitch: Option<f64>,
}

/// Wrap a yaw angle into [-180, 180).
pub fn wrap_yaw(yaw: f64) -> f64 {
    (yaw + 180.0).rem_euclid(360.0) - 180.0
}

/// Clamp a pitch angle to [-90, 90].
pub fn clamp_pitch(pitch: f64) -> f64 {
    pitch.clamp(-90.0, 90.0)
}
