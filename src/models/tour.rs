use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    clamp_pitch, wrap_yaw, CreateHotspotInput, Hotspot, HotspotKind, ImageRef, ModelError, Scene,
    UpdateHotspotInput,
};

/// A client's complete 360° walkthrough.
///
/// Tours own their scenes exclusively; `scenes` is an ordered sequence and
/// the order determines the default navigation links between consecutive
/// scenes. A tour is created when a client first submits 360° content and
/// then moves through review states via explicit reviewer actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TourStatus,
    pub scenes: Vec<Scene>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review state of a tour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TourStatus {
    Pending,
    Approved,
    Rejected,
    Live,
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Live => "live",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "live" => Some(Self::Live),
            _ => None,
        }
    }
}

impl std::fmt::Display for TourStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which status changes reviewers may perform.
///
/// The review rules are deliberately explicit rather than hard-coded:
/// `Unrestricted` matches the historical behavior (any status to any status
/// via explicit action), `ReviewFlow` enforces the pending → approved/rejected
/// → live pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    #[default]
    Unrestricted,
    ReviewFlow,
}

impl TransitionPolicy {
    pub fn permits(&self, from: TourStatus, to: TourStatus) -> bool {
        use TourStatus::*;
        match self {
            Self::Unrestricted => true,
            Self::ReviewFlow => matches!(
                (from, to),
                (Pending, Approved)
                    | (Pending, Rejected)
                    | (Approved, Live)
                    | (Approved, Rejected)
                    | (Rejected, Pending)
            ),
        }
    }
}

/// Input for registering a newly submitted tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTourInput {
    pub client_id: Uuid,
    pub client_name: String,
    pub title: String,
    pub description: Option<String>,
}

impl Tour {
    /// Look up a scene by id within this tour.
    pub fn scene(&self, scene_id: Uuid) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    fn scene_mut(&mut self, scene_id: Uuid) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == scene_id)
    }

    /// Default entry point when the tour is opened. A tour with no scenes
    /// yields `None`; the viewer shows an empty state.
    pub fn first_scene(&self) -> Option<&Scene> {
        self.scenes.first()
    }

    /// Find the hotspot with the given id, searching every scene.
    pub fn hotspot(&self, id: Uuid) -> Option<&Hotspot> {
        self.scenes
            .iter()
            .flat_map(|s| s.hotspots.iter())
            .find(|h| h.id == id)
    }

    /// Place a new explicit hotspot on one of this tour's scenes.
    ///
    /// Assigns a fresh id, defaults `kind` to `Info`, and clamps the angular
    /// coordinates. Fails when the owning scene (or the navigation target,
    /// for scene links) does not resolve within this tour.
    pub fn add_hotspot(&mut self, input: CreateHotspotInput) -> Result<Hotspot, ModelError> {
        if let Some(target) = input.target_scene_id {
            if self.scene(target).is_none() {
                return Err(ModelError::SceneNotFound(target));
            }
        }
        let scene = self
            .scene_mut(input.scene_id)
            .ok_or(ModelError::SceneNotFound(input.scene_id))?;

        let now = Utc::now();
        let hotspot = Hotspot {
            id: Uuid::new_v4(),
            scene_id: scene.id,
            title: input.title,
            description: input.description,
            yaw: wrap_yaw(input.yaw),
            pitch: clamp_pitch(input.pitch),
            kind: input.kind.unwrap_or(HotspotKind::Info),
            target_scene_id: input.target_scene_id,
            created_at: now,
            updated_at: now,
        };
        scene.hotspots.push(hotspot.clone());
        Ok(hotspot)
    }

    /// Patch an existing hotspot. Only title, description, yaw and pitch are
    /// mutable; id, owning scene and kind stay fixed.
    pub fn update_hotspot(
        &mut self,
        id: Uuid,
        patch: UpdateHotspotInput,
    ) -> Result<Hotspot, ModelError> {
        for scene in &mut self.scenes {
            if let Some(hotspot) = scene.hotspots.iter_mut().find(|h| h.id == id) {
                if let Some(title) = patch.title {
                    hotspot.title = title;
                }
                if let Some(description) = patch.description {
                    hotspot.description = Some(description);
                }
                if let Some(yaw) = patch.yaw {
                    hotspot.yaw = wrap_yaw(yaw);
                }
                if let Some(pitch) = patch.pitch {
                    hotspot.pitch = clamp_pitch(pitch);
                }
                hotspot.updated_at = Utc::now();
                return Ok(hotspot.clone());
            }
        }
        Err(ModelError::HotspotNotFound(id))
    }

    /// Remove a hotspot by id. Removing an id that is already absent is a
    /// no-op, matching idempotent-delete semantics; the removed hotspot is
    /// returned when one existed.
    pub fn remove_hotspot(&mut self, id: Uuid) -> Option<Hotspot> {
        for scene in &mut self.scenes {
            if let Some(pos) = scene.hotspots.iter().position(|h| h.id == id) {
                return Some(scene.hotspots.remove(pos));
            }
        }
        None
    }

    /// Re-insert a hotspot into its owning scene, replacing any copy with the
    /// same id. Used by compensating actions and server-id adoption.
    pub fn restore_hotspot(&mut self, hotspot: Hotspot) {
        let Some(scene) = self.scene_mut(hotspot.scene_id) else {
            return;
        };
        match scene.hotspots.iter_mut().find(|h| h.id == hotspot.id) {
            Some(existing) => *existing = hotspot,
            None => scene.hotspots.push(hotspot),
        }
    }

    /// Swap a locally assigned hotspot id for the authoritative copy the
    /// backend returned.
    pub fn adopt_hotspot(&mut self, local_id: Uuid, server_copy: Hotspot) {
        for scene in &mut self.scenes {
            if let Some(hotspot) = scene.hotspots.iter_mut().find(|h| h.id == local_id) {
                *hotspot = server_copy;
                return;
            }
        }
    }

    /// Swap a scene's panoramic image. Hotspots are untouched.
    pub fn replace_scene_image(
        &mut self,
        scene_id: Uuid,
        image: ImageRef,
    ) -> Result<&Scene, ModelError> {
        let scene = self
            .scene_mut(scene_id)
            .ok_or(ModelError::SceneNotFound(scene_id))?;
        scene.image = image;
        scene.updated_at = Utc::now();
        Ok(&*scene)
    }

    /// Apply a reviewer status change, subject to the configured policy.
    pub fn set_status(
        &mut self,
        to: TourStatus,
        policy: &TransitionPolicy,
    ) -> Result<(), ModelError> {
        if !policy.permits(self.status, to) {
            return Err(ModelError::TransitionDenied {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}
