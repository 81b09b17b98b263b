//! Optimistic edit commands.
//!
//! Every mutation the editor performs is captured as a command carrying the
//! state its compensating action needs. The session applies the forward
//! action immediately, pushes the command through the sync boundary, and
//! reverts it if the boundary rejects the change.

use uuid::Uuid;

use crate::models::{Hotspot, ImageRef, ModelError, Tour, UpdateHotspotInput};

/// One editor mutation, with enough captured state to undo it.
#[derive(Debug, Clone)]
pub enum EditCommand {
    AddHotspot {
        hotspot: Hotspot,
    },
    UpdateHotspot {
        id: Uuid,
        patch: UpdateHotspotInput,
        previous: Hotspot,
    },
    RemoveHotspot {
        removed: Hotspot,
    },
    ReplaceSceneImage {
        scene_id: Uuid,
        image: ImageRef,
        previous: ImageRef,
    },
}

impl EditCommand {
    /// Apply the forward action. The session's normal flow mutates the tour
    /// directly and only records the command; this path exists for retrying
    /// a rolled-back edit.
    pub fn apply(&self, tour: &mut Tour) -> Result<(), ModelError> {
        match self {
            Self::AddHotspot { hotspot } => {
                tour.restore_hotspot(hotspot.clone());
                Ok(())
            }
            Self::UpdateHotspot { id, patch, .. } => {
                tour.update_hotspot(*id, patch.clone()).map(|_| ())
            }
            Self::RemoveHotspot { removed } => {
                tour.remove_hotspot(removed.id);
                Ok(())
            }
            Self::ReplaceSceneImage {
                scene_id, image, ..
            } => tour.replace_scene_image(*scene_id, image.clone()).map(|_| ()),
        }
    }

    /// Apply the compensating action, restoring the tour to its
    /// pre-command state.
    pub fn revert(&self, tour: &mut Tour) {
        match self {
            Self::AddHotspot { hotspot } => {
                tour.remove_hotspot(hotspot.id);
            }
            Self::UpdateHotspot { previous, .. } => {
                tour.restore_hotspot(previous.clone());
            }
            Self::RemoveHotspot { removed } => {
                tour.restore_hotspot(removed.clone());
            }
            Self::ReplaceSceneImage {
                scene_id, previous, ..
            } => {
                let _ = tour.replace_scene_image(*scene_id, previous.clone());
            }
        }
    }
}
