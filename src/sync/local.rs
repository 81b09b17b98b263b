//! In-process implementation of the sync boundary.
//!
//! Backs the console with an injected in-process store when no remote
//! deployment is available. Used for local development and in tests.

use async_trait::async_trait;
use uuid::Uuid;

use super::{SyncBoundary, SyncError};
use crate::db::Database;
use crate::models::{
    CreateHotspotInput, Hotspot, ImageRef, Tour, TourStatus, TransitionPolicy, UpdateHotspotInput,
};

/// Sync boundary backed by an in-process store.
#[derive(Clone)]
pub struct LocalSync {
    db: Database,
    policy: TransitionPolicy,
}

impl LocalSync {
    pub fn new(db: Database, policy: TransitionPolicy) -> Self {
        Self { db, policy }
    }
}

/// Map store errors onto the sync taxonomy the session understands.
fn store_error(e: anyhow::Error) -> SyncError {
    let msg = e.to_string();
    if msg.contains("not found") {
        SyncError::NotFound(msg)
    } else if msg.contains("not permitted") {
        SyncError::BadRequest(msg)
    } else {
        SyncError::Server(msg)
    }
}

#[async_trait]
impl SyncBoundary for LocalSync {
    async fn fetch_tours(&self) -> Result<Vec<Tour>, SyncError> {
        self.db.get_all_tours().map_err(store_error)
    }

    async fn fetch_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        self.db
            .get_tour(id)
            .map_err(store_error)?
            .ok_or_else(|| SyncError::NotFound(format!("Tour not found: {}", id)))
    }

    async fn create_hotspot(&self, input: &CreateHotspotInput) -> Result<Hotspot, SyncError> {
        self.db.create_hotspot(input.clone()).map_err(store_error)
    }

    async fn update_hotspot(
        &self,
        id: Uuid,
        patch: &UpdateHotspotInput,
    ) -> Result<Hotspot, SyncError> {
        self.db
            .update_hotspot(id, patch.clone())
            .map_err(store_error)?
            .ok_or_else(|| SyncError::NotFound(format!("Hotspot not found: {}", id)))
    }

    async fn delete_hotspot(&self, id: Uuid) -> Result<(), SyncError> {
        // Idempotent: a missing row is still a successful delete
        self.db.delete_hotspot(id).map_err(store_error)?;
        Ok(())
    }

    async fn replace_scene_image(
        &self,
        scene_id: Uuid,
        image: &ImageRef,
    ) -> Result<(), SyncError> {
        if self
            .db
            .replace_scene_image(scene_id, image)
            .map_err(store_error)?
        {
            Ok(())
        } else {
            Err(SyncError::NotFound(format!(
                "Scene not found: {}",
                scene_id
            )))
        }
    }

    async fn approve_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        self.db
            .set_tour_status(id, TourStatus::Approved, &self.policy)
            .map_err(store_error)?
            .ok_or_else(|| SyncError::NotFound(format!("Tour not found: {}", id)))
    }

    async fn reject_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        self.db
            .set_tour_status(id, TourStatus::Rejected, &self.policy)
            .map_err(store_error)?
            .ok_or_else(|| SyncError::NotFound(format!("Tour not found: {}", id)))
    }
}
