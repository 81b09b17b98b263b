//! The boundary through which the in-memory model exchanges state with the
//! backing store.
//!
//! The store is the single source of truth: tours are fetched as full
//! snapshots and every editor mutation is pushed through here. Two
//! implementations exist: [`HttpSync`] against a remote deployment and
//! [`LocalSync`] against an in-process store for development and tests.

mod http;
mod local;

pub use http::HttpSync;
pub use local::LocalSync;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CreateHotspotInput, Hotspot, ImageRef, Tour, UpdateHotspotInput};

/// A sync call that did not complete successfully.
///
/// Never fatal: each failure is scoped to the single operation that raised
/// it, and the rest of the tour model stays usable.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Remote-store operations the tour aggregate and editor session depend on.
#[async_trait]
pub trait SyncBoundary: Send + Sync {
    /// Full snapshot of every tour.
    async fn fetch_tours(&self) -> Result<Vec<Tour>, SyncError>;

    /// Full snapshot of one tour; replaces any cached copy wholesale.
    async fn fetch_tour(&self, id: Uuid) -> Result<Tour, SyncError>;

    /// Persist a new hotspot. The store assigns the authoritative id.
    async fn create_hotspot(&self, input: &CreateHotspotInput) -> Result<Hotspot, SyncError>;

    async fn update_hotspot(
        &self,
        id: Uuid,
        patch: &UpdateHotspotInput,
    ) -> Result<Hotspot, SyncError>;

    /// Idempotent: deleting an id that is already gone succeeds.
    async fn delete_hotspot(&self, id: Uuid) -> Result<(), SyncError>;

    async fn replace_scene_image(&self, scene_id: Uuid, image: &ImageRef)
        -> Result<(), SyncError>;

    async fn approve_tour(&self, id: Uuid) -> Result<Tour, SyncError>;

    async fn reject_tour(&self, id: Uuid) -> Result<Tour, SyncError>;
}
