//! Domain models for PanoDesk.
//!
//! # Core Concepts
//!
//! - [`Tour`]: a client's complete 360° walkthrough, an ordered sequence of
//!   scenes. Scene order determines the auto-navigation links the viewer
//!   derives at render time.
//! - [`Scene`]: one panoramic image plus the explicit hotspots placed on it.
//! - [`Hotspot`]: a marker at angular coordinates on a scene's sphere, either
//!   an informational annotation or a link to another scene.
//!
//! The store (see [`crate::db`]) is the source of truth; a `Tour` value held
//! by an editor session is a cache that is replaced wholesale on every fetch.
//! Derived navigation hotspots never appear here; they exist only in the
//! viewer catalogue (see [`crate::viewer::catalogue`]).

mod hotspot;
mod scene;
mod tour;

pub use hotspot::*;
pub use scene::*;
pub use tour::*;

use thiserror::Error;
use uuid::Uuid;

/// Errors produced by in-memory model operations.
///
/// These are local to the cached model and must be surfaced as UI feedback;
/// none of them is fatal to the rest of the tour.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("scene not found: {0}")]
    SceneNotFound(Uuid),

    #[error("hotspot not found: {0}")]
    HotspotNotFound(Uuid),

    #[error("hotspot id is not valid: {0}")]
    InvalidHotspotId(String),

    #[error("navigation hotspot {0} is derived from scene order and cannot be edited")]
    SyntheticHotspot(String),

    #[error("status change from {from} to {to} is not permitted")]
    TransitionDenied { from: TourStatus, to: TourStatus },

    #[error("session is not in edit mode")]
    NotEditing,

    #[error("tour has no scene to edit")]
    NoCurrentScene,
}

impl ModelError {
    /// Whether this is a missing-target error rather than a validation error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ModelError::SceneNotFound(_) | ModelError::HotspotNotFound(_)
        )
    }
}
