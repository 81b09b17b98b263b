//! Viewer/editor core.
//!
//! [`catalogue`] turns a tour into the document the panoramic rendering
//! engine consumes, deriving the auto-navigation hotspots from scene order
//! on every render. [`session`] holds the transient per-view state (current
//! scene, edit mode, selection) and turns operator actions into optimistic
//! edit commands pushed through the sync boundary.

pub mod catalogue;
pub mod commands;
pub mod session;

pub use catalogue::{derive_auto_navigation_hotspots, HotspotView, SceneView, ViewerInit};
pub use commands::EditCommand;
pub use session::{push_edit, EditorSession, PendingEdit, Resolution, SessionMode, SyncOutcome};
