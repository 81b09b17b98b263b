//! Transient viewer/editor state.
//!
//! One session exists per open tour view and is rebuilt on every view
//! activation; nothing here is persisted. The session consumes engine
//! events (scene changes, clicks already translated to yaw/pitch by the
//! rendering engine) and turns operator actions into optimistic
//! [`EditCommand`]s. The host event loop drives the async half: apply a
//! mutation, push the returned ticket through the sync boundary, then hand
//! the outcome back to [`EditorSession::resolve`].

use uuid::Uuid;

use super::catalogue::AUTO_PREFIX;
use super::commands::EditCommand;
use crate::models::{
    CreateHotspotInput, Hotspot, ImageRef, ModelError, Scene, Tour, UpdateHotspotInput,
};
use crate::sync::{SyncBoundary, SyncError};

/// Whether the session accepts mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Viewing,
    Editing,
}

/// Ticket for an optimistic edit awaiting a sync outcome.
///
/// Carries the generation it was issued under: outcomes that arrive after
/// the tour has been reloaded resolve against state that no longer exists
/// and are discarded.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    pub seq: u64,
    pub generation: u64,
    pub command: EditCommand,
}

/// What the sync boundary reported for a pushed edit.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Mutation accepted as-is.
    Confirmed,
    /// Hotspot creation accepted; the store assigned the authoritative row.
    Created(Hotspot),
    Failed(SyncError),
}

/// What `resolve` did with an outcome.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Confirmed,
    /// The compensating action was applied and the failure recorded.
    RolledBack,
    /// The ticket predates the last tour reload; nothing was touched.
    Stale,
}

/// A sync failure surfaced for the operator, with the ticket to retry.
#[derive(Debug, Clone)]
pub struct EditFailure {
    pub seq: u64,
    pub message: String,
}

/// Per-view editor state over a cached tour snapshot.
pub struct EditorSession {
    tour: Tour,
    mode: SessionMode,
    current_scene_id: Option<Uuid>,
    selection: Option<Uuid>,
    generation: u64,
    next_seq: u64,
    in_flight: Vec<u64>,
    last_failure: Option<EditFailure>,
}

impl EditorSession {
    /// Open a session on a fetched tour. The first scene in order is the
    /// entry point; an empty tour starts with no current scene.
    pub fn new(tour: Tour) -> Self {
        let current_scene_id = tour.first_scene().map(|s| s.id);
        Self {
            tour,
            mode: SessionMode::Viewing,
            current_scene_id,
            selection: None,
            generation: 0,
            next_seq: 0,
            in_flight: Vec::new(),
            last_failure: None,
        }
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current_scene_id.and_then(|id| self.tour.scene(id))
    }

    pub fn selected_hotspot(&self) -> Option<&Hotspot> {
        self.selection.and_then(|id| self.tour.hotspot(id))
    }

    pub fn last_failure(&self) -> Option<&EditFailure> {
        self.last_failure.as_ref()
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Replace the cached tour wholesale with a fresh snapshot.
    ///
    /// Bumps the generation so outcomes of edits issued against the old
    /// snapshot are discarded when they eventually resolve.
    pub fn load_tour(&mut self, tour: Tour) {
        self.current_scene_id = tour.first_scene().map(|s| s.id);
        self.tour = tour;
        self.generation += 1;
        self.selection = None;
        self.in_flight.clear();
        self.last_failure = None;
    }

    /// Toggle edit mode. Leaving edit mode drops the selection.
    pub fn set_mode(&mut self, mode: SessionMode) {
        if mode == SessionMode::Viewing {
            self.selection = None;
        }
        self.mode = mode;
    }

    /// Scene-change notification from the engine. Pure UI-local state;
    /// ids that do not belong to this tour are ignored.
    pub fn change_scene(&mut self, engine_scene_id: &str) {
        if let Ok(id) = Uuid::parse_str(engine_scene_id) {
            if self.tour.scene(id).is_some() {
                self.current_scene_id = Some(id);
            }
        }
    }

    /// Select a rendered hotspot marker by its engine id.
    pub fn select_hotspot(&mut self, engine_id: &str) -> Result<&Hotspot, ModelError> {
        self.ensure_editing()?;
        let id = parse_engine_id(engine_id)?;
        let hotspot = self
            .tour
            .hotspot(id)
            .ok_or(ModelError::HotspotNotFound(id))?;
        self.selection = Some(id);
        Ok(hotspot)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Place a new hotspot at engine-translated coordinates on the current
    /// scene. The engine owns the projection math; the session only
    /// consumes the resulting pair.
    pub fn place_hotspot(&mut self, yaw: f64, pitch: f64) -> Result<PendingEdit, ModelError> {
        self.ensure_editing()?;
        let scene_id = self.current_scene_id.ok_or(ModelError::NoCurrentScene)?;

        let hotspot = self.tour.add_hotspot(CreateHotspotInput {
            scene_id,
            title: "New Hotspot".to_string(),
            description: None,
            yaw,
            pitch,
            kind: None,
            target_scene_id: None,
        })?;
        self.selection = Some(hotspot.id);
        Ok(self.track(EditCommand::AddHotspot { hotspot }))
    }

    /// Patch a hotspot by its engine id. Derived navigation markers are
    /// refused here rather than relying on the UI to omit them.
    pub fn update_hotspot(
        &mut self,
        engine_id: &str,
        patch: UpdateHotspotInput,
    ) -> Result<PendingEdit, ModelError> {
        self.ensure_editing()?;
        let id = parse_engine_id(engine_id)?;
        let previous = self
            .tour
            .hotspot(id)
            .cloned()
            .ok_or(ModelError::HotspotNotFound(id))?;
        self.tour.update_hotspot(id, patch.clone())?;
        Ok(self.track(EditCommand::UpdateHotspot {
            id,
            patch,
            previous,
        }))
    }

    /// Delete a hotspot by its engine id. Deleting an id that is already
    /// absent is a no-op and produces no ticket; synthetic ids are refused.
    pub fn delete_hotspot(&mut self, engine_id: &str) -> Result<Option<PendingEdit>, ModelError> {
        self.ensure_editing()?;
        let id = parse_engine_id(engine_id)?;
        let Some(removed) = self.tour.remove_hotspot(id) else {
            return Ok(None);
        };
        if self.selection == Some(id) {
            self.selection = None;
        }
        Ok(Some(self.track(EditCommand::RemoveHotspot { removed })))
    }

    /// Swap the current image of a scene, typically for a freshly selected
    /// local file (`ImageRef::Pending`) awaiting upload.
    pub fn replace_scene_image(
        &mut self,
        scene_id: Uuid,
        image: ImageRef,
    ) -> Result<PendingEdit, ModelError> {
        self.ensure_editing()?;
        let previous = self
            .tour
            .scene(scene_id)
            .map(|s| s.image.clone())
            .ok_or(ModelError::SceneNotFound(scene_id))?;
        self.tour.replace_scene_image(scene_id, image.clone())?;
        Ok(self.track(EditCommand::ReplaceSceneImage {
            scene_id,
            image,
            previous,
        }))
    }

    /// Feed a sync outcome back into the session.
    pub fn resolve(&mut self, edit: &PendingEdit, outcome: SyncOutcome) -> Resolution {
        if edit.generation != self.generation {
            return Resolution::Stale;
        }
        self.in_flight.retain(|seq| *seq != edit.seq);

        match outcome {
            SyncOutcome::Confirmed => Resolution::Confirmed,
            SyncOutcome::Created(server_copy) => {
                if let EditCommand::AddHotspot { hotspot } = &edit.command {
                    let server_id = server_copy.id;
                    self.tour.adopt_hotspot(hotspot.id, server_copy);
                    if self.selection == Some(hotspot.id) {
                        self.selection = Some(server_id);
                    }
                }
                Resolution::Confirmed
            }
            SyncOutcome::Failed(err) => {
                tracing::warn!("Sync rejected edit {}: {}", edit.seq, err);
                edit.command.revert(&mut self.tour);
                if let EditCommand::AddHotspot { hotspot } = &edit.command {
                    if self.selection == Some(hotspot.id) {
                        self.selection = None;
                    }
                }
                self.last_failure = Some(EditFailure {
                    seq: edit.seq,
                    message: err.to_string(),
                });
                Resolution::RolledBack
            }
        }
    }

    /// Re-apply a rolled-back edit and issue a fresh ticket for it.
    pub fn retry(&mut self, edit: &PendingEdit) -> Result<PendingEdit, ModelError> {
        edit.command.apply(&mut self.tour)?;
        if self
            .last_failure
            .as_ref()
            .is_some_and(|f| f.seq == edit.seq)
        {
            self.last_failure = None;
        }
        Ok(self.track(edit.command.clone()))
    }

    fn ensure_editing(&self) -> Result<(), ModelError> {
        match self.mode {
            SessionMode::Editing => Ok(()),
            SessionMode::Viewing => Err(ModelError::NotEditing),
        }
    }

    fn track(&mut self, command: EditCommand) -> PendingEdit {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.push(seq);
        PendingEdit {
            seq,
            generation: self.generation,
            command,
        }
    }
}

/// Push one optimistic edit through the sync boundary.
///
/// Errors are folded into the outcome; the caller hands it to
/// [`EditorSession::resolve`], which rolls back and records the failure.
pub async fn push_edit(sync: &dyn SyncBoundary, edit: &PendingEdit) -> SyncOutcome {
    let result = match &edit.command {
        EditCommand::AddHotspot { hotspot } => sync
            .create_hotspot(&CreateHotspotInput::from(hotspot))
            .await
            .map(SyncOutcome::Created),
        EditCommand::UpdateHotspot { id, patch, .. } => sync
            .update_hotspot(*id, patch)
            .await
            .map(|_| SyncOutcome::Confirmed),
        EditCommand::RemoveHotspot { removed } => sync
            .delete_hotspot(removed.id)
            .await
            .map(|_| SyncOutcome::Confirmed),
        EditCommand::ReplaceSceneImage {
            scene_id, image, ..
        } => sync
            .replace_scene_image(*scene_id, image)
            .await
            .map(|_| SyncOutcome::Confirmed),
    };

    match result {
        Ok(outcome) => outcome,
        Err(err) => SyncOutcome::Failed(err),
    }
}

fn parse_engine_id(id: &str) -> Result<Uuid, ModelError> {
    if id.starts_with(AUTO_PREFIX) {
        return Err(ModelError::SyntheticHotspot(id.to_string()));
    }
    Uuid::parse_str(id).map_err(|_| ModelError::InvalidHotspotId(id.to_string()))
}
