use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
///
/// Some errors are validation errors that should be exposed to the client
/// (e.g., "Target scene not found in this tour"). These are returned as-is
/// with a BAD_REQUEST status.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();

    // Known validation errors that are safe to expose
    if msg.contains("not found") || msg.contains("not permitted") {
        tracing::warn!("Validation error: {}", msg);
        return (StatusCode::BAD_REQUEST, msg);
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Tours
// ============================================================

pub async fn list_tours(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tour>>, (StatusCode, String)> {
    state.db.get_all_tours().map(Json).map_err(internal_error)
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tour>, (StatusCode, String)> {
    state
        .db
        .get_tour(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Tour not found".to_string()))
}

pub async fn create_tour(
    State(state): State<AppState>,
    Json(input): Json<CreateTourInput>,
) -> Result<(StatusCode, Json<Tour>), (StatusCode, String)> {
    state
        .db
        .create_tour(input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.db.delete_tour(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Tour not found".to_string()))
    }
}

pub async fn approve_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tour>, (StatusCode, String)> {
    state
        .db
        .set_tour_status(id, TourStatus::Approved, &state.policy)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Tour not found".to_string()))
}

pub async fn reject_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tour>, (StatusCode, String)> {
    state
        .db
        .set_tour_status(id, TourStatus::Rejected, &state.policy)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Tour not found".to_string()))
}

// ============================================================
// Scenes
// ============================================================

pub async fn create_scene(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
    Json(input): Json<CreateSceneInput>,
) -> Result<(StatusCode, Json<Scene>), (StatusCode, String)> {
    state
        .db
        .create_scene(tour_id, input)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(internal_error)
}

pub async fn delete_scene(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.db.delete_scene(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Scene not found".to_string()))
    }
}

/// Body for replacing a scene's panoramic image.
#[derive(Debug, Deserialize)]
pub struct ReplaceImageInput {
    pub image: ImageRef,
}

pub async fn replace_scene_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReplaceImageInput>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state
        .db
        .replace_scene_image(id, &input.image)
        .map_err(internal_error)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Scene not found".to_string()))
    }
}

// ============================================================
// Hotspots
// ============================================================

pub async fn create_hotspot(
    State(state): State<AppState>,
    Json(input): Json<CreateHotspotInput>,
) -> Result<(StatusCode, Json<Hotspot>), (StatusCode, String)> {
    state
        .db
        .create_hotspot(input)
        .map(|h| (StatusCode::CREATED, Json(h)))
        .map_err(internal_error)
}

pub async fn update_hotspot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateHotspotInput>,
) -> Result<Json<Hotspot>, (StatusCode, String)> {
    state
        .db
        .update_hotspot(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Hotspot not found".to_string()))
}

/// Deleting a hotspot is idempotent: removing an id that is already gone
/// still succeeds.
pub async fn delete_hotspot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.db.delete_hotspot(id).map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}
