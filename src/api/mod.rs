mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::models::TransitionPolicy;

/// Shared handler state: the store plus the review transition policy the
/// deployment was configured with.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub policy: TransitionPolicy,
}

pub fn create_router(db: Database, policy: TransitionPolicy) -> Router {
    let api = Router::new()
        // Tours
        .route("/tours", get(handlers::list_tours))
        .route("/tours", post(handlers::create_tour))
        .route("/tours/{id}", get(handlers::get_tour))
        .route("/tours/{id}", delete(handlers::delete_tour))
        .route("/tours/{id}/approve", post(handlers::approve_tour))
        .route("/tours/{id}/reject", post(handlers::reject_tour))
        .route("/tours/{id}/scenes", post(handlers::create_scene))
        // Scenes
        .route("/scenes/{id}", delete(handlers::delete_scene))
        .route("/scenes/{id}/image", put(handlers::replace_scene_image))
        // Hotspots
        .route("/hotspots", post(handlers::create_hotspot))
        .route("/hotspots/{id}", put(handlers::update_hotspot))
        .route("/hotspots/{id}", delete(handlers::delete_hotspot))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { db, policy })
}
