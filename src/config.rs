use std::path::PathBuf;

use crate::models::TransitionPolicy;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database file override (from PANO_DESK_DB). Defaults to the
    /// platform data directory when unset.
    pub database_path: Option<PathBuf>,
    /// Port for the HTTP API (from PANO_DESK_PORT).
    pub port: u16,
    /// Review transition rules (from PANO_DESK_REVIEW_POLICY:
    /// "strict" enables the review pipeline, anything else is open).
    pub review_policy: TransitionPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        let database_path = std::env::var("PANO_DESK_DB").ok().map(PathBuf::from);

        let port = std::env::var("PANO_DESK_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(17010);

        let review_policy = match std::env::var("PANO_DESK_REVIEW_POLICY").as_deref() {
            Ok("strict") => TransitionPolicy::ReviewFlow,
            _ => TransitionPolicy::Unrestricted,
        };

        Self {
            database_path,
            port,
            review_policy,
        }
    }
}
