//! HTTP implementation of the sync boundary.
//!
//! Configuration is via environment variables:
//! - `PANO_DESK_URL` - Base URL (default: `http://localhost:17010/api/v1`)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{SyncBoundary, SyncError};
use crate::models::{CreateHotspotInput, Hotspot, ImageRef, Tour, UpdateHotspotInput};

/// Default URL for local development.
const DEFAULT_URL: &str = "http://localhost:17010/api/v1";

/// Sync boundary backed by a remote PanoDesk deployment.
#[derive(Debug, Clone)]
pub struct HttpSync {
    base_url: String,
    client: Client,
}

impl HttpSync {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PANO_DESK_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::new(base_url)
    }

    /// Create with an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// Handle response, converting HTTP errors to SyncError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(SyncError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(SyncError::BadRequest(body)),
                _ => Err(SyncError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    /// Handle response that may return empty body (204 No Content).
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), SyncError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(SyncError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(SyncError::BadRequest(body)),
                _ => Err(SyncError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}

#[async_trait]
impl SyncBoundary for HttpSync {
    async fn fetch_tours(&self) -> Result<Vec<Tour>, SyncError> {
        let response = self.request(reqwest::Method::GET, "/tours").send().await?;
        self.handle_response(response).await
    }

    async fn fetch_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/tours/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_hotspot(&self, input: &CreateHotspotInput) -> Result<Hotspot, SyncError> {
        let response = self
            .request(reqwest::Method::POST, "/hotspots")
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn update_hotspot(
        &self,
        id: Uuid,
        patch: &UpdateHotspotInput,
    ) -> Result<Hotspot, SyncError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/hotspots/{}", id))
            .json(patch)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn delete_hotspot(&self, id: Uuid) -> Result<(), SyncError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/hotspots/{}", id))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn replace_scene_image(
        &self,
        scene_id: Uuid,
        image: &ImageRef,
    ) -> Result<(), SyncError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/scenes/{}/image", scene_id))
            .json(&serde_json::json!({ "image": image }))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn approve_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/tours/{}/approve", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn reject_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/tours/{}/reject", id))
            .send()
            .await?;
        self.handle_response(response).await
    }
}
