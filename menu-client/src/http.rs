//! HTTP client for network-based API calls

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use shared::error::ApiResponse;
use shared::models::{
    BatchPositionRequest, BatchPositionResult, Menu, MenuCreate, MenuItem, MenuItemCreate,
    PositionUpdate, Section, SectionCreate,
};
use shared::reorder::DragKind;

use crate::{ClientConfig, ClientError, ClientResult, PositionSink};

/// HTTP client for making network requests to the menu server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match self.auth_header() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        };

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.get(self.url(path))).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.delete(self.url(path))).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            match status {
                StatusCode::UNAUTHORIZED => return Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => return Err(ClientError::Forbidden(text)),
                _ => {}
            }
            if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
                && let Some(code) = envelope.code
            {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    code,
                    message: envelope.message,
                });
            }
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        response.json().await.map_err(Into::into)
    }

    fn data<T>(response: ApiResponse<T>, what: &str) -> ClientResult<T> {
        response
            .data
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {} data", what)))
    }

    // ========== Menu API ==========

    pub async fn list_menus(&self, restaurant_id: i64) -> ClientResult<Vec<Menu>> {
        let response = self
            .get(&format!("/api/restaurants/{}/menus", restaurant_id))
            .await?;
        Self::data(response, "menu list")
    }

    pub async fn get_menu(&self, id: i64) -> ClientResult<Menu> {
        let response = self.get(&format!("/api/menus/{}", id)).await?;
        Self::data(response, "menu")
    }

    pub async fn create_menu(&self, restaurant_id: i64, payload: &MenuCreate) -> ClientResult<Menu> {
        let response = self
            .post(&format!("/api/restaurants/{}/menus", restaurant_id), payload)
            .await?;
        Self::data(response, "menu")
    }

    pub async fn delete_menu(&self, id: i64) -> ClientResult<()> {
        self.delete::<ApiResponse<()>>(&format!("/api/menus/{}", id))
            .await?;
        Ok(())
    }

    // ========== Section API ==========

    pub async fn list_sections(&self, menu_id: i64) -> ClientResult<Vec<Section>> {
        let response = self.get(&format!("/api/menus/{}/sections", menu_id)).await?;
        Self::data(response, "section list")
    }

    pub async fn create_section(&self, menu_id: i64, payload: &SectionCreate) -> ClientResult<Section> {
        let response = self
            .post(&format!("/api/menus/{}/sections", menu_id), payload)
            .await?;
        Self::data(response, "section")
    }

    // ========== Menu item API ==========

    pub async fn list_items(&self, section_id: i64) -> ClientResult<Vec<MenuItem>> {
        let response = self
            .get(&format!("/api/sections/{}/items", section_id))
            .await?;
        Self::data(response, "item list")
    }

    pub async fn create_item(&self, section_id: i64, payload: &MenuItemCreate) -> ClientResult<MenuItem> {
        let response = self
            .post(&format!("/api/sections/{}/items", section_id), payload)
            .await?;
        Self::data(response, "item")
    }

    // ========== Ordering API ==========

    /// Submit one position batch
    ///
    /// `parent_id` is the restaurant for menus and the menu otherwise.
    pub async fn update_positions(
        &self,
        kind: DragKind,
        parent_id: i64,
        updates: &[PositionUpdate],
    ) -> ClientResult<BatchPositionResult> {
        let path = match kind {
            DragKind::Menus => format!("/api/restaurants/{}/menus/sort-order", parent_id),
            DragKind::Sections => format!("/api/menus/{}/sections/sort-order", parent_id),
            DragKind::Items => format!("/api/menus/{}/items/sort-order", parent_id),
        };
        let body = BatchPositionRequest {
            items: updates.to_vec(),
        };
        let response = self.put(&path, &body).await?;
        Self::data(response, "batch result")
    }
}

#[async_trait]
impl PositionSink for HttpClient {
    async fn save_positions(
        &self,
        kind: DragKind,
        parent_id: i64,
        updates: &[PositionUpdate],
    ) -> ClientResult<()> {
        let result = self.update_positions(kind, parent_id, updates).await?;
        tracing::debug!(
            %kind,
            parent_id,
            updated = result.updated,
            version = result.version,
            "Positions saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_single_slash() {
        let client = HttpClient::new(&ClientConfig::new("http://localhost:3000/")).unwrap();
        assert_eq!(
            client.url("/api/menus/1"),
            "http://localhost:3000/api/menus/1"
        );
        assert_eq!(client.url("health"), "http://localhost:3000/health");
    }

    #[test]
    fn test_token_builder() {
        let client = HttpClient::new(&ClientConfig::default())
            .unwrap()
            .with_token("abc");
        assert_eq!(client.token(), Some("abc"));
        assert_eq!(client.auth_header().as_deref(), Some("Bearer abc"));
    }
}
