use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::core::config::ApiConfig;
use crate::core::error::{AppError, Result};
use crate::modules::http::{MultipartForm, Session};
use crate::shared::types::ApiResponse;

/// Client for the marketplace REST API
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<Session>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent("HulumoyaAdmin/1.0")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// GET `path` and return the envelope's data
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request = self.request(Method::GET, path).query(query);
        let (status, envelope) = self.execute::<T>(request).await?;
        envelope.into_data(status)
    }

    /// POST a JSON body and return the envelope's data
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(body);
        let (status, envelope) = self.execute::<T>(request).await?;
        envelope.into_data(status)
    }

    /// POST a multipart form and return the envelope's data
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T> {
        let request = self
            .request(Method::POST, path)
            .multipart(form.into_reqwest()?);
        let (status, envelope) = self.execute::<T>(request).await?;
        envelope.into_data(status)
    }

    /// POST a multipart form to an endpoint answering with a boolean acknowledgment
    pub async fn post_multipart_ack(&self, path: &str, form: MultipartForm) -> Result<bool> {
        let request = self
            .request(Method::POST, path)
            .multipart(form.into_reqwest()?);
        let (status, envelope) = self.execute::<bool>(request).await?;
        envelope.into_ack(status)
    }

    /// PUT a multipart form and return the envelope's data
    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T> {
        let request = self
            .request(Method::PUT, path)
            .multipart(form.into_reqwest()?);
        let (status, envelope) = self.execute::<T>(request).await?;
        envelope.into_data(status)
    }

    /// DELETE `path`, answering with a boolean acknowledgment
    pub async fn delete_ack(&self, path: &str) -> Result<bool> {
        let request = self.request(Method::DELETE, path);
        let (status, envelope) = self.execute::<bool>(request).await?;
        envelope.into_ack(status)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("API request: {} {}", method, url);

        let mut request = self.http_client.request(method, url);
        if let Some(token) = self.session.bearer_token() {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Send the request and decode the envelope, mapping every failure mode.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(u16, ApiResponse<T>)> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("API request failed before a response: {}", e);
            AppError::Transport(format!("Could not reach the server: {}", e))
        })?;

        let status = response.status();
        let url = response.url().clone();

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear();
            return Err(AppError::Unauthorized(
                "Your session has expired, please sign in again".to_string(),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read response body from {}: {}", url, e);
            AppError::Transport(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            tracing::warn!("API returned HTTP {} for {}", status, url);
            // Error bodies usually carry the envelope; fall back to the status text.
            let rejection = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body)
                .map(|e| AppError::api(Some(status.as_u16()), e.message, e.errors))
                .unwrap_or_else(|_| {
                    AppError::api(
                        Some(status.as_u16()),
                        Some(format!(
                            "Request failed with status {}",
                            status.canonical_reason().unwrap_or(status.as_str())
                        )),
                        None,
                    )
                });
            return Err(rejection);
        }

        let envelope = serde_json::from_slice::<ApiResponse<T>>(&body).map_err(|e| {
            tracing::error!("Failed to decode response from {}: {}", url, e);
            AppError::api(
                Some(status.as_u16()),
                Some(format!("Unexpected response from server: {}", e)),
                None,
            )
        })?;

        Ok((status.as_u16(), envelope))
    }
}
