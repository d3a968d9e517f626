//! Client for the drain REST API.
//!
//! [`DrainApi`] is the seam the views talk through; [`HttpDrainApi`] is the
//! real implementation over HTTP.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ApiErrorBody, Drain, DrainUpdate};

/// Longest plain-text error body that is shown to the user verbatim.
const MAX_PLAIN_ERROR_LEN: usize = 200;

/// Operations the drain service offers.
#[async_trait]
pub trait DrainApi: Send + Sync + std::fmt::Debug {
    /// List every drain.
    async fn list_drains(&self) -> Result<Vec<Drain>>;

    /// Fetch one drain.
    async fn get_drain(&self, id: i64) -> Result<Drain>;

    /// Associate a user with a drain.
    async fn adopt_drain(&self, id: i64, user_id: i64, token: Option<&str>) -> Result<Drain>;

    /// Apply a partial update to a drain.
    async fn update_drain(
        &self,
        id: i64,
        user_id: i64,
        update: &DrainUpdate,
        token: Option<&str>,
    ) -> Result<Drain>;

    /// Delete a drain.
    async fn delete_drain(&self, id: i64, token: Option<&str>) -> Result<()>;
}

/// [`DrainApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDrainApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpDrainApi {
    /// Create a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBaseUrl`] if the URL does not parse or is not
    /// http(s).
    pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| Error::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidBaseUrl {
                url: base_url.to_string(),
                message: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// The service base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}/api/drains{path}", self.base_url));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) fn list_request(&self) -> RequestBuilder {
        self.request(Method::GET, "", None)
    }

    pub(crate) fn get_request(&self, id: i64) -> RequestBuilder {
        self.request(Method::GET, &format!("/{id}"), None)
    }

    pub(crate) fn adopt_request(&self, id: i64, user_id: i64, token: Option<&str>) -> RequestBuilder {
        self.request(Method::POST, &format!("/{id}/adopt"), token)
            .query(&[("userId", user_id)])
    }

    pub(crate) fn update_request(
        &self,
        id: i64,
        user_id: i64,
        update: &DrainUpdate,
        token: Option<&str>,
    ) -> RequestBuilder {
        self.request(Method::PUT, &format!("/{id}"), token)
            .query(&[("userId", user_id)])
            .json(update)
    }

    pub(crate) fn delete_request(&self, id: i64, token: Option<&str>) -> RequestBuilder {
        self.request(Method::DELETE, &format!("/{id}"), token)
    }
}

#[async_trait]
impl DrainApi for HttpDrainApi {
    async fn list_drains(&self) -> Result<Vec<Drain>> {
        debug!("GET /api/drains");
        let response = self.list_request().send().await?;
        read_json(response, "Failed to fetch drains").await
    }

    async fn get_drain(&self, id: i64) -> Result<Drain> {
        debug!("GET /api/drains/{id}");
        let response = self.get_request(id).send().await?;
        read_json(response, "Failed to fetch drain details").await
    }

    async fn adopt_drain(&self, id: i64, user_id: i64, token: Option<&str>) -> Result<Drain> {
        debug!("POST /api/drains/{id}/adopt?userId={user_id}");
        let response = self.adopt_request(id, user_id, token).send().await?;
        read_json(response, "Failed to adopt drain").await
    }

    async fn update_drain(
        &self,
        id: i64,
        user_id: i64,
        update: &DrainUpdate,
        token: Option<&str>,
    ) -> Result<Drain> {
        debug!("PUT /api/drains/{id}?userId={user_id}");
        let response = self
            .update_request(id, user_id, update, token)
            .send()
            .await?;
        read_json(response, "Failed to update drain").await
    }

    async fn delete_drain(&self, id: i64, token: Option<&str>) -> Result<()> {
        debug!("DELETE /api/drains/{id}");
        let response = self.delete_request(id, token).send().await?;
        check_status(response, "Failed to delete drain").await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let body = check_status(response, fallback).await?.text().await?;
    decode(&body)
}

/// Parse a success body. Malformed JSON is reported as [`Error::Json`], not
/// as a transport failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

async fn check_status(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, fallback);
    debug!(status = status.as_u16(), %message, "Drain API request failed");
    Err(Error::api(status.as_u16(), message))
}

/// Pick the message to show for a failed request.
///
/// Structured error bodies win; short plain-text bodies are shown as-is;
/// anything else falls back to `fallback`.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = parsed.best_message() {
            return message.to_string();
        }
        return fallback.to_string();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') || trimmed.len() > MAX_PLAIN_ERROR_LEN {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
