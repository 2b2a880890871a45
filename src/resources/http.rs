//! HTTP backend for the catalog REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{AppError, ResourceError};
use crate::models::{EntityKey, Record};

use super::payload::{detail_from_body, records_from_payload};
use super::traits::{ResourceReader, ResourceWriter};

/// Catalog backend reached over HTTP.
///
/// Collections are read with `GET {base_url}{resource}`; records are deleted
/// with `DELETE {base_url}{resource}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpResourceClient {
    /// Build a client from the `[api]` config section.
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }

    fn record_url(&self, resource: &str, key: &EntityKey) -> Result<Url, ResourceError> {
        let transport = |message: String| ResourceError::Transport {
            resource: resource.to_string(),
            message,
        };

        let mut url = Url::parse(&self.url(resource)).map_err(|e| transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| transport("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(&key.to_string());
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn transport_error(resource: &str, err: reqwest::Error) -> ResourceError {
        let message = if err.is_timeout() {
            format!("timed out: {}", err)
        } else {
            err.to_string()
        };
        ResourceError::Transport {
            resource: resource.to_string(),
            message,
        }
    }

    async fn status_error(resource: &str, response: reqwest::Response) -> ResourceError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = detail_from_body(&body);

        ResourceError::Status {
            resource: resource.to_string(),
            status: status.as_u16(),
            detail: if detail.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                detail
            },
        }
    }
}

#[async_trait]
impl ResourceReader for HttpResourceClient {
    async fn fetch_collection(&self, resource: &str) -> Result<Vec<Record>, ResourceError> {
        let response = self
            .authorize(self.client.get(self.url(resource)))
            .send()
            .await
            .map_err(|e| Self::transport_error(resource, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(resource, response).await);
        }

        let payload: Value = response.json().await.map_err(|e| ResourceError::Payload {
            resource: resource.to_string(),
            message: e.to_string(),
        })?;

        records_from_payload(resource, payload)
    }
}

#[async_trait]
impl ResourceWriter for HttpResourceClient {
    async fn delete_record(&self, resource: &str, key: &EntityKey) -> Result<(), ResourceError> {
        let url = self.record_url(resource, key)?;
        tracing::debug!("DELETE {}", url);

        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await
            .map_err(|e| Self::transport_error(resource, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(resource, response).await);
        }

        Ok(())
    }
}
