//! HTTP transport for the labels API.
//!
//! # Design
//! - `LabelApi` is the seam the loader and upload pipeline depend on; tests swap in fakes.
//! - `HttpTransport` is stateless beyond its client: every call is one request/response.
//! - Non-success statuses become typed errors whose messages carry the status code.

use async_trait::async_trait;
use rebuddy_models::{Catalog, HealthResponse, LabelsResponse, UploadRequest, UploadResponse};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::TransportConfig;
use crate::error::TransportError;

/// Request correlation header attached to every call.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

const LABELS_PATH: &str = "labels";
const UPLOAD_PATH: &str = "upload";
const HEALTH_PATH: &str = "health";

#[async_trait]
/// Request/response contract of the labels API.
pub trait LabelApi: Send + Sync {
    /// Fetch the label catalog (`GET /labels`).
    async fn fetch_catalog(&self) -> Result<Catalog, TransportError>;
    /// Submit an encoded image with its label (`POST /upload`).
    async fn submit_upload(&self, request: &UploadRequest)
    -> Result<UploadResponse, TransportError>;
    /// Query service health (`GET /health`).
    async fn health(&self) -> Result<HealthResponse, TransportError>;
}

/// `reqwest`-backed implementation of [`LabelApi`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a transport with its own client, tagged with a fresh request id.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        Self::with_request_id(config, &Uuid::new_v4().to_string())
    }

    /// Build a transport whose requests carry `request_id` in `x-request-id`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_request_id(
        config: &TransportConfig,
        request_id: &str,
    ) -> Result<Self, TransportError> {
        let mut default_headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(request_id) {
            default_headers.insert(HEADER_REQUEST_ID, value);
        } else {
            warn!(request_id, "request id is not a valid header value; omitting");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| TransportError::Client { source })?;

        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, TransportError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|source| TransportError::Endpoint {
                endpoint: path,
                source,
            })
    }
}

fn request_error(endpoint: &'static str, source: reqwest::Error) -> TransportError {
    if source.is_timeout() {
        TransportError::Timeout { endpoint }
    } else {
        TransportError::Request { endpoint, source }
    }
}

fn decode_error(endpoint: &'static str, source: reqwest::Error) -> TransportError {
    if source.is_timeout() {
        TransportError::Timeout { endpoint }
    } else {
        TransportError::Decode { endpoint, source }
    }
}

#[async_trait]
impl LabelApi for HttpTransport {
    async fn fetch_catalog(&self) -> Result<Catalog, TransportError> {
        let url = self.endpoint(LABELS_PATH)?;
        debug!(%url, "fetching label catalog");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| request_error(LABELS_PATH, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::CatalogStatus {
                status: status.as_u16(),
            });
        }

        let body: LabelsResponse = response
            .json()
            .await
            .map_err(|err| decode_error(LABELS_PATH, err))?;
        if let LabelsResponse::Flat {
            items,
            total_count: Some(total_count),
        } = &body
            && *total_count != items.len()
        {
            warn!(
                total_count,
                received = items.len(),
                "label catalog total_count disagrees with item count"
            );
        }
        Ok(Catalog::from(body))
    }

    async fn submit_upload(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadResponse, TransportError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        debug!(%url, label = %request.label, bytes = request.image_base64.len(), "submitting upload");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| request_error(UPLOAD_PATH, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::UploadStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|err| decode_error(UPLOAD_PATH, err))
    }

    async fn health(&self) -> Result<HealthResponse, TransportError> {
        let url = self.endpoint(HEALTH_PATH)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| request_error(HEALTH_PATH, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HealthStatus {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|err| decode_error(HEALTH_PATH, err))
    }
}
