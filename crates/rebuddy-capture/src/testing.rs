//! In-process `LabelApi` fakes for unit tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rebuddy_models::{Catalog, HealthResponse, UploadRequest, UploadResponse};
use tokio::sync::Notify;

use crate::error::TransportError;
use crate::transport::LabelApi;

/// How the stub answers `submit_upload`.
pub(crate) enum UploadReply {
    /// Succeed, echoing the submitted label with a fixed key.
    Echo { s3_key: String },
    /// Fail with a status and body.
    Status { status: u16, body: String },
    /// Answer `success: false`.
    Rejected,
    /// Never answer.
    Hang,
}

pub(crate) struct StubApi {
    catalog: Result<Catalog, u16>,
    upload: UploadReply,
    gate: Option<Arc<Notify>>,
    fetches: AtomicUsize,
    uploads: Mutex<Vec<UploadRequest>>,
}

impl StubApi {
    pub(crate) fn with_upload(upload: UploadReply) -> Self {
        Self {
            catalog: Ok(Catalog::default()),
            upload,
            gate: None,
            fetches: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn echoing(s3_key: &str) -> Self {
        Self::with_upload(UploadReply::Echo {
            s3_key: s3_key.to_string(),
        })
    }

    pub(crate) fn serving(catalog: Catalog) -> Self {
        Self {
            catalog: Ok(catalog),
            ..Self::echoing("k1")
        }
    }

    pub(crate) fn failing_catalog(status: u16) -> Self {
        Self {
            catalog: Err(status),
            ..Self::echoing("k1")
        }
    }

    /// Hold `fetch_catalog` until `gate` is notified.
    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads
            .lock()
            .map(|uploads| uploads.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LabelApi for StubApi {
    async fn fetch_catalog(&self) -> Result<Catalog, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.catalog
            .clone()
            .map_err(|status| TransportError::CatalogStatus { status })
    }

    async fn submit_upload(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadResponse, TransportError> {
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(request.clone());
        }
        match &self.upload {
            UploadReply::Echo { s3_key } => Ok(UploadResponse {
                success: true,
                s3_key: s3_key.clone(),
                label: request.label.clone(),
            }),
            UploadReply::Status { status, body } => Err(TransportError::UploadStatus {
                status: *status,
                body: body.clone(),
            }),
            UploadReply::Rejected => Ok(UploadResponse {
                success: false,
                s3_key: String::new(),
                label: request.label.clone(),
            }),
            UploadReply::Hang => std::future::pending().await,
        }
    }

    async fn health(&self) -> Result<HealthResponse, TransportError> {
        Ok(HealthResponse {
            status: "healthy".into(),
            version: "test".into(),
        })
    }
}
