//! Upload pipeline: encode a captured file and submit it with its label.
//!
//! # Design
//! - The pipeline never touches controller state; it returns an outcome for the controller to apply.
//! - Every failure (read, encode, transport, deadline, rejection) ends in the same `Failed` shape.
//! - Encoding mirrors a data-URL reader: build `data:<mime>;base64,<payload>`, then strip the prefix.

use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use rebuddy_models::UploadRequest;
use tracing::{info, warn};

use crate::asset::CapturedFile;
use crate::error::{CaptureError, UploadError};
use crate::transport::LabelApi;

/// Default bound on a single upload submission.
pub const DEFAULT_UPLOAD_DEADLINE: Duration = Duration::from_secs(30);

/// Result of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The server stored the photo.
    Uploaded {
        /// Storage key confirmed by the server.
        s3_key: String,
        /// Label confirmed by the server.
        label: String,
    },
    /// The attempt failed; `message` is user-facing.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

impl UploadOutcome {
    /// Whether the upload succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }

    /// Confirmed label on success.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Uploaded { label, .. } => Some(label),
            Self::Failed { .. } => None,
        }
    }

    /// Failure message on failure.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Uploaded { .. } => None,
            Self::Failed { message } => Some(message),
        }
    }
}

/// Work item handed from the controller to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// Photo to upload.
    pub file: CapturedFile,
    /// Label chosen for it.
    pub label: String,
}

/// Encodes captured files and submits them through a [`LabelApi`].
#[derive(Clone)]
pub struct UploadPipeline {
    api: Arc<dyn LabelApi>,
    deadline: Duration,
}

impl UploadPipeline {
    /// Pipeline with the default deadline.
    #[must_use]
    pub fn new(api: Arc<dyn LabelApi>) -> Self {
        Self {
            api,
            deadline: DEFAULT_UPLOAD_DEADLINE,
        }
    }

    /// Override the submission deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run one attempt to completion.
    ///
    /// Never fails: errors are folded into [`UploadOutcome::Failed`].
    pub async fn run(&self, job: &UploadJob) -> UploadOutcome {
        match self.try_run(job).await {
            Ok(outcome) => {
                info!(label = %job.label, file = %job.file.name(), "upload stored");
                outcome
            }
            Err(err) => {
                warn!(label = %job.label, file = %job.file.name(), error = %err, "upload failed");
                UploadOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    async fn try_run(&self, job: &UploadJob) -> Result<UploadOutcome, UploadError> {
        let image_base64 = encode_file(&job.file).await?;
        let request = UploadRequest {
            image_base64,
            label: job.label.clone(),
        };

        let response = tokio::time::timeout(self.deadline, self.api.submit_upload(&request))
            .await
            .map_err(|_| UploadError::Deadline {
                seconds: self.deadline.as_secs(),
            })??;

        if !response.success {
            return Err(UploadError::Rejected {
                label: response.label,
            });
        }
        Ok(UploadOutcome::Uploaded {
            s3_key: response.s3_key,
            label: response.label,
        })
    }
}

/// Read `file` and return its raw standard base64 encoding.
///
/// # Errors
/// Returns an error when the file cannot be read.
pub async fn encode_file(file: &CapturedFile) -> Result<String, CaptureError> {
    let bytes = file.read().await?;
    let data_url = to_data_url(&bytes);
    strip_data_url_prefix(&data_url).map(str::to_string)
}

/// Encode bytes as a `data:` URL with a sniffed mime type.
#[must_use]
pub fn to_data_url(bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        sniff_mime(bytes),
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Return the payload after the data-URL metadata prefix.
///
/// # Errors
/// Returns [`CaptureError::MalformedDataUrl`] when there is no `,` separator.
pub fn strip_data_url_prefix(data_url: &str) -> Result<&str, CaptureError> {
    data_url
        .split_once(',')
        .map(|(_, payload)| payload)
        .ok_or(CaptureError::MalformedDataUrl)
}

/// Mime type from the leading magic bytes.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        "image/jpeg"
    } else if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}
