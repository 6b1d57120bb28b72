//! # Design
//!
//! - One error enum per concern: transport, local file access, upload, configuration, workflow.
//! - Messages are the user-facing text; callers surface them verbatim as the component error.
//! - Preserve source errors so logs can carry the full chain.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::controller::Phase;

/// Failures talking to the labels API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// `GET /labels` answered with a non-success status.
    #[error("Failed to fetch labels ({status})")]
    CatalogStatus {
        /// HTTP status code.
        status: u16,
    },
    /// `POST /upload` answered with a non-success status.
    #[error("Upload failed ({status}): {body}")]
    UploadStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response text.
        body: String,
    },
    /// `GET /health` answered with a non-success status.
    #[error("Health check failed ({status})")]
    HealthStatus {
        /// HTTP status code.
        status: u16,
    },
    /// The request did not complete within the client timeout.
    #[error("request to {endpoint} timed out")]
    Timeout {
        /// Endpoint path.
        endpoint: &'static str,
    },
    /// The request could not be sent or the connection failed.
    #[error("request to {endpoint} failed: {source}")]
    Request {
        /// Endpoint path.
        endpoint: &'static str,
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// The response body did not match the expected shape.
    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        /// Endpoint path.
        endpoint: &'static str,
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// The endpoint URL could not be derived from the base URL.
    #[error("invalid endpoint URL for {endpoint}")]
    Endpoint {
        /// Endpoint path.
        endpoint: &'static str,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Underlying client error.
        source: reqwest::Error,
    },
}

/// Failures reading a captured file.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The file could not be read from disk.
    #[error("Failed to read file '{}'", path.display())]
    FileRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The encoded content lacked the data-URL separator.
    #[error("Failed to read file: encoded content has no payload")]
    MalformedDataUrl,
}

/// Failures of a single upload attempt.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Reading or encoding the file failed.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The transport call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// No response arrived before the pipeline deadline.
    #[error("Upload failed: no response within {seconds}s")]
    Deadline {
        /// Deadline in whole seconds.
        seconds: u64,
    },
    /// The server answered but reported that nothing was stored.
    #[error("Upload rejected by server for label '{label}'")]
    Rejected {
        /// Label echoed by the server.
        label: String,
    },
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL did not parse.
    #[error("invalid API URL '{value}'")]
    InvalidUrl {
        /// Offending value.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The timeout was not a positive whole number of seconds.
    #[error("invalid timeout '{value}': expected a positive number of seconds")]
    InvalidTimeout {
        /// Offending value.
        value: String,
    },
}

/// Triggers rejected by the capture controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The trigger is not defined for the current phase.
    #[error("cannot {trigger} during the {phase} phase")]
    InvalidTransition {
        /// Name of the rejected trigger.
        trigger: &'static str,
        /// Phase the controller was in.
        phase: Phase,
    },
    /// A label was chosen without a captured photo.
    #[error("no captured photo to label")]
    MissingAsset,
    /// The chosen label was empty.
    #[error("label must not be empty")]
    EmptyLabel,
}
