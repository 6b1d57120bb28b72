#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Capture, label, and upload workflow for the Recycling Buddy client.
//!
//! # Design
//! - [`CaptureController`] owns the phase machine and the captured photo's preview.
//! - [`CatalogLoader`] fetches the label catalog once and ignores late results after deactivation.
//! - [`ItemPicker`] filters and drills into the catalog without any I/O.
//! - [`UploadPipeline`] encodes and submits a photo, folding every failure into an outcome.
//! - [`LabelApi`] is the seam to the server; [`HttpTransport`] is the reqwest implementation.

pub mod asset;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod picker;
pub mod preview;
pub mod transport;
pub mod upload;

#[cfg(test)]
mod testing;

pub use asset::{CapturedAsset, CapturedFile};
pub use catalog::{CatalogLoader, CatalogState, DEFAULT_CATALOG_DEADLINE, LoadScope, ScopeTicket};
pub use config::TransportConfig;
pub use controller::{CaptureController, Phase};
pub use error::{CaptureError, ConfigError, TransitionError, TransportError, UploadError};
pub use picker::{CategorySummary, ItemPicker, PickerView, filter_catalog};
pub use preview::{PreviewHandle, PreviewRegistry, PreviewStore};
pub use transport::{HttpTransport, LabelApi};
pub use upload::{DEFAULT_UPLOAD_DEADLINE, UploadJob, UploadOutcome, UploadPipeline};
