#![forbid(unsafe_code)]
#![deny(unreachable_pub, clippy::all, clippy::pedantic, missing_docs)]
//! Shared test fixtures for the Recycling Buddy workspace.

pub mod fixtures;

pub use fixtures::{
    JPEG_HEADER, PNG_HEADER, grouped_catalog, household_catalog, jpeg_bytes, png_bytes,
    single_item_catalog,
};
