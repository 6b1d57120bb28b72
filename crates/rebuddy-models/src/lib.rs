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
//! Shared HTTP DTOs for the Recycling Buddy API.
//!
//! These types are used by the capture workflow and the CLI for request and
//! response encoding so the wire contract lives in one place. The label
//! catalog comes in two alternate shapes (flat list or grouped by category);
//! both decode into the single [`Catalog`] enum.
//!
//! # Design
//! - Keep field names case-exact with the API (`display_name`, `image_base64`, `s3_key`).
//! - Convert the wire response into a tagged catalog once, at the boundary.
//! - Validation reports issues instead of rejecting the catalog outright.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A single selectable label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LabelItem {
    /// Stable identifier sent to the upload endpoint.
    pub value: String,
    /// Human-readable name shown in the picker.
    pub display_name: String,
}

impl LabelItem {
    /// Build an item whose display name is derived from the value.
    #[must_use]
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let display_name = display_name_for(&value);
        Self {
            value,
            display_name,
        }
    }
}

/// A named group of label items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelCategory {
    /// Category heading; unique within a catalog.
    pub category: String,
    /// Items in display order.
    pub items: Vec<LabelItem>,
}

/// Response body of `GET /labels`.
///
/// The server emits exactly one of the two shapes per deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LabelsResponse {
    /// Categorised catalog.
    Grouped {
        /// Categories in display order.
        categories: Vec<LabelCategory>,
    },
    /// Flat catalog with an advertised item count.
    Flat {
        /// Items in display order.
        items: Vec<LabelItem>,
        /// Item count reported by the server.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_count: Option<usize>,
    },
}

/// The full set of selectable labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "LabelsResponse", into = "LabelsResponse")]
pub enum Catalog {
    /// Ungrouped list of items.
    Flat(Vec<LabelItem>),
    /// Items grouped under category headings.
    Grouped(Vec<LabelCategory>),
}

impl Default for Catalog {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl From<LabelsResponse> for Catalog {
    fn from(value: LabelsResponse) -> Self {
        match value {
            LabelsResponse::Flat { items, .. } => Self::Flat(items),
            LabelsResponse::Grouped { categories } => Self::Grouped(categories),
        }
    }
}

impl From<Catalog> for LabelsResponse {
    fn from(value: Catalog) -> Self {
        match value {
            Catalog::Flat(items) => {
                let total_count = Some(items.len());
                Self::Flat { items, total_count }
            }
            Catalog::Grouped(categories) => Self::Grouped { categories },
        }
    }
}

impl Catalog {
    /// Total number of items across all categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Self::Flat(items) => items.len(),
            Self::Grouped(categories) => categories.iter().map(|cat| cat.items.len()).sum(),
        }
    }

    /// Whether the catalog holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Iterate every item in catalog order.
    pub fn items(&self) -> Box<dyn Iterator<Item = &LabelItem> + '_> {
        match self {
            Self::Flat(items) => Box::new(items.iter()),
            Self::Grouped(categories) => Box::new(categories.iter().flat_map(|cat| cat.items.iter())),
        }
    }

    /// Look up an item by its value.
    #[must_use]
    pub fn find(&self, value: &str) -> Option<&LabelItem> {
        self.items().find(|item| item.value == value)
    }

    /// Report structural problems without rejecting the catalog.
    #[must_use]
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        if let Self::Grouped(categories) = self {
            let mut names = HashSet::new();
            for cat in categories {
                if !names.insert(cat.category.as_str()) {
                    issues.push(CatalogIssue::DuplicateCategory(cat.category.clone()));
                }
            }
        }
        let mut values = HashSet::new();
        for item in self.items() {
            if !values.insert(item.value.as_str()) {
                issues.push(CatalogIssue::DuplicateValue(item.value.clone()));
            }
            if !is_storage_safe(&item.value) {
                issues.push(CatalogIssue::UnsafeValue(item.value.clone()));
            }
        }
        issues
    }
}

/// Problems detected by [`Catalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// Two items share the same value.
    DuplicateValue(String),
    /// Two categories share the same name.
    DuplicateCategory(String),
    /// The value cannot be used as a storage key prefix.
    UnsafeValue(String),
}

impl Display for CatalogIssue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateValue(value) => write!(formatter, "duplicate label value '{value}'"),
            Self::DuplicateCategory(name) => write!(formatter, "duplicate category '{name}'"),
            Self::UnsafeValue(value) => {
                write!(formatter, "label value '{value}' is not storage-safe")
            }
        }
    }
}

/// Request body of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRequest {
    /// Raw standard base64 of the image bytes, without any data-URL prefix.
    pub image_base64: String,
    /// Chosen label value.
    pub label: String,
}

/// Response body of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    /// Whether the server stored the image.
    pub success: bool,
    /// Storage key assigned by the server.
    pub s3_key: String,
    /// Label the server recorded.
    pub label: String,
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Reported service status.
    pub status: String,
    /// Service version string.
    pub version: String,
}

/// Closed label set used by the two-button capture variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickLabel {
    /// The item goes in the recycling bin.
    Recyclable,
    /// The item does not.
    NotRecyclable,
}

impl QuickLabel {
    /// Every quick label, in button order.
    pub const ALL: [Self; 2] = [Self::Recyclable, Self::NotRecyclable];

    /// Wire value sent as the upload label.
    #[must_use]
    pub const fn as_value(self) -> &'static str {
        match self {
            Self::Recyclable => "recyclable",
            Self::NotRecyclable => "not_recyclable",
        }
    }

    /// Button caption.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Recyclable => "Recyclable",
            Self::NotRecyclable => "Not Recyclable",
        }
    }
}

/// Whether `value` is usable as a storage key prefix (`^[a-z][a-z0-9-]*$`).
#[must_use]
pub fn is_storage_safe(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|first| first.is_ascii_lowercase())
        && chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a title-cased display name from a hyphenated label value.
///
/// `"aluminum-can"` becomes `"Aluminum Can"`.
#[must_use]
pub fn display_name_for(value: &str) -> String {
    value
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
