//! Preview resources for captured photos.
//!
//! # Design
//! - A preview is an addressable handle to the captured content, distinct from the file.
//! - Handles are not `Clone`; releasing consumes the handle, so a handle is released at most once.
//! - The store is a trait so embedders can back previews with real display resources.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::asset::CapturedFile;

/// Displayable handle referencing captured content.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    id: Uuid,
}

impl PreviewHandle {
    /// Mint a handle with a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Stable identifier of this handle.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Addressable form, `preview:<uuid>`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("preview:{}", self.id)
    }
}

impl Display for PreviewHandle {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "preview:{}", self.id)
    }
}

/// Creates and releases preview resources.
pub trait PreviewStore {
    /// Acquire a preview for `file`.
    fn create(&mut self, file: &CapturedFile) -> PreviewHandle;
    /// Release a preview previously returned by [`PreviewStore::create`].
    fn release(&mut self, handle: PreviewHandle);
}

/// In-memory preview store that tracks live handles.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<Uuid, CapturedFile>,
    created: usize,
    released: usize,
}

impl PreviewRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The file a live handle refers to.
    #[must_use]
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<&CapturedFile> {
        self.live.get(&handle.id)
    }

    /// Number of handles not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of handles ever created.
    #[must_use]
    pub const fn created_count(&self) -> usize {
        self.created
    }

    /// Number of handles released.
    #[must_use]
    pub const fn released_count(&self) -> usize {
        self.released
    }
}

impl PreviewStore for PreviewRegistry {
    fn create(&mut self, file: &CapturedFile) -> PreviewHandle {
        let handle = PreviewHandle::generate();
        self.live.insert(handle.id, file.clone());
        self.created += 1;
        debug!(preview = %handle, file = %file.name(), "preview created");
        handle
    }

    fn release(&mut self, handle: PreviewHandle) {
        if self.live.remove(&handle.id).is_some() {
            self.released += 1;
            debug!(preview = %handle, "preview released");
        } else {
            warn!(preview = %handle, "release of unknown preview ignored");
        }
    }
}
