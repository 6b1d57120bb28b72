//! Captured photo handles.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CaptureError;
use crate::preview::PreviewHandle;

/// Raw binary handle for a captured photo.
///
/// Content is only read when the upload pipeline encodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedFile {
    /// A file on disk.
    Path(PathBuf),
    /// Bytes already held in memory, e.g. straight from a camera buffer.
    Memory {
        /// Display name for logs and previews.
        name: String,
        /// Image content.
        bytes: Arc<[u8]>,
    },
}

impl CapturedFile {
    /// Reference a file on disk.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Wrap an in-memory buffer.
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Memory {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Short display name (file name for paths).
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |name| {
                    name.to_string_lossy().into_owned()
                }),
            Self::Memory { name, .. } => name.clone(),
        }
    }

    /// Filesystem path, when the photo lives on disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Memory { .. } => None,
        }
    }

    /// Read the full content.
    ///
    /// # Errors
    /// Returns [`CaptureError::FileRead`] when the file cannot be read.
    pub async fn read(&self) -> Result<Vec<u8>, CaptureError> {
        match self {
            Self::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| CaptureError::FileRead {
                        path: path.clone(),
                        source,
                    })
            }
            Self::Memory { bytes, .. } => Ok(bytes.to_vec()),
        }
    }
}

/// A captured file paired with its live preview resource.
///
/// Owned exclusively by the capture controller.
#[derive(Debug)]
pub struct CapturedAsset {
    pub(crate) file: CapturedFile,
    pub(crate) preview: PreviewHandle,
}

impl CapturedAsset {
    /// The captured file.
    #[must_use]
    pub const fn file(&self) -> &CapturedFile {
        &self.file
    }

    /// The preview resource for the file.
    #[must_use]
    pub const fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_files_read_back_their_bytes() {
        let file = CapturedFile::from_bytes("camera.jpg", vec![1_u8, 2, 3]);
        assert_eq!(file.name(), "camera.jpg");
        assert!(file.path().is_none());
        assert_eq!(file.read().await.expect("memory read"), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn path_files_read_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"\x89PNG").expect("write photo");

        let file = CapturedFile::from_path(&path);
        assert_eq!(file.name(), "photo.png");
        assert_eq!(file.read().await.expect("disk read"), b"\x89PNG".to_vec());
    }

    #[tokio::test]
    async fn missing_files_report_their_path() {
        let file = CapturedFile::from_path("/definitely/missing/photo.jpg");
        let err = file.read().await.expect_err("missing file");
        assert!(matches!(err, CaptureError::FileRead { ref path, .. } if path.ends_with("photo.jpg")));
    }
}
