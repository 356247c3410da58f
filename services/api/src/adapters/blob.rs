//! services/api/src/adapters/blob.rs
//!
//! This module contains the filesystem blob store adapter, the concrete
//! implementation of the `BlobStore` port from the `core` crate. Uploaded
//! documents live under one directory per module (`<root>/<module_id>/<filename>`);
//! the directory listing is the only manifest.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use studyai_core::ports::{BlobStore, StorageError};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A blob store adapter that persists uploads beneath a single root directory.
#[derive(Clone)]
pub struct FsBlobAdapter {
    root: PathBuf,
}

impl FsBlobAdapter {
    /// Creates a new `FsBlobAdapter` rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Reduces a client-supplied name to its final path component. Anything that
/// reduces to nothing (empty names, `..`, trailing separators) comes back as
/// an empty string and must be rejected by the caller; uploads can never
/// address a path outside the storage root.
fn sanitize_component(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|c| c.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn invalid_name() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "name reduces to an empty path component",
    )
}

//=========================================================================================
// `BlobStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl BlobStore for FsBlobAdapter {
    /// Writes one uploaded document, creating the module directory on demand.
    /// A repeated filename within the same module overwrites (last write wins).
    async fn put(
        &self,
        module_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        let dir_name = sanitize_component(module_id);
        let file_name = sanitize_component(filename);
        if dir_name.is_empty() || file_name.is_empty() {
            return Err(StorageError::Write {
                module_id: module_id.to_string(),
                filename: filename.to_string(),
                source: invalid_name(),
            });
        }

        let dir = self.root.join(&dir_name);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Write {
                module_id: module_id.to_string(),
                filename: filename.to_string(),
                source: e,
            })?;

        tokio::fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|e| StorageError::Write {
                module_id: module_id.to_string(),
                filename: filename.to_string(),
                source: e,
            })
    }

    /// Lists the files stored for a module, sorted lexically so callers see a
    /// deterministic order. A module with no directory yet is an error, not an
    /// empty listing.
    async fn list_files(&self, module_id: &str) -> Result<Vec<String>, StorageError> {
        let dir_name = sanitize_component(module_id);
        if dir_name.is_empty() {
            return Err(StorageError::List {
                module_id: module_id.to_string(),
                source: invalid_name(),
            });
        }

        let dir = self.root.join(&dir_name);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StorageError::List {
                module_id: module_id.to_string(),
                source: e,
            })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StorageError::List {
            module_id: module_id.to_string(),
            source: e,
        })? {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
