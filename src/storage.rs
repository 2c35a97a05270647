// SPDX-License-Identifier: MPL-2.0

//! Photo store collaborator
//!
//! The capture controller asks the store for authorization before every
//! write and never writes after a denial. The store owns the persisted
//! encoding format.

use crate::constants::naming;
use crate::errors::{StorageError, StorageResult};
use crate::pipelines::photo::PhotoEncoder;
use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use image::RgbaImage;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Answer to a storage authorization request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied,
}

/// Where a photo ended up and how large it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPhoto {
    pub location: PathBuf,
    pub bytes: usize,
}

/// Storage and authorization collaborator
pub trait PhotoStore: Send + Sync {
    /// Ask for permission to add a photo to the library
    fn request_authorization(&self) -> BoxFuture<'_, Authorization>;

    /// Encode and persist a finished photo
    ///
    /// Only called after [`Self::request_authorization`] returned
    /// [`Authorization::Granted`].
    fn write(
        &self,
        image: RgbaImage,
        captured_at: DateTime<Local>,
    ) -> BoxFuture<'_, StorageResult<SavedPhoto>>;
}

/// Photo store backed by a local directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    directory: PathBuf,
    encoder: PhotoEncoder,
}

impl DirectoryStore {
    pub fn new(directory: impl Into<PathBuf>, encoder: PhotoEncoder) -> Self {
        Self {
            directory: directory.into(),
            encoder,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn encoder(&self) -> PhotoEncoder {
        self.encoder
    }
}

impl PhotoStore for DirectoryStore {
    fn request_authorization(&self) -> BoxFuture<'_, Authorization> {
        Box::pin(async move {
            let directory = self.directory.clone();
            let result = tokio::task::spawn_blocking(move || authorize_directory(&directory)).await;

            match result {
                Ok(Ok(())) => {
                    debug!(path = %self.directory.display(), "Photo directory authorized");
                    Authorization::Granted
                }
                Ok(Err(e)) => {
                    warn!(path = %self.directory.display(), error = %e, "Photo directory not writable");
                    Authorization::Denied
                }
                Err(e) => {
                    warn!(error = %e, "Authorization task failed");
                    Authorization::Denied
                }
            }
        })
    }

    fn write(
        &self,
        image: RgbaImage,
        captured_at: DateTime<Local>,
    ) -> BoxFuture<'_, StorageResult<SavedPhoto>> {
        Box::pin(async move {
            let directory = self.directory.clone();
            let encoder = self.encoder;

            // Encoding and file I/O are both blocking
            tokio::task::spawn_blocking(move || {
                let encoded = encoder.encode(&image)?;
                drop(image);

                let path = create_unique_photo(
                    &directory,
                    &captured_at,
                    encoded.format.extension(),
                    &encoded.data,
                )?;

                info!(path = %path.display(), bytes = encoded.data.len(), "Photo saved successfully");
                Ok(SavedPhoto {
                    location: path,
                    bytes: encoded.data.len(),
                })
            })
            .await
            .map_err(|e| StorageError::Io(format!("Save task error: {}", e)))?
        })
    }
}

fn authorize_directory(directory: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(directory)?;
    let metadata = std::fs::metadata(directory)?;
    if metadata.permissions().readonly() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "directory is read-only",
        ));
    }
    Ok(())
}

/// `IMG_<timestamp>.<ext>`, or `IMG_<timestamp>_<N>.<ext>` for `N > 0`
pub fn photo_file_name(captured_at: &DateTime<Local>, extension: &str, counter: u32) -> String {
    let stamp = captured_at.format(naming::PHOTO_TIMESTAMP_FORMAT);
    if counter == 0 {
        format!("{}{}.{}", naming::PHOTO_PREFIX, stamp, extension)
    } else {
        format!("{}{}_{}.{}", naming::PHOTO_PREFIX, stamp, counter, extension)
    }
}

/// Write `data` to the first free photo name in `directory`
///
/// Each candidate is opened with `create_new`, so an existing file is never
/// replaced even if it appears after the name was chosen.
pub fn create_unique_photo(
    directory: &Path,
    captured_at: &DateTime<Local>,
    extension: &str,
    data: &[u8],
) -> std::io::Result<PathBuf> {
    let mut counter = 0u32;
    loop {
        let path = directory.join(photo_file_name(captured_at, extension, counter));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                info!(path = %path.display(), "Saving photo");
                file.write_all(data)?;
                file.sync_all()?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Photo name taken, trying next suffix");
                counter = counter.checked_add(1).ok_or_else(|| {
                    std::io::Error::new(ErrorKind::AlreadyExists, "no free photo name")
                })?;
            }
            Err(e) => return Err(e),
        }
    }
}
