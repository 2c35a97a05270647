// SPDX-License-Identifier: MPL-2.0

//! Error types for capture, storage and configuration
//!
//! Pipeline stages do not appear here: a filter or overlay that cannot
//! produce output degrades locally and never surfaces an error.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type for capture device operations
pub type BackendResult<T> = Result<T, CaptureError>;

/// Result type for photo store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Capture device errors
    Capture(CaptureError),
    /// Photo store errors
    Storage(StorageError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Errors reported by the capture device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Device returned without any usable pixel data
    NoData,
    /// Device reported a failure
    Device(String),
    /// Device did not answer within the configured capture timeout
    Timeout,
    /// I/O failure while reading from the device
    Io(String),
}

/// Errors reported by the photo store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Image could not be encoded into the store's format
    Encoding(String),
    /// Write failed
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoData => write!(f, "Device returned no image data"),
            CaptureError::Device(msg) => write!(f, "Device error: {}", msg),
            CaptureError::Timeout => write!(f, "Capture timed out"),
            CaptureError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Encoding(msg) => write!(f, "Encoding failed: {}", msg),
            StorageError::Io(msg) => write!(f, "Write failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for StorageError {}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err.to_string())
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Device(err.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<image::ImageError> for StorageError {
    fn from(err: image::ImageError) -> Self {
        StorageError::Encoding(err.to_string())
    }
}
