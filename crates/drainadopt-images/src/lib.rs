//! Cloudinary image upload client for drainadopt.
//!
//! Drain photos are pushed to Cloudinary with an unsigned upload preset, so
//! the client only needs the cloud name and the preset name. A single
//! multipart request is sent per file.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod upload;

use thiserror::Error;

pub use upload::{CloudinaryClient, UploadedImage, DEFAULT_FOLDER};

/// Errors returned by the image host.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Cloud name or upload preset is missing.
    #[error("image host is not configured: missing {0}")]
    NotConfigured(&'static str),

    /// The HTTP request could not be completed.
    #[error("image upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The host rejected the upload.
    #[error("image host rejected the upload ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the host.
        message: String,
    },
}

/// Result type for image host operations.
pub type Result<T> = std::result::Result<T, ImageError>;

impl ImageError {
    /// Check if this error means the client was never configured.
    #[must_use]
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_display() {
        let err = ImageError::NotConfigured("upload preset");
        assert!(err.is_not_configured());
        assert_eq!(
            err.to_string(),
            "image host is not configured: missing upload preset"
        );
    }

    #[test]
    fn test_rejected_display() {
        let err = ImageError::Rejected {
            status: 400,
            message: "Upload preset not found".to_string(),
        };
        assert!(!err.is_not_configured());
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("Upload preset not found"));
    }
}
