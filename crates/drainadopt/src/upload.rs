//! Image selection, validation, and the image host seam.

use std::path::Path;

use async_trait::async_trait;
use base64::prelude::*;
use drainadopt_images::CloudinaryClient;
use tracing::debug;

use crate::config::ImagesConfig;
use crate::error::{Error, Result};

pub use drainadopt_images::UploadedImage;

/// Largest image accepted for upload: 10 MiB.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// A file the user picked.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name, without directories.
    pub name: String,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl SelectedFile {
    /// Wrap in-memory file contents.
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| Error::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

        debug!(name, size = bytes.len(), "Read file for upload");
        Ok(Self::new(name, mime_from_path(path), bytes))
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check if the MIME type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Inline `data:` URL of the contents, used as an instant preview.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}

/// Guess a MIME type from a file extension.
#[must_use]
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Check a file before anything is sent over the network.
///
/// # Errors
///
/// Returns [`Error::InvalidFile`] for non-image types and files over
/// [`MAX_IMAGE_BYTES`].
pub fn validate_image(file: &SelectedFile) -> Result<()> {
    if !file.is_image() {
        return Err(Error::invalid_file("Please select an image file"));
    }
    if file.size() > MAX_IMAGE_BYTES {
        return Err(Error::invalid_file("Image size must be less than 10MB"));
    }
    Ok(())
}

/// Somewhere to host uploaded images.
#[async_trait]
pub trait ImageHost: Send + Sync + std::fmt::Debug {
    /// Upload one file and return where it is hosted.
    async fn upload(&self, file: &SelectedFile) -> Result<UploadedImage>;
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadedImage> {
        Ok(CloudinaryClient::upload(self, &file.name, &file.mime_type, file.bytes.clone()).await?)
    }
}

/// Build the Cloudinary client described by `config`.
///
/// Returns `Ok(None)` when the cloud name or upload preset is missing or
/// blank.
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub fn cloudinary_from_config(
    config: &ImagesConfig,
    http: reqwest::Client,
) -> Result<Option<CloudinaryClient>> {
    let (Some(cloud_name), Some(preset)) = (&config.cloud_name, &config.upload_preset) else {
        return Ok(None);
    };
    match CloudinaryClient::new(cloud_name.clone(), preset.clone(), http) {
        Ok(client) => Ok(Some(client.with_folder(config.folder.clone()))),
        Err(e) if e.is_not_configured() => {
            debug!("Image host left unconfigured: {e}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("drain.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("a/b/c.png")), "image/png");
        assert_eq!(mime_from_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            mime_from_path(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_validate_accepts_image() {
        let file = SelectedFile::new("a.png", "image/png", vec![0; 1024]);
        assert!(validate_image(&file).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_image() {
        let file = SelectedFile::new("a.pdf", "application/pdf", vec![0; 10]);
        let err = validate_image(&file).unwrap_err();
        assert_eq!(err.user_message(), "Please select an image file");
    }

    #[test]
    fn test_validate_size_boundary() {
        let at_limit = SelectedFile::new("a.jpg", "image/jpeg", vec![0; 10 * 1024 * 1024]);
        assert!(validate_image(&at_limit).is_ok());

        let over = SelectedFile::new("a.jpg", "image/jpeg", vec![0; 10 * 1024 * 1024 + 1]);
        let err = validate_image(&over).unwrap_err();
        assert_eq!(err.user_message(), "Image size must be less than 10MB");
    }

    #[test]
    fn test_data_url() {
        let file = SelectedFile::new("a.gif", "image/gif", b"GIF89a".to_vec());
        assert_eq!(file.data_url(), "data:image/gif;base64,R0lGODlh");
    }

    #[test]
    fn test_debug_hides_bytes() {
        let file = SelectedFile::new("a.gif", "image/gif", vec![1, 2, 3]);
        let debug_str = format!("{file:?}");
        assert!(debug_str.contains("size: 3"));
        assert!(!debug_str.contains("[1, 2, 3]"));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = SelectedFile::from_path("/nonexistent/drain.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let path = std::env::temp_dir().join(format!("drainadopt-test-{}.png", std::process::id()));
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G']).await.unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size(), 4);
        assert!(file.name.ends_with(".png"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[test]
    fn test_cloudinary_from_config_unconfigured() {
        let client = cloudinary_from_config(&ImagesConfig::default(), reqwest::Client::new())
            .unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_cloudinary_from_config_blank_is_unconfigured() {
        let config = ImagesConfig {
            cloud_name: Some("demo".to_string()),
            upload_preset: Some("  ".to_string()),
            ..ImagesConfig::default()
        };
        let client = cloudinary_from_config(&config, reqwest::Client::new()).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_cloudinary_from_config_configured() {
        let config = ImagesConfig {
            cloud_name: Some("demo".to_string()),
            upload_preset: Some("unsigned".to_string()),
            folder: "city/drains".to_string(),
        };
        let client = cloudinary_from_config(&config, reqwest::Client::new())
            .unwrap()
            .unwrap();
        assert_eq!(client.folder(), "city/drains");
        assert!(client.upload_url().contains("/demo/image/upload"));
    }
}
