//! Unsigned uploads to Cloudinary.

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{ImageError, Result};

/// Folder drain photos are filed under.
pub const DEFAULT_FOLDER: &str = "drains";

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// A successfully hosted image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    /// HTTPS URL of the hosted image.
    pub secure_url: String,
    /// Cloudinary public identifier.
    #[serde(default)]
    pub public_id: Option<String>,
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
    /// Stored format, e.g. `jpg`.
    #[serde(default)]
    pub format: Option<String>,
    /// Stored size in bytes.
    #[serde(default)]
    pub bytes: Option<u64>,
    /// When the host stored the image.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for one Cloudinary cloud and upload preset.
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    cloud_name: String,
    upload_preset: String,
    folder: String,
    http: reqwest::Client,
}

impl CloudinaryClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::NotConfigured`] if either identifier is blank.
    pub fn new(
        cloud_name: impl Into<String>,
        upload_preset: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self> {
        let cloud_name = cloud_name.into();
        let upload_preset = upload_preset.into();
        if cloud_name.trim().is_empty() {
            return Err(ImageError::NotConfigured("cloud name"));
        }
        if upload_preset.trim().is_empty() {
            return Err(ImageError::NotConfigured("upload preset"));
        }

        Ok(Self {
            cloud_name,
            upload_preset,
            folder: DEFAULT_FOLDER.to_string(),
            http,
        })
    }

    /// File uploads under a different folder.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// The endpoint uploads are posted to.
    #[must_use]
    pub fn upload_url(&self) -> String {
        format!("{API_BASE}/{}/image/upload", self.cloud_name)
    }

    /// The folder uploads are filed under.
    #[must_use]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Build the multipart upload request.
    ///
    /// # Errors
    ///
    /// Returns an error if `mime_type` is not a valid MIME string.
    pub fn upload_request(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<reqwest::RequestBuilder> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone());

        Ok(self.http.post(self.upload_url()).multipart(form))
    }

    /// Upload one image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Rejected`] if the host refuses the file, or an
    /// HTTP error if the request fails.
    pub async fn upload(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage> {
        let size = bytes.len();
        debug!(file_name, mime_type, size, "Uploading image");

        let response = self
            .upload_request(file_name, mime_type, bytes)?
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ImageError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        let image: UploadedImage = response.json().await?;
        info!(url = %image.secure_url, "Image uploaded");
        Ok(image)
    }
}

fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| "Upload failed".to_string())
}
