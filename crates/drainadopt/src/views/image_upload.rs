//! Photo picker with instant preview and upload to the image host.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ui::Notifier;
use crate::upload::{validate_image, ImageHost, SelectedFile};

/// Shown when no image host is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Image upload is not configured. Set images.cloud_name and images.upload_preset.";

/// Receives the hosted URL after an upload, or `""` after removal.
pub type ImageChanged = Box<dyn FnMut(&str) + Send>;

/// What happened to a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The view was disabled or busy.
    Ignored,
    /// The file failed validation; nothing was sent.
    Rejected(String),
    /// Uploaded; the hosted URL.
    Uploaded(String),
    /// The upload did not happen or did not succeed.
    Failed(String),
}

/// The image upload view.
pub struct ImageUpload {
    original_url: String,
    preview: Option<String>,
    uploading: bool,
    disabled: bool,
    host: Option<Arc<dyn ImageHost>>,
    notifier: Arc<dyn Notifier>,
    on_change: ImageChanged,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("original_url", &self.original_url)
            .field("preview", &self.preview.as_deref().map(preview_label))
            .field("uploading", &self.uploading)
            .field("disabled", &self.disabled)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl ImageUpload {
    /// Create the view around the current image URL (empty for none).
    pub fn new(
        current_url: impl Into<String>,
        host: Option<Arc<dyn ImageHost>>,
        notifier: Arc<dyn Notifier>,
        on_change: ImageChanged,
    ) -> Self {
        let original_url = current_url.into();
        let preview = (!original_url.is_empty()).then(|| original_url.clone());
        Self {
            original_url,
            preview,
            uploading: false,
            disabled: false,
            host,
            notifier,
            on_change,
        }
    }

    /// Set the disabled flag.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Change the disabled flag.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Check if the view ignores input.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Check if an upload is in flight.
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// The image currently shown.
    #[must_use]
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// The parent changed the current image URL.
    pub fn set_image_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !url.is_empty() {
            self.preview = Some(url.clone());
        }
        self.original_url = url;
    }

    /// Validate and upload a picked file.
    pub async fn select_file(&mut self, file: SelectedFile) -> SelectOutcome {
        if self.disabled || self.uploading {
            debug!(name = %file.name, "File selection ignored");
            return SelectOutcome::Ignored;
        }

        if let Err(e) = validate_image(&file) {
            let message = e.user_message();
            self.notifier.error(&message);
            return SelectOutcome::Rejected(message);
        }

        self.preview = Some(file.data_url());

        let Some(host) = self.host.clone() else {
            warn!("Image upload requested but no image host is configured");
            self.revert_preview();
            self.notifier.error(NOT_CONFIGURED_MESSAGE);
            return SelectOutcome::Failed(NOT_CONFIGURED_MESSAGE.to_string());
        };

        self.uploading = true;
        let result = host.upload(&file).await;
        self.uploading = false;

        match result {
            Ok(image) => {
                info!(url = %image.secure_url, size = file.size(), "Image uploaded");
                self.preview = Some(image.secure_url.clone());
                (self.on_change)(&image.secure_url);
                self.notifier.success("Image uploaded successfully!");
                SelectOutcome::Uploaded(image.secure_url)
            }
            Err(e) => {
                warn!("Image upload failed: {e}");
                self.revert_preview();
                let message = "Failed to upload image. Please try again.";
                self.notifier.error(message);
                SelectOutcome::Failed(message.to_string())
            }
        }
    }

    /// Clear the image.
    pub fn remove(&mut self) {
        if self.disabled || self.uploading {
            return;
        }
        self.preview = None;
        (self.on_change)("");
    }

    fn revert_preview(&mut self) {
        self.preview = (!self.original_url.is_empty()).then(|| self.original_url.clone());
    }

    /// Text rendering of the view.
    #[must_use]
    pub fn render(&self) -> String {
        let image = self
            .preview
            .as_deref()
            .map_or_else(|| "(no image)".to_string(), preview_label);
        if self.uploading {
            format!("{image}  [uploading...]")
        } else {
            image
        }
    }
}

/// `data:` previews are long; show only their type.
fn preview_label(url: &str) -> String {
    match url.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or_default();
            format!("(local preview, {mime})")
        }
        None => url.to_string(),
    }
}
