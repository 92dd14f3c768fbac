//! Cloudinary signed image uploads.
//!
//! Uploads go to the `hridved_uploads` folder with a public id of
//! `{file stem}-{unix millis}`. The request is signed with
//! `sha256hex(sorted_params + api_secret)`.

use std::path::Path;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CloudinaryConfig;

pub const UPLOAD_FOLDER: &str = "hridved_uploads";
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum UploadError {
    /// The file is not a JPEG or PNG.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// HTTP request failed.
    #[error("Cloudinary request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Cloudinary rejected the upload.
    #[error("Cloudinary returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Cloudinary upload client.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("cloud_name", &self.cloud_name)
            .field("api_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CloudinaryClient {
    #[must_use]
    pub fn new(client: Client, config: &CloudinaryConfig) -> Self {
        Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    /// Upload one image and return its HTTPS URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` for anything but jpg/jpeg/png.
    /// Returns `UploadError::Api` if Cloudinary rejects the upload.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        let extension = image_extension(file_name)?;
        let public_id = public_id(file_name, chrono::Utc::now().timestamp_millis());
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let signature = sign(
            &[
                ("folder", UPLOAD_FOLDER),
                ("public_id", &public_id),
                ("timestamp", &timestamp),
            ],
            self.api_secret.expose_secret(),
        );

        let mime = if extension == "png" { "image/png" } else { "image/jpeg" };
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("public_id", public_id)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                self.cloud_name
            ))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Cloudinary upload failed");
            return Err(UploadError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        debug!(url = %uploaded.secure_url, "Image uploaded");
        Ok(uploaded.secure_url)
    }
}

/// Lowercased extension of an accepted image file name.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` for anything but jpg/jpeg/png.
pub fn image_extension(file_name: &str) -> Result<String, UploadError> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| UploadError::UnsupportedType(file_name.to_string()))
}

/// `{file stem}-{millis}`, the stem reduced to URL-safe characters.
fn public_id(file_name: &str, millis: i64) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{stem}-{millis}")
}

/// Cloudinary request signature over `key=value` pairs sorted by key.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("neem.JPG").unwrap(), "jpg");
        assert_eq!(image_extension("a.b.jpeg").unwrap(), "jpeg");
        assert_eq!(image_extension("logo.png").unwrap(), "png");
        assert!(image_extension("anim.gif").is_err());
        assert!(image_extension("noext").is_err());
    }

    #[test]
    fn test_public_id() {
        assert_eq!(public_id("Neem Oil.jpg", 1_700_000_000_000), "Neem_Oil-1700000000000");
        assert_eq!(public_id("tulsi.png", 5), "tulsi-5");
    }

    #[test]
    fn test_sign_sorts_params() {
        let a = sign(&[("timestamp", "1"), ("folder", "f")], "s");
        let b = sign(&[("folder", "f"), ("timestamp", "1")], "s");
        assert_eq!(a, b);

        let mut hasher = Sha256::new();
        hasher.update(b"folder=f&timestamp=1s");
        assert_eq!(a, hex::encode(hasher.finalize()));
    }
}
