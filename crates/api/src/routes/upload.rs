//! Image upload routes (`/api/upload`, admin).

use axum::extract::{Multipart, State, multipart::MultipartError};

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::middleware::RequireAdmin;
use crate::services::cloudinary::{CloudinaryClient, image_extension};
use crate::state::AppState;

/// Most files accepted by `/multiple`.
const MAX_FILES: usize = 5;

/// A file pulled out of the multipart body.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

fn cloudinary(state: &AppState) -> Result<&CloudinaryClient> {
    state
        .cloudinary()
        .ok_or_else(|| AppError::ServiceUnavailable("Cloudinary is not configured".to_string()))
}

fn bad_multipart(e: MultipartError) -> AppError {
    tracing::debug!(error = %e, "Malformed multipart body");
    AppError::BadRequest("Invalid upload".to_string())
}

/// Collect every file sent under `field`, rejecting non-images up front.
async fn files_named(multipart: &mut Multipart, field: &str, max: usize) -> Result<Vec<Upload>> {
    let mut uploads = Vec::new();
    while let Some(part) = multipart.next_field().await.map_err(bad_multipart)? {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().unwrap_or_default().to_string();
        if image_extension(&file_name).is_err() {
            return Err(AppError::BadRequest("Images only! (jpg, jpeg, png)".to_string()));
        }
        if uploads.len() == max {
            return Err(AppError::BadRequest(format!(
                "You can upload at most {max} images"
            )));
        }
        let bytes = part.bytes().await.map_err(bad_multipart)?;
        if !bytes.is_empty() {
            uploads.push(Upload {
                file_name,
                bytes: bytes.to_vec(),
            });
        }
    }
    Ok(uploads)
}

/// POST /api/upload
///
/// Returns the uploaded image URL as a JSON string.
///
/// # Errors
///
/// Returns 400 "No image uploaded" or for a non-image file, 502 if
/// Cloudinary rejects the upload.
pub async fn single(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<AppJson<String>> {
    let client = cloudinary(&state)?;
    let Some(upload) = files_named(&mut multipart, "image", 1).await?.pop() else {
        return Err(AppError::BadRequest("No image uploaded".to_string()));
    };

    let url = client.upload_image(&upload.file_name, upload.bytes).await?;
    tracing::info!(admin_id = %admin.id, %url, "Image uploaded");
    Ok(AppJson(url))
}

/// POST /api/upload/multiple
///
/// # Errors
///
/// Returns 400 "No images uploaded", or when more than five files are sent.
pub async fn multiple(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<AppJson<Vec<String>>> {
    let client = cloudinary(&state)?;
    let uploads = files_named(&mut multipart, "images", MAX_FILES).await?;
    if uploads.is_empty() {
        return Err(AppError::BadRequest("No images uploaded".to_string()));
    }

    let mut urls = Vec::with_capacity(uploads.len());
    for upload in uploads {
        urls.push(client.upload_image(&upload.file_name, upload.bytes).await?);
    }
    tracing::info!(admin_id = %admin.id, count = urls.len(), "Images uploaded");
    Ok(AppJson(urls))
}
