use crate::helper::form_helpers::UploadedFile;
use actix_web::web;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

pub const MAX_IMAGE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// URL prefix under which stored images are served.
pub const UPLOAD_URL_PREFIX: &str = "uploads";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Rejected(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blocking file task was cancelled")]
    Blocking,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    /// Path recorded on the post, e.g. `uploads/<name>.png`.
    pub relative_path: String,
    pub disk_path: PathBuf,
}

/// Maps an accepted image MIME type to the extension used on disk.
/// The client's own extension is never trusted.
fn mime_to_safe_extension(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Reduces a client filename to a safe stem: last path component only,
/// restricted to ASCII alphanumerics, `-` and `_`.
pub fn sanitize_filename_stem(filename: &str) -> String {
    let last_component = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let stem = Path::new(last_component)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Size and content-type checks. Returns the extension to store under.
pub fn check_image(file: &UploadedFile) -> Result<&'static str, UploadError> {
    if file.size > MAX_IMAGE_SIZE_BYTES {
        return Err(UploadError::Rejected("file size exceeds maximum allowed size".to_string()));
    }

    let content_type = file.content_type.as_deref().unwrap_or("");
    mime_to_safe_extension(content_type)
        .ok_or_else(|| UploadError::Rejected(format!("unsupported file type: {}", content_type)))
}

/// Writes an already-checked image into `upload_dir`. A failed write leaves no file behind.
pub fn write_image(upload_dir: &Path, file: &UploadedFile, extension: &str) -> Result<StoredImage, UploadError> {
    fs::create_dir_all(upload_dir)?;

    let stored_name = format!("{}-{}.{}", Uuid::new_v4(), sanitize_filename_stem(&file.filename), extension);
    let disk_path = upload_dir.join(&stored_name);

    if let Err(e) = fs::write(&disk_path, &file.data) {
        let _ = fs::remove_file(&disk_path);
        return Err(e.into());
    }

    Ok(StoredImage {
        relative_path: format!("{}/{}", UPLOAD_URL_PREFIX, stored_name),
        disk_path,
    })
}

/// Validates and stores the optional image. `Ok(None)` when nothing was attached.
pub async fn save_image(upload_dir: &Path, file: Option<UploadedFile>) -> Result<Option<StoredImage>, UploadError> {
    let file = match file {
        Some(f) => f,
        None => return Ok(None),
    };
    let extension = check_image(&file)?;

    let upload_dir = upload_dir.to_path_buf();
    let stored = web::block(move || write_image(&upload_dir, &file, extension))
        .await
        .map_err(|_| UploadError::Blocking)??;

    log::info!("Stored uploaded image at {}", stored.disk_path.display());
    Ok(Some(stored))
}

/// Best-effort removal of an image whose post was never persisted.
pub async fn remove_stored_image(image: StoredImage) {
    let path = image.disk_path.clone();
    match web::block(move || fs::remove_file(&path)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("Failed to remove orphaned upload {}: {}", image.disk_path.display(), e),
        Err(_) => log::warn!("Cleanup task for {} was cancelled", image.disk_path.display()),
    }
}
