use crate::helper::upload_helpers::UploadError;
use crate::models::db_operations::posts_db_operations::DbError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers. Client errors carry their message to
/// the caller; everything else is logged and answered with a generic message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(DbError),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Upload I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored file read error: {0}")]
    FileRead(std::io::Error),
    #[error("Sitemap serialization error: {0}")]
    Sitemap(#[from] quick_xml::DeError),
}

impl ApiError {
    fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Storage(_) | ApiError::Pool(_) => "Database error".to_string(),
            ApiError::Io(_) => "Failed to store uploaded file".to_string(),
            ApiError::FileRead(_) => "Failed to read file".to_string(),
            ApiError::Sitemap(_) => "Could not generate sitemap".to_string(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => ApiError::NotFound("Blog post not found".to_string()),
            other => ApiError::Storage(other),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Rejected(reason) => ApiError::BadRequest(format!("Invalid file: {}", reason)),
            UploadError::Io(e) => ApiError::Io(e),
            UploadError::Blocking => ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "blocking file task was cancelled",
            )),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_)
            | ApiError::Pool(_)
            | ApiError::Io(_)
            | ApiError::FileRead(_)
            | ApiError::Sitemap(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.public_message() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_from_store_maps_to_404() {
        let err: ApiError = DbError::NotFound("slug".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Blog post not found");
    }

    #[test]
    fn storage_errors_hide_internals() {
        let err: ApiError = DbError::Rusqlite(rusqlite::Error::QueryReturnedNoRows).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Database error");
    }

    #[test]
    fn rejected_upload_is_a_client_error() {
        let err: ApiError = UploadError::Rejected("unsupported file type: text/plain".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid file: unsupported file type: text/plain");
    }

    #[test]
    fn read_and_write_failures_are_reported_apart() {
        let write: ApiError = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        let read = ApiError::FileRead(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(write.public_message(), "Failed to store uploaded file");
        assert_eq!(read.public_message(), "Failed to read file");
        assert_eq!(read.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
