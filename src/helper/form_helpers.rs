use actix_multipart::Multipart;
use actix_web::web::BytesMut;
use futures_util::StreamExt;
use std::collections::HashMap;

use crate::helper::upload_helpers::MAX_IMAGE_SIZE_BYTES;

/// The form part that carries the optional image.
pub const IMAGE_FIELD: &str = "image";

/// Upper bound on the combined size of all text parts in one submission.
pub const MAX_TEXT_FIELDS_BYTES: usize = 10 * 1024 * 1024;

/// A file part as received from the client, before any validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    /// Bytes actually received, never more than the size limit plus one.
    pub data: Vec<u8>,
    /// Full size declared by the stream, even when `data` was cut short.
    pub size: u64,
}

/// Text fields keep every submitted value so repeated fields (tags) can be flattened.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    pub fields: HashMap<String, Vec<String>>,
    pub image: Option<UploadedFile>,
}

impl SubmittedForm {
    /// First value of a field, trimmed; empty when absent.
    pub fn first(&self, name: &str) -> &str {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.trim())
            .unwrap_or("")
    }

    pub fn all(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.fields.entry(name.to_string()).or_default().push(value.into());
    }
}

/// Drains a multipart payload into a `SubmittedForm`.
pub async fn collect_multipart(mut payload: Multipart) -> Result<SubmittedForm, String> {
    let mut form = SubmittedForm::default();
    let mut text_bytes: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let field_name = field.content_disposition().get_name().unwrap_or_default().to_string();
        let filename = field.content_disposition().get_filename().map(|s| s.to_string());

        if field_name == IMAGE_FIELD && filename.is_some() {
            let content_type = field.content_type().map(|m| m.essence_str().to_string());
            let mut data = Vec::new();
            let mut size: u64 = 0;
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| e.to_string())?;
                size += chunk.len() as u64;
                // Keep draining so later fields still arrive, but stop buffering.
                if (data.len() as u64) <= MAX_IMAGE_SIZE_BYTES {
                    data.extend_from_slice(&chunk);
                }
            }

            let filename = filename.unwrap_or_default();
            // Browsers send an empty part when no file was chosen.
            if filename.is_empty() && size == 0 {
                continue;
            }
            form.image = Some(UploadedFile { filename, content_type, data, size });
            continue;
        }

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            text_bytes += chunk.len();
            if text_bytes > MAX_TEXT_FIELDS_BYTES {
                return Err(format!("Text fields exceed {} bytes.", MAX_TEXT_FIELDS_BYTES));
            }
            data.extend_from_slice(&chunk);
        }
        let value = String::from_utf8(data.to_vec())
            .map_err(|_| format!("Invalid UTF-8 in form field '{}'.", field_name))?;
        form.push(&field_name, value);
    }

    Ok(form)
}
