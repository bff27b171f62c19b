use std::collections::HashMap;

use axum::{extract::Multipart, extract::multipart::MultipartError, http::StatusCode};

use crate::{
    domain::{content_type_for_path, Attachment},
    error::{AppError, Result},
};

/// Content types accepted for sermon files.
const PDF_TYPES: &[&str] = &["application/pdf"];

/// Content types accepted for event and announcement images.
const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Image,
}

impl UploadKind {
    fn allowed(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Pdf => PDF_TYPES,
            UploadKind::Image => IMAGE_TYPES,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            UploadKind::Pdf => "Only PDF files are allowed",
            UploadKind::Image => "Only JPEG, PNG, GIF and WebP images are allowed",
        }
    }
}

/// A parsed admin form: text fields plus at most one uploaded file.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub upload: Option<Attachment>,
}

impl FormData {
    /// The field's value, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Checkbox semantics: present means checked.
    pub fn flag(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .map(|v| !matches!(v.as_str(), "false" | "off" | "0"))
            .unwrap_or(false)
    }

    pub fn number(&self, name: &str) -> Result<Option<i32>> {
        match self.fields.get(name).map(|v| v.trim()) {
            None | Some("") => Ok(None),
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| AppError::Validation(format!("Invalid {}: {}", name, v))),
        }
    }
}

/// Reads a multipart admin form. The field named `file_field` is taken as
/// the upload and checked against `kind` and `max_bytes`; an empty file input
/// counts as no upload.
pub async fn read_form(
    mut multipart: Multipart,
    file_field: &str,
    kind: UploadKind,
    max_bytes: usize,
) -> Result<FormData> {
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == file_field {
            let filename = field.file_name().unwrap_or("").to_string();
            let declared = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;

            if filename.is_empty() || data.is_empty() {
                continue;
            }
            form.upload = Some(check_upload(&filename, declared.as_deref(), data.to_vec(), kind, max_bytes)?);
        } else {
            let value = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Validates size and media type and wraps the bytes as an attachment.
pub fn check_upload(
    filename: &str,
    declared_type: Option<&str>,
    data: Vec<u8>,
    kind: UploadKind,
    max_bytes: usize,
) -> Result<Attachment> {
    if data.len() > max_bytes {
        return Err(AppError::AttachmentTooLarge { limit: max_bytes });
    }

    let content_type = effective_content_type(filename, declared_type);
    if !kind.allowed().contains(&content_type.as_str()) {
        return Err(AppError::UnsupportedMediaType(kind.describe().to_string()));
    }

    Ok(Attachment::new(content_type, filename, data))
}

/// The declared type without parameters, or the extension's type when the
/// browser sent nothing useful.
fn effective_content_type(filename: &str, declared: Option<&str>) -> String {
    let declared = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    match declared {
        Some(ct) if ct == "image/jpg" => "image/jpeg".to_string(),
        Some(ct) => ct,
        None => content_type_for_path(filename).to_string(),
    }
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::AttachmentTooLarge { limit: max_bytes }
    } else {
        AppError::BadRequest(format!("Invalid form data: {}", err.body_text()))
    }
}
