use serde::{Deserialize, Serialize};

/// Binary content stored alongside a record. The bytes never go out over the
/// JSON endpoints; they are served by the attachment routes instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content_type: String,
    pub filename: String,
    pub size: i64,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(content_type: impl Into<String>, filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            filename: filename.into(),
            size: data.len() as i64,
            data,
        }
    }
}

/// What an update does to the attachment slot of a record.
#[derive(Debug, Clone, Default)]
pub enum AttachmentChange {
    /// Leave the stored attachment untouched.
    #[default]
    Keep,
    Replace(Attachment),
    Remove,
}

impl AttachmentChange {
    /// New upload wins over the remove flag; neither means keep.
    pub fn from_form(upload: Option<Attachment>, remove: bool) -> Self {
        match (upload, remove) {
            (Some(attachment), _) => AttachmentChange::Replace(attachment),
            (None, true) => AttachmentChange::Remove,
            (None, false) => AttachmentChange::Keep,
        }
    }

    /// Applies the change to an attachment slot and its legacy path reference.
    pub fn apply(self, slot: &mut Option<Attachment>, legacy_path: &mut Option<String>) {
        match self {
            AttachmentChange::Keep => {}
            AttachmentChange::Replace(attachment) => {
                *slot = Some(attachment);
                *legacy_path = None;
            }
            AttachmentChange::Remove => {
                *slot = None;
                *legacy_path = None;
            }
        }
    }
}

/// Content type for a legacy path reference, inferred from its extension.
pub fn content_type_for_path(path: &str) -> &'static str {
    let extension = path
        .rsplit('.')
        .next()
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
