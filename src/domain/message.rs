use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        attachment::{Attachment, AttachmentChange},
        ordering::{order_messages, Sort},
        validation::require_fields,
    },
    error::Result,
    repository::{ExclusiveFeature, Record},
};

/// A sermon with its PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub title: String,
    pub code: String,
    pub date: NaiveDate,
    pub author: String,
    pub description: String,
    pub file: Option<Attachment>,
    /// Pre-migration reference to a file on disk.
    pub file_path: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateMessageRequest {
    pub title: String,
    pub code: String,
    /// Kept as entered so a blank date reports as a missing field.
    pub date: String,
    pub author: String,
    pub description: String,
    pub file: Option<Attachment>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMessageRequest {
    pub title: Option<String>,
    pub code: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub file: AttachmentChange,
}

impl Message {
    fn validate(&self) -> Result<()> {
        require_fields(&[
            ("title", &self.title),
            ("code", &self.code),
            ("author", &self.author),
            ("description", &self.description),
        ])
    }

    /// Whether the message carries a PDF in any form.
    pub fn has_file(&self) -> bool {
        self.file.is_some() || self.file_path.is_some()
    }
}

/// Parses a form date (`YYYY-MM-DD`, optionally followed by a time part).
pub fn parse_message_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        crate::error::AppError::Validation(format!("Invalid date: {}", value))
    })
}

impl Record for Message {
    type Draft = CreateMessageRequest;
    type Patch = UpdateMessageRequest;

    const KIND: &'static str = "message";
    const EXCLUSIVE_FEATURE: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: CreateMessageRequest) -> Result<Self> {
        require_fields(&[
            ("title", &draft.title),
            ("code", &draft.code),
            ("date", &draft.date),
            ("author", &draft.author),
            ("description", &draft.description),
        ])?;

        let message = Message {
            id,
            title: draft.title.trim().to_string(),
            code: draft.code.trim().to_string(),
            date: parse_message_date(&draft.date)?,
            author: draft.author.trim().to_string(),
            description: draft.description.trim().to_string(),
            file: draft.file,
            file_path: None,
            featured: false,
            created_at,
        };
        message.validate()?;
        Ok(message)
    }

    fn apply(&mut self, patch: UpdateMessageRequest) -> Result<()> {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(code) = patch.code {
            self.code = code.trim().to_string();
        }
        if let Some(date) = patch.date {
            require_fields(&[("date", &date)])?;
            self.date = parse_message_date(&date)?;
        }
        if let Some(author) = patch.author {
            self.author = author.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        patch.file.apply(&mut self.file, &mut self.file_path);

        self.validate()
    }

    fn attachment(&self) -> Option<&Attachment> {
        self.file.as_ref()
    }

    fn legacy_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    fn featured(&self) -> bool {
        self.featured
    }

    fn set_featured(&mut self, featured: bool) {
        self.featured = featured;
    }

    fn order(records: &mut [Self], sort: Sort) {
        match sort {
            Sort::Default => order_messages(records),
            Sort::Newest => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl ExclusiveFeature for Message {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn draft() -> CreateMessageRequest {
        CreateMessageRequest {
            title: "Walking in Faith".to_string(),
            code: "SUN-2024-01".to_string(),
            date: "2024-01-07".to_string(),
            author: "Pastor John".to_string(),
            description: "Hebrews 11".to_string(),
            file: None,
        }
    }

    #[test]
    fn test_from_draft_defaults() {
        let message = Message::from_draft(Uuid::new_v4(), Utc::now(), draft()).unwrap();
        assert!(!message.featured);
        assert_eq!(message.date, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        assert!(!message.has_file());
    }

    #[test]
    fn test_from_draft_requires_fields() {
        for field in ["title", "code", "date", "author", "description"] {
            let mut d = draft();
            match field {
                "title" => d.title = String::new(),
                "code" => d.code = " ".to_string(),
                "date" => d.date = String::new(),
                "author" => d.author = String::new(),
                _ => d.description = "\t".to_string(),
            }
            let err = Message::from_draft(Uuid::new_v4(), Utc::now(), d).unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m.contains(field)), "{}", field);
        }
    }

    #[test]
    fn test_apply_rejects_blank_title() {
        let mut message = Message::from_draft(Uuid::new_v4(), Utc::now(), draft()).unwrap();
        let patch = UpdateMessageRequest {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(message.apply(patch).is_err());
    }

    #[test]
    fn test_parse_message_date_accepts_datetime() {
        assert_eq!(
            parse_message_date("2024-03-01T10:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_message_date("March 1").is_err());
    }
}
