use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        attachment::{Attachment, AttachmentChange},
        ordering::Sort,
        validation::{non_blank, require_fields, validate_hex_color},
    },
    error::{AppError, Result},
    repository::Record,
};

pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Announcement {
    pub id: Uuid,
    #[validate(length(max = 100))]
    pub title: String,
    #[validate(length(max = 500))]
    pub content: String,
    #[validate(range(min = 1, max = 5))]
    pub priority: i32,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub background_color: String,
    pub text_color: String,
    pub image: Option<Attachment>,
    pub image_path: Option<String>,
    pub featured: bool,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    Sticker,
    Banner,
    #[default]
    Announcement,
}

impl AnnouncementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementKind::Sticker => "sticker",
            AnnouncementKind::Banner => "banner",
            AnnouncementKind::Announcement => "announcement",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sticker" => Some(AnnouncementKind::Sticker),
            "banner" => Some(AnnouncementKind::Banner),
            "announcement" => Some(AnnouncementKind::Announcement),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnouncementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Announcement {
    /// Shown to the public: active and not past its expiry.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map_or(true, |expires_at| expires_at > now)
    }

    fn check(&self) -> Result<()> {
        require_fields(&[("title", &self.title), ("content", &self.content)])?;
        self.validate()?;

        for (name, color) in [
            ("background_color", &self.background_color),
            ("text_color", &self.text_color),
        ] {
            if !validate_hex_color(color) {
                return Err(AppError::Validation(format!(
                    "Invalid {}: {}. Expected hex color like #FF0000",
                    name, color
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub priority: Option<i32>,
    pub kind: Option<AnnouncementKind>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub image: Option<Attachment>,
    pub featured: bool,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<i32>,
    pub kind: Option<AnnouncementKind>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub image: AttachmentChange,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    /// `Some(None)` clears the expiry.
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub display_order: Option<i32>,
}

impl Record for Announcement {
    type Draft = CreateAnnouncementRequest;
    type Patch = UpdateAnnouncementRequest;

    const KIND: &'static str = "announcement";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: CreateAnnouncementRequest) -> Result<Self> {
        let announcement = Announcement {
            id,
            title: draft.title.trim().to_string(),
            content: draft.content.trim().to_string(),
            priority: draft.priority.unwrap_or(1),
            kind: draft.kind.unwrap_or_default(),
            background_color: non_blank(draft.background_color)
                .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string()),
            text_color: non_blank(draft.text_color).unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            image: draft.image,
            image_path: None,
            featured: draft.featured,
            active: draft.active,
            expires_at: draft.expires_at,
            display_order: draft.display_order.unwrap_or(0),
            created_at,
        };
        announcement.check()?;
        Ok(announcement)
    }

    fn apply(&mut self, patch: UpdateAnnouncementRequest) -> Result<()> {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(content) = patch.content {
            self.content = content.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(color) = non_blank(patch.background_color) {
            self.background_color = color;
        }
        if let Some(color) = non_blank(patch.text_color) {
            self.text_color = color;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
        if let Some(display_order) = patch.display_order {
            self.display_order = display_order;
        }
        patch.image.apply(&mut self.image, &mut self.image_path);

        self.check()
    }

    fn attachment(&self) -> Option<&Attachment> {
        self.image.as_ref()
    }

    fn legacy_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    fn featured(&self) -> bool {
        self.featured
    }

    fn set_featured(&mut self, featured: bool) {
        self.featured = featured;
    }

    fn order(records: &mut [Self], sort: Sort) {
        match sort {
            Sort::Default => records.sort_by(|a, b| {
                a.display_order
                    .cmp(&b.display_order)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            Sort::Newest => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}
