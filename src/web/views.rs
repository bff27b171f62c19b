//! Display-ready copies of the records for the askama templates. Dates are
//! pre-formatted here so the templates stay free of logic.

use crate::domain::{
    Announcement, AnnouncementKind, Event, EventView, Message, DEFAULT_BACKGROUND_COLOR,
    DEFAULT_CATEGORY, DEFAULT_TEXT_COLOR,
};

const DATE_INPUT: &str = "%Y-%m-%d";
const DATETIME_INPUT: &str = "%Y-%m-%dT%H:%M";

#[derive(Default)]
pub struct MessageItem {
    pub id: String,
    pub title: String,
    pub code: String,
    pub date: String,
    pub date_input: String,
    pub author: String,
    pub description: String,
    pub has_file: bool,
    pub file_name: String,
    pub featured: bool,
}

impl From<&Message> for MessageItem {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.to_string(),
            title: m.title.clone(),
            code: m.code.clone(),
            date: m.date.format("%B %-d, %Y").to_string(),
            date_input: m.date.format(DATE_INPUT).to_string(),
            author: m.author.clone(),
            description: m.description.clone(),
            has_file: m.has_file(),
            file_name: m
                .file
                .as_ref()
                .map(|f| f.filename.clone())
                .or_else(|| m.file_path.clone())
                .unwrap_or_default(),
            featured: m.featured,
        }
    }
}

pub struct EventItem {
    pub id: String,
    pub title: String,
    pub date: String,
    pub date_input: String,
    pub end_date: Option<String>,
    pub end_date_input: String,
    pub venue: String,
    pub description: String,
    pub link: Option<String>,
    pub category: String,
    pub status: String,
    pub has_image: bool,
    pub featured: bool,
    pub active: bool,
}

impl Default for EventItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            date: String::new(),
            date_input: String::new(),
            end_date: None,
            end_date_input: String::new(),
            venue: String::new(),
            description: String::new(),
            link: None,
            category: DEFAULT_CATEGORY.to_string(),
            status: String::new(),
            has_image: false,
            featured: false,
            active: true,
        }
    }
}

impl EventItem {
    fn build(e: &Event, status: String) -> Self {
        Self {
            id: e.id.to_string(),
            title: e.title.clone(),
            date: e.date.format("%b %-d, %Y %-I:%M %p").to_string(),
            date_input: e.date.format(DATETIME_INPUT).to_string(),
            end_date: e.end_date.map(|d| d.format("%b %-d, %Y %-I:%M %p").to_string()),
            end_date_input: e
                .end_date
                .map(|d| d.format(DATETIME_INPUT).to_string())
                .unwrap_or_default(),
            venue: e.venue.clone(),
            description: e.description.clone(),
            link: e.link.clone(),
            category: e.category.clone(),
            status,
            has_image: e.image.is_some() || e.image_path.is_some(),
            featured: e.featured,
            active: e.active,
        }
    }
}

impl From<&EventView> for EventItem {
    fn from(v: &EventView) -> Self {
        Self::build(&v.event, v.status.to_string())
    }
}

impl From<&Event> for EventItem {
    fn from(e: &Event) -> Self {
        Self::build(e, String::new())
    }
}

pub struct AnnouncementItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub priority: i32,
    pub kind: String,
    pub background_color: String,
    pub text_color: String,
    pub has_image: bool,
    pub featured: bool,
    pub active: bool,
    pub expires_at: Option<String>,
    pub expires_at_input: String,
    pub display_order: i32,
}

impl Default for AnnouncementItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            content: String::new(),
            priority: 1,
            kind: AnnouncementKind::default().to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            has_image: false,
            featured: false,
            active: true,
            expires_at: None,
            expires_at_input: String::new(),
            display_order: 0,
        }
    }
}

impl From<&Announcement> for AnnouncementItem {
    fn from(a: &Announcement) -> Self {
        Self {
            id: a.id.to_string(),
            title: a.title.clone(),
            content: a.content.clone(),
            priority: a.priority,
            kind: a.kind.to_string(),
            background_color: a.background_color.clone(),
            text_color: a.text_color.clone(),
            has_image: a.image.is_some() || a.image_path.is_some(),
            featured: a.featured,
            active: a.active,
            expires_at: a.expires_at.map(|d| d.format("%b %-d, %Y %H:%M UTC").to_string()),
            expires_at_input: a
                .expires_at
                .map(|d| d.format(DATETIME_INPUT).to_string())
                .unwrap_or_default(),
            display_order: a.display_order,
        }
    }
}

pub fn messages<'a>(list: impl IntoIterator<Item = &'a Message>) -> Vec<MessageItem> {
    list.into_iter().map(MessageItem::from).collect()
}

pub fn events<'a>(list: impl IntoIterator<Item = &'a EventView>) -> Vec<EventItem> {
    list.into_iter().map(EventItem::from).collect()
}

pub fn announcements<'a>(list: impl IntoIterator<Item = &'a Announcement>) -> Vec<AnnouncementItem> {
    list.into_iter().map(AnnouncementItem::from).collect()
}
