use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        attachment::{Attachment, AttachmentChange},
        ordering::Sort,
        validation::{non_blank, require_fields},
    },
    error::{AppError, Result},
    repository::Record,
};

pub const DEFAULT_CATEGORY: &str = "general";

/// Event dates are wall-clock times at the church, so they carry no offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub venue: String,
    pub description: String,
    pub image: Option<Attachment>,
    pub image_path: Option<String>,
    pub link: Option<String>,
    pub featured: bool,
    pub active: bool,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an event at `now`.
///
/// Without an end date the event runs until the last millisecond of its
/// start day. An end date earlier than the start is taken as given: such an
/// event goes straight from upcoming to completed.
pub fn event_status(date: NaiveDateTime, end_date: Option<NaiveDateTime>, now: NaiveDateTime) -> EventStatus {
    let end = match end_date {
        Some(end) => end,
        None => end_of_day(date),
    };

    if now < date {
        EventStatus::Upcoming
    } else if now <= end {
        EventStatus::Ongoing
    } else {
        EventStatus::Completed
    }
}

fn end_of_day(date: NaiveDateTime) -> NaiveDateTime {
    date.date()
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or(date)
}

impl Event {
    pub fn status(&self, now: NaiveDateTime) -> EventStatus {
        event_status(self.date, self.end_date, now)
    }

    fn validate(&self) -> Result<()> {
        require_fields(&[
            ("title", &self.title),
            ("venue", &self.venue),
            ("description", &self.description),
        ])
    }
}

/// An event as the views and the JSON endpoint see it: the stored record
/// plus the status derived at read time.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub status: EventStatus,
}

impl EventView {
    pub fn at(event: Event, now: NaiveDateTime) -> Self {
        let status = event.status(now);
        Self { event, status }
    }
}

/// Parses a form date: `YYYY-MM-DD` (midnight) or a `datetime-local` value.
pub fn parse_event_date(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::default()))
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", value)))
}

#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub title: String,
    pub date: String,
    pub end_date: Option<String>,
    pub venue: String,
    pub description: String,
    pub image: Option<Attachment>,
    pub link: Option<String>,
    pub featured: bool,
    pub active: bool,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    /// `Some(None)` clears the end date.
    pub end_date: Option<Option<String>>,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub image: AttachmentChange,
    pub link: Option<Option<String>>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub category: Option<String>,
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDateTime>> {
    non_blank(value).map(|v| parse_event_date(&v)).transpose()
}

impl Record for Event {
    type Draft = CreateEventRequest;
    type Patch = UpdateEventRequest;

    const KIND: &'static str = "event";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: CreateEventRequest) -> Result<Self> {
        require_fields(&[
            ("title", &draft.title),
            ("date", &draft.date),
            ("venue", &draft.venue),
            ("description", &draft.description),
        ])?;

        let event = Event {
            id,
            title: draft.title.trim().to_string(),
            date: parse_event_date(&draft.date)?,
            end_date: parse_optional_date(draft.end_date)?,
            venue: draft.venue.trim().to_string(),
            description: draft.description.trim().to_string(),
            image: draft.image,
            image_path: None,
            link: non_blank(draft.link),
            featured: draft.featured,
            active: draft.active,
            category: non_blank(draft.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            created_at,
        };
        event.validate()?;
        Ok(event)
    }

    fn apply(&mut self, patch: UpdateEventRequest) -> Result<()> {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(date) = patch.date {
            require_fields(&[("date", &date)])?;
            self.date = parse_event_date(&date)?;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = parse_optional_date(end_date)?;
        }
        if let Some(venue) = patch.venue {
            self.venue = venue.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(link) = patch.link {
            self.link = non_blank(link);
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(category) = patch.category {
            self.category = non_blank(Some(category)).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        }
        patch.image.apply(&mut self.image, &mut self.image_path);

        self.validate()
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
            Sort::Default => records.sort_by(|a, b| b.date.cmp(&a.date)),
            Sort::Newest => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
    }

    fn day(s: &str) -> NaiveDateTime {
        parse_event_date(s).unwrap()
    }

    #[test]
    fn test_single_day_event() {
        let date = day("2024-01-10");
        assert_eq!(event_status(date, None, at("2024-01-10T12:00:00")), EventStatus::Ongoing);
        assert_eq!(event_status(date, None, at("2024-01-11T00:00:01")), EventStatus::Completed);
        assert_eq!(event_status(date, None, at("2024-01-09T23:59:59")), EventStatus::Upcoming);
    }

    #[test]
    fn test_single_day_event_last_millisecond() {
        let date = day("2024-01-10");
        assert_eq!(event_status(date, None, at("2024-01-10T23:59:59.999")), EventStatus::Ongoing);
        assert_eq!(event_status(date, None, at("2024-01-11T00:00:00")), EventStatus::Completed);
    }

    #[test]
    fn test_ranged_event() {
        let start = day("2024-03-01");
        let end = Some(day("2024-03-03"));
        assert_eq!(event_status(start, end, at("2024-02-29T10:00:00")), EventStatus::Upcoming);
        assert_eq!(event_status(start, end, at("2024-03-01T00:00:00")), EventStatus::Ongoing);
        assert_eq!(event_status(start, end, at("2024-03-03T00:00:00")), EventStatus::Ongoing);
        assert_eq!(event_status(start, end, at("2024-03-03T00:00:01")), EventStatus::Completed);
    }

    #[test]
    fn test_end_before_start_is_not_corrected() {
        let start = day("2024-05-10");
        let end = Some(day("2024-05-01"));
        assert_eq!(event_status(start, end, at("2024-05-09T00:00:00")), EventStatus::Upcoming);
        // Past the start, the inverted range is already over.
        assert_eq!(event_status(start, end, at("2024-05-10T00:00:00")), EventStatus::Completed);
    }

    #[test]
    fn test_status_is_deterministic() {
        let date = day("2024-01-10");
        let now = at("2024-01-10T08:30:00");
        assert_eq!(event_status(date, None, now), event_status(date, None, now));
    }

    #[test]
    fn test_parse_event_date_formats() {
        assert_eq!(day("2024-01-10"), at("2024-01-10T00:00:00"));
        assert_eq!(parse_event_date("2024-01-10T18:30").unwrap(), at("2024-01-10T18:30:00"));
        assert!(parse_event_date("next sunday").is_err());
    }

    #[test]
    fn test_view_serializes_status() {
        let event = Event::from_draft(
            Uuid::new_v4(),
            Utc::now(),
            CreateEventRequest {
                title: "Picnic".to_string(),
                date: "2024-06-01".to_string(),
                end_date: Some(" ".to_string()),
                venue: "Park".to_string(),
                description: "Bring food".to_string(),
                image: None,
                link: None,
                featured: false,
                active: true,
                category: None,
            },
        )
        .unwrap();
        assert_eq!(event.category, DEFAULT_CATEGORY);
        assert!(event.end_date.is_none());

        let json = serde_json::to_value(EventView::at(event, at("2024-07-01T00:00:00"))).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["title"], "Picnic");
    }
}
