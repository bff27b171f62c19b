//! Ordering, filtering and search rules for the public and admin listings.
//!
//! Everything here is pure. Functions that depend on the clock take `now` as
//! an argument.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::domain::{Announcement, EventStatus, EventView, Message};

/// Public announcement slots on the home and announcements pages.
pub const PUBLIC_ANNOUNCEMENT_LIMIT: usize = 3;

/// Messages shown on the home page.
pub const HOME_MESSAGE_LIMIT: usize = 3;

/// Events shown on the home page.
pub const HOME_EVENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// The record type's natural listing order.
    #[default]
    Default,
    /// Creation time, newest first.
    Newest,
}

/// Featured first, then newest sermon date first.
pub fn order_messages(messages: &mut [Message]) {
    messages.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| b.date.cmp(&a.date))
    });
}

/// The home page list: newest sermon date first, at most three.
pub fn home_messages(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| b.date.cmp(&a.date));
    messages.truncate(HOME_MESSAGE_LIMIT);
    messages
}

fn announcement_rank(a: &Announcement, b: &Announcement) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Visible announcements in display order, capped for public pages.
pub fn public_announcements(announcements: Vec<Announcement>, now: DateTime<Utc>) -> Vec<Announcement> {
    let mut visible: Vec<Announcement> = announcements
        .into_iter()
        .filter(|a| a.is_visible(now))
        .collect();
    visible.sort_by(announcement_rank);
    visible.truncate(PUBLIC_ANNOUNCEMENT_LIMIT);
    visible
}

/// Case-insensitive substring match on title, description, author or code.
pub fn message_matches(message: &Message, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    [&message.title, &message.description, &message.author, &message.code]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// `None` when the query is blank, meaning "no search at all".
pub fn normalize_query(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

/// Filters an already ordered message list down to the matches.
pub fn search_messages(messages: Vec<Message>, query: &str) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|m| message_matches(m, query))
        .collect()
}

/// Active events with their status: running and upcoming ones soonest first,
/// then past ones most recent first.
pub fn public_events(events: Vec<crate::domain::Event>, now: NaiveDateTime) -> Vec<EventView> {
    let mut views: Vec<EventView> = events
        .into_iter()
        .filter(|e| e.active)
        .map(|e| EventView::at(e, now))
        .collect();

    views.sort_by(|a, b| {
        let a_done = a.status == EventStatus::Completed;
        let b_done = b.status == EventStatus::Completed;
        match (a_done, b_done) {
            (false, false) => a.event.date.cmp(&b.event.date),
            (true, true) => b.event.date.cmp(&a.event.date),
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
        }
    });
    views
}

/// The home page list: public events that have not finished yet.
pub fn upcoming_events(events: Vec<crate::domain::Event>, now: NaiveDateTime) -> Vec<EventView> {
    public_events(events, now)
        .into_iter()
        .filter(|v| v.status != EventStatus::Completed)
        .take(HOME_EVENT_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnouncementKind, Event};
    use chrono::{Duration, NaiveDate, TimeZone};
    use uuid::Uuid;

    fn message(title: &str, date: (i32, u32, u32), featured: bool) -> Message {
        Message {
            id: Uuid::new_v4(),
            title: title.to_string(),
            code: format!("C-{}", title),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            author: "Pastor Ruth".to_string(),
            description: "A sermon".to_string(),
            file: None,
            file_path: None,
            featured,
            created_at: Utc::now(),
        }
    }

    fn announcement(title: &str, featured: bool, priority: i32, age_minutes: i64) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: "content".to_string(),
            priority,
            kind: AnnouncementKind::Announcement,
            background_color: "#fff".to_string(),
            text_color: "#000".to_string(),
            image: None,
            image_path: None,
            featured,
            active: true,
            expires_at: None,
            display_order: 0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
                - Duration::minutes(age_minutes),
        }
    }

    fn event(title: &str, day: u32, active: bool) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            end_date: None,
            venue: "Hall".to_string(),
            description: "d".to_string(),
            image: None,
            image_path: None,
            link: None,
            featured: false,
            active,
            category: "general".to_string(),
            created_at: Utc::now(),
        }
    }

    fn june_15_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_featured_messages_come_first() {
        let mut messages = vec![
            message("old", (2023, 1, 1), false),
            message("new", (2024, 1, 1), false),
            message("star", (2022, 6, 1), true),
            message("mid", (2023, 6, 1), false),
        ];
        order_messages(&mut messages);
        let titles: Vec<&str> = messages.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["star", "new", "mid", "old"]);
    }

    #[test]
    fn test_home_messages_ignores_featured() {
        let messages = vec![
            message("a", (2024, 1, 1), false),
            message("b", (2024, 2, 1), false),
            message("c", (2021, 1, 1), true),
            message("d", (2024, 3, 1), false),
        ];
        let titles: Vec<String> = home_messages(messages).into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["d", "b", "a"]);
    }

    #[test]
    fn test_public_announcements_rank_and_cap() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut hidden = announcement("hidden", true, 5, 0);
        hidden.active = false;
        let mut expired = announcement("expired", true, 5, 0);
        expired.expires_at = Some(now - Duration::minutes(1));

        let list = vec![
            announcement("low", false, 1, 0),
            announcement("high", false, 5, 10),
            announcement("featured", true, 1, 30),
            announcement("high-newer", false, 5, 1),
            hidden,
            expired,
        ];
        let titles: Vec<String> = public_announcements(list, now)
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["featured", "high-newer", "high"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let m = message("Grace Abounds", (2024, 1, 1), false);
        assert!(message_matches(&m, "grace"));
        assert!(message_matches(&m, "RUTH"));
        assert!(message_matches(&m, "c-grace"));
        assert!(message_matches(&m, "sermon"));
        assert!(!message_matches(&m, "exodus"));
    }

    #[test]
    fn test_search_without_match_is_empty() {
        let messages = vec![message("Hope", (2024, 1, 1), false)];
        assert!(search_messages(messages, "zebra").is_empty());
    }

    #[test]
    fn test_blank_query_is_no_query() {
        assert_eq!(normalize_query(Some("   ")), None);
        assert_eq!(normalize_query(None), None);
        assert_eq!(normalize_query(Some(" hope ")), Some("hope".to_string()));
    }

    #[test]
    fn test_public_events_order() {
        let now = june_15_noon();

        let views = public_events(
            vec![
                event("past-old", 1, true),
                event("later", 20, true),
                event("today", 15, true),
                event("past-recent", 10, true),
                event("inactive", 18, false),
            ],
            now,
        );
        let titles: Vec<&str> = views.iter().map(|v| v.event.title.as_str()).collect();
        assert_eq!(titles, vec!["today", "later", "past-recent", "past-old"]);
        assert_eq!(views[0].status, EventStatus::Ongoing);
        assert_eq!(views[1].status, EventStatus::Upcoming);
        assert_eq!(views[3].status, EventStatus::Completed);
    }

    #[test]
    fn test_upcoming_events_skip_completed() {
        let events = vec![
            event("past", 1, true),
            event("a", 16, true),
            event("b", 17, true),
            event("c", 18, true),
            event("d", 19, true),
        ];
        let titles: Vec<String> = upcoming_events(events, june_15_noon())
            .into_iter()
            .map(|v| v.event.title)
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }
}
