use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::{Local, Utc};
use serde::Deserialize;

use crate::{
    api::state::AppState,
    domain::{
        ordering::{
            home_messages, normalize_query, public_announcements, public_events, search_messages,
            upcoming_events,
        },
        Sort,
    },
    error::Result,
    web::{
        templates::{BaseContext, FlashQuery, HtmlTemplate},
        views::{self, AnnouncementItem, EventItem, MessageItem},
    },
};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub base: BaseContext,
    pub featured_message: Option<MessageItem>,
    pub messages: Vec<MessageItem>,
    pub announcements: Vec<AnnouncementItem>,
    pub events: Vec<EventItem>,
}

pub async fn home(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let ctx = &state.service_context;

    let all_messages = ctx.message_store.find_all(Sort::Default).await?;
    let featured_message = all_messages.iter().find(|m| m.featured).map(MessageItem::from);
    let messages = views::messages(&home_messages(all_messages));

    let announcements = public_announcements(
        ctx.announcement_store.find_all(Sort::Default).await?,
        Utc::now(),
    );
    let events = upcoming_events(
        ctx.event_store.find_all(Sort::Default).await?,
        Local::now().naive_local(),
    );

    Ok(HtmlTemplate(HomeTemplate {
        base: BaseContext::load(&state, &jar, FlashQuery::default()).await,
        featured_message,
        messages,
        announcements: views::announcements(&announcements),
        events: views::events(&events),
    })
    .into_response())
}

#[derive(Template)]
#[template(path = "messages.html")]
pub struct MessagesTemplate {
    pub base: BaseContext,
    pub messages: Vec<MessageItem>,
    pub query: String,
}

pub async fn messages_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let messages = state.service_context.message_store.find_all(Sort::Default).await?;

    Ok(HtmlTemplate(MessagesTemplate {
        base: BaseContext::load(&state, &jar, FlashQuery::default()).await,
        messages: views::messages(&messages),
        query: String::new(),
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn search_messages_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(search): Query<SearchQuery>,
) -> Result<Response> {
    let Some(query) = normalize_query(search.q.as_deref()) else {
        return Ok(Redirect::to("/messages").into_response());
    };

    let messages = state.service_context.message_store.find_all(Sort::Default).await?;
    let matches = search_messages(messages, &query);
    tracing::debug!("Message search {:?} matched {}", query, matches.len());

    Ok(HtmlTemplate(MessagesTemplate {
        base: BaseContext::load(&state, &jar, FlashQuery::default()).await,
        messages: views::messages(&matches),
        query,
    })
    .into_response())
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub base: BaseContext,
    pub events: Vec<EventItem>,
}

pub async fn events_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let events = public_events(
        state.service_context.event_store.find_all(Sort::Default).await?,
        Local::now().naive_local(),
    );

    Ok(HtmlTemplate(EventsTemplate {
        base: BaseContext::load(&state, &jar, FlashQuery::default()).await,
        events: views::events(&events),
    })
    .into_response())
}

#[derive(Template)]
#[template(path = "announcements.html")]
pub struct AnnouncementsTemplate {
    pub base: BaseContext,
    pub announcements: Vec<AnnouncementItem>,
}

pub async fn announcements_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let announcements = public_announcements(
        state.service_context.announcement_store.find_all(Sort::Default).await?,
        Utc::now(),
    );

    Ok(HtmlTemplate(AnnouncementsTemplate {
        base: BaseContext::load(&state, &jar, FlashQuery::default()).await,
        announcements: views::announcements(&announcements),
    })
    .into_response())
}
