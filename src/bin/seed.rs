use std::time::Duration as StdDuration;

use chapel::{
    domain::{
        Announcement, AnnouncementKind, CreateAnnouncementRequest, CreateEventRequest,
        CreateMessageRequest, Event, Message,
    },
    repository::{
        RecordStore, SqliteAnnouncementRepository, SqliteEventRepository, SqliteMessageRepository,
    },
};
use chrono::{Duration, Local, Utc};
use clap::Parser;
use fake::{
    faker::{
        lorem::en::{Paragraph, Sentence, Words},
        name::en::Name,
    },
    Fake,
};
use sqlx::sqlite::SqlitePoolOptions;

/// Fills the database with sample messages, events and announcements.
#[derive(Debug, Parser)]
#[command(name = "seed", about)]
struct Args {
    /// Database to seed.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://chapel.db?mode=rwc")]
    database_url: String,

    /// Number of messages to create.
    #[arg(long, default_value_t = 6)]
    messages: usize,

    /// Number of events to create.
    #[arg(long, default_value_t = 5)]
    events: usize,

    /// Number of announcements to create.
    #[arg(long, default_value_t = 4)]
    announcements: usize,
}

fn title() -> String {
    let words: Vec<String> = Words(2..5).fake();
    let mut title = words.join(" ");
    if let Some(first) = title.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    title
}

fn clamp(mut text: String, max: usize) -> String {
    if text.chars().count() > max {
        text = text.chars().take(max).collect();
    }
    text
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let timeout = StdDuration::from_secs(5);
    let messages: RecordStore<Message> =
        RecordStore::with_durable(SqliteMessageRepository::new(db_pool.clone()), timeout);
    let events: RecordStore<Event> =
        RecordStore::with_durable(SqliteEventRepository::new(db_pool.clone()), timeout);
    let announcements: RecordStore<Announcement> =
        RecordStore::with_durable(SqliteAnnouncementRepository::new(db_pool.clone()), timeout);

    if !messages.using_durable().await {
        anyhow::bail!("database at {} is not answering", args.database_url);
    }

    println!("📖 Creating messages...");
    let today = Local::now().date_naive();
    let mut newest = None;
    for i in 0..args.messages {
        let date = today - Duration::weeks(i as i64);
        let message = messages
            .create(CreateMessageRequest {
                title: title(),
                code: format!("SUN-{}", date.format("%Y-%m-%d")),
                date: date.format("%Y-%m-%d").to_string(),
                author: Name().fake(),
                description: Paragraph(2..4).fake(),
                file: None,
            })
            .await?;
        newest.get_or_insert(message.id);
    }
    if let Some(id) = newest {
        messages.set_featured(id).await?;
    }
    println!("  ✅ Created {} messages", args.messages);

    println!("📅 Creating events...");
    let now = Local::now().naive_local();
    for i in 0..args.events {
        // Spread events around today so every status shows up.
        let start = now + Duration::days(i as i64 * 7 - 7);
        events
            .create(CreateEventRequest {
                title: title(),
                date: start.format("%Y-%m-%dT%H:%M").to_string(),
                end_date: Some((start + Duration::hours(2)).format("%Y-%m-%dT%H:%M").to_string()),
                venue: format!("{} Hall", Words(1..2).fake::<Vec<String>>().join(" ")),
                description: Paragraph(1..3).fake(),
                image: None,
                link: None,
                featured: i == 1,
                active: true,
                category: None,
            })
            .await?;
    }
    println!("  ✅ Created {} events", args.events);

    println!("📢 Creating announcements...");
    let kinds = [
        AnnouncementKind::Announcement,
        AnnouncementKind::Banner,
        AnnouncementKind::Sticker,
    ];
    for i in 0..args.announcements {
        announcements
            .create(CreateAnnouncementRequest {
                title: clamp(Sentence(2..6).fake(), 100),
                content: clamp(Paragraph(1..3).fake(), 500),
                priority: Some((i % 5) as i32 + 1),
                kind: Some(kinds[i % kinds.len()]),
                featured: i == 0,
                active: true,
                expires_at: Some(Utc::now() + Duration::days(30)),
                display_order: Some(i as i32),
                ..Default::default()
            })
            .await?;
    }
    println!("  ✅ Created {} announcements", args.announcements);

    println!("\n✨ Database seeding complete!");

    Ok(())
}
