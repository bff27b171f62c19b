use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Event,
    error::{AppError, Result},
    repository::{attachment_from_columns, parse_id, Repository},
};

#[derive(FromRow)]
struct EventRow {
    id: String,
    title: String,
    date: NaiveDateTime,
    end_date: Option<NaiveDateTime>,
    venue: String,
    description: String,
    image_content_type: Option<String>,
    image_name: Option<String>,
    image_size: Option<i64>,
    image_data: Option<Vec<u8>>,
    image_path: Option<String>,
    link: Option<String>,
    featured: i32,
    active: i32,
    category: String,
    created_at: NaiveDateTime,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, date, end_date, venue, description,
           image_content_type, image_name, image_size, image_data, image_path,
           link, featured, active, category, created_at
    FROM events
"#;

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        Ok(Event {
            id: parse_id(&row.id)?,
            title: row.title,
            date: row.date,
            end_date: row.end_date,
            venue: row.venue,
            description: row.description,
            image: attachment_from_columns(
                row.image_content_type,
                row.image_name,
                row.image_size,
                row.image_data,
            ),
            image_path: row.image_path,
            link: row.link,
            featured: row.featured != 0,
            active: row.active != 0,
            category: row.category,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl Repository<Event> for SqliteEventRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert(&self, event: &Event) -> Result<()> {
        let image = event.image.as_ref();
        let featured_int = if event.featured { 1i32 } else { 0i32 };
        let active_int = if event.active { 1i32 } else { 0i32 };

        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, date, end_date, venue, description,
                image_content_type, image_name, image_size, image_data, image_path,
                link, featured, active, category, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(event.id.to_string())
        .bind(&event.title)
        .bind(event.date)
        .bind(event.end_date)
        .bind(&event.venue)
        .bind(&event.description)
        .bind(image.map(|i| i.content_type.as_str()))
        .bind(image.map(|i| i.filename.as_str()))
        .bind(image.map(|i| i.size))
        .bind(image.map(|i| i.data.as_slice()))
        .bind(&event.image_path)
        .bind(&event.link)
        .bind(featured_int)
        .bind(active_int)
        .bind(&event.category)
        .bind(event.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!("{} ORDER BY date DESC", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_event)
            .collect()
    }

    async fn replace(&self, event: &Event) -> Result<bool> {
        let image = event.image.as_ref();
        let featured_int = if event.featured { 1i32 } else { 0i32 };
        let active_int = if event.active { 1i32 } else { 0i32 };

        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, date = ?, end_date = ?, venue = ?, description = ?,
                image_content_type = ?, image_name = ?, image_size = ?, image_data = ?,
                image_path = ?, link = ?, featured = ?, active = ?, category = ?
            WHERE id = ?
            "#
        )
        .bind(&event.title)
        .bind(event.date)
        .bind(event.end_date)
        .bind(&event.venue)
        .bind(&event.description)
        .bind(image.map(|i| i.content_type.as_str()))
        .bind(image.map(|i| i.filename.as_str()))
        .bind(image.map(|i| i.size))
        .bind(image.map(|i| i.data.as_slice()))
        .bind(&event.image_path)
        .bind(&event.link)
        .bind(featured_int)
        .bind(active_int)
        .bind(&event.category)
        .bind(event.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
