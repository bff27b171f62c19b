use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Announcement, AnnouncementKind},
    error::{AppError, Result},
    repository::{attachment_from_columns, parse_id, Repository},
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    content: String,
    priority: i32,
    kind: String,
    background_color: String,
    text_color: String,
    image_content_type: Option<String>,
    image_name: Option<String>,
    image_size: Option<i64>,
    image_data: Option<Vec<u8>>,
    image_path: Option<String>,
    featured: i32,
    active: i32,
    expires_at: Option<NaiveDateTime>,
    display_order: i32,
    created_at: NaiveDateTime,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, content, priority, kind, background_color, text_color,
           image_content_type, image_name, image_size, image_data, image_path,
           featured, active, expires_at, display_order, created_at
    FROM announcements
"#;

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: parse_id(&row.id)?,
            title: row.title,
            content: row.content,
            priority: row.priority,
            kind: Self::parse_kind(&row.kind)?,
            background_color: row.background_color,
            text_color: row.text_color,
            image: attachment_from_columns(
                row.image_content_type,
                row.image_name,
                row.image_size,
                row.image_data,
            ),
            image_path: row.image_path,
            featured: row.featured != 0,
            active: row.active != 0,
            expires_at: row.expires_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            display_order: row.display_order,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn parse_kind(s: &str) -> Result<AnnouncementKind> {
        AnnouncementKind::from_str(s)
            .ok_or_else(|| AppError::Database(format!("Invalid announcement type: {}", s)))
    }
}

#[async_trait]
impl Repository<Announcement> for SqliteAnnouncementRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert(&self, announcement: &Announcement) -> Result<()> {
        let image = announcement.image.as_ref();
        let featured_int = if announcement.featured { 1i32 } else { 0i32 };
        let active_int = if announcement.active { 1i32 } else { 0i32 };

        sqlx::query(
            r#"
            INSERT INTO announcements (
                id, title, content, priority, kind, background_color, text_color,
                image_content_type, image_name, image_size, image_data, image_path,
                featured, active, expires_at, display_order, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(announcement.id.to_string())
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.priority)
        .bind(announcement.kind.as_str())
        .bind(&announcement.background_color)
        .bind(&announcement.text_color)
        .bind(image.map(|i| i.content_type.as_str()))
        .bind(image.map(|i| i.filename.as_str()))
        .bind(image.map(|i| i.size))
        .bind(image.map(|i| i.data.as_slice()))
        .bind(&announcement.image_path)
        .bind(featured_int)
        .bind(active_int)
        .bind(announcement.expires_at.map(|dt| dt.naive_utc()))
        .bind(announcement.display_order)
        .bind(announcement.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_announcement).transpose()
    }

    async fn list(&self) -> Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "{} ORDER BY display_order ASC, created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_announcement)
            .collect()
    }

    async fn replace(&self, announcement: &Announcement) -> Result<bool> {
        let image = announcement.image.as_ref();
        let featured_int = if announcement.featured { 1i32 } else { 0i32 };
        let active_int = if announcement.active { 1i32 } else { 0i32 };

        let result = sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, content = ?, priority = ?, kind = ?,
                background_color = ?, text_color = ?,
                image_content_type = ?, image_name = ?, image_size = ?, image_data = ?,
                image_path = ?, featured = ?, active = ?, expires_at = ?, display_order = ?
            WHERE id = ?
            "#
        )
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.priority)
        .bind(announcement.kind.as_str())
        .bind(&announcement.background_color)
        .bind(&announcement.text_color)
        .bind(image.map(|i| i.content_type.as_str()))
        .bind(image.map(|i| i.filename.as_str()))
        .bind(image.map(|i| i.size))
        .bind(image.map(|i| i.data.as_slice()))
        .bind(&announcement.image_path)
        .bind(featured_int)
        .bind(active_int)
        .bind(announcement.expires_at.map(|dt| dt.naive_utc()))
        .bind(announcement.display_order)
        .bind(announcement.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
