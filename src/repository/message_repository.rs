use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Message,
    error::{AppError, Result},
    repository::{attachment_from_columns, parse_id, Repository},
};

#[derive(FromRow)]
struct MessageRow {
    id: String,
    title: String,
    code: String,
    date: NaiveDate,
    author: String,
    description: String,
    file_content_type: Option<String>,
    file_name: Option<String>,
    file_size: Option<i64>,
    file_data: Option<Vec<u8>>,
    file_path: Option<String>,
    featured: i32,
    created_at: NaiveDateTime,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, code, date, author, description,
           file_content_type, file_name, file_size, file_data, file_path,
           featured, created_at
    FROM messages
"#;

pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: MessageRow) -> Result<Message> {
        Ok(Message {
            id: parse_id(&row.id)?,
            title: row.title,
            code: row.code,
            date: row.date,
            author: row.author,
            description: row.description,
            file: attachment_from_columns(
                row.file_content_type,
                row.file_name,
                row.file_size,
                row.file_data,
            ),
            file_path: row.file_path,
            featured: row.featured != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl Repository<Message> for SqliteMessageRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert(&self, message: &Message) -> Result<()> {
        let file = message.file.as_ref();
        let featured_int = if message.featured { 1i32 } else { 0i32 };

        sqlx::query(
            r#"
            INSERT INTO messages (
                id, title, code, date, author, description,
                file_content_type, file_name, file_size, file_data, file_path,
                featured, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(message.id.to_string())
        .bind(&message.title)
        .bind(&message.code)
        .bind(message.date)
        .bind(&message.author)
        .bind(&message.description)
        .bind(file.map(|f| f.content_type.as_str()))
        .bind(file.map(|f| f.filename.as_str()))
        .bind(file.map(|f| f.size))
        .bind(file.map(|f| f.data.as_slice()))
        .bind(&message.file_path)
        .bind(featured_int)
        .bind(message.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_message).transpose()
    }

    async fn list(&self) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "{} ORDER BY featured DESC, date DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_message)
            .collect()
    }

    async fn replace(&self, message: &Message) -> Result<bool> {
        let file = message.file.as_ref();
        let featured_int = if message.featured { 1i32 } else { 0i32 };

        let result = sqlx::query(
            r#"
            UPDATE messages
            SET title = ?, code = ?, date = ?, author = ?, description = ?,
                file_content_type = ?, file_name = ?, file_size = ?, file_data = ?,
                file_path = ?, featured = ?
            WHERE id = ?
            "#
        )
        .bind(&message.title)
        .bind(&message.code)
        .bind(message.date)
        .bind(&message.author)
        .bind(&message.description)
        .bind(file.map(|f| f.content_type.as_str()))
        .bind(file.map(|f| f.filename.as_str()))
        .bind(file.map(|f| f.size))
        .bind(file.map(|f| f.data.as_slice()))
        .bind(&message.file_path)
        .bind(featured_int)
        .bind(message.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_featured_exclusive(&self, id: Uuid) -> Result<bool> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await?;

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE id = ?")
            .bind(&id_str)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE messages SET featured = 0 WHERE featured != 0")
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE messages SET featured = 1 WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
