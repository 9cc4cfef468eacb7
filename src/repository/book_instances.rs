//! Book instances repository for PostgreSQL

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use super::BookInstanceStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInstance, BookInstanceDetail, BookInstanceFields, BookInstanceStatus},
};

const SELECT_WITH_BOOK: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.status, bi.due_back,
           b.title AS book_title
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
"#;

/// Row of `book_instances`
#[derive(Debug, FromRow)]
struct BookInstanceRow {
    id: Uuid,
    book_id: String,
    imprint: String,
    status: String,
    due_back: Option<NaiveDate>,
}

/// Row of `book_instances` joined with the book title
#[derive(Debug, FromRow)]
struct BookInstanceDetailRow {
    id: Uuid,
    book_id: String,
    imprint: String,
    status: String,
    due_back: Option<NaiveDate>,
    book_title: Option<String>,
}

fn parse_status(raw: &str) -> AppResult<BookInstanceStatus> {
    raw.parse()
        .map_err(|e| AppError::Internal(format!("corrupt book_instances row: {}", e)))
}

impl TryFrom<BookInstanceRow> for BookInstance {
    type Error = AppError;

    fn try_from(row: BookInstanceRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            book_id: row.book_id,
            imprint: row.imprint,
            status: parse_status(&row.status)?,
            due_back: row.due_back,
        })
    }
}

impl TryFrom<BookInstanceDetailRow> for BookInstanceDetail {
    type Error = AppError;

    fn try_from(row: BookInstanceDetailRow) -> AppResult<Self> {
        let book = row.book_title.map(|title| Book {
            id: row.book_id.clone(),
            title,
        });
        Ok(Self {
            id: row.id,
            book_id: row.book_id,
            book,
            imprint: row.imprint,
            status: parse_status(&row.status)?,
            due_back: row.due_back,
        })
    }
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn find_all(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let query = format!("{} ORDER BY bi.created_at, bi.id", SELECT_WITH_BOOK);
        let rows = sqlx::query_as::<_, BookInstanceDetailRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(BookInstanceDetail::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let query = format!("{} WHERE bi.id = $1", SELECT_WITH_BOOK);
        sqlx::query_as::<_, BookInstanceDetailRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookInstanceDetail::try_from)
            .transpose()
    }

    async fn create(&self, fields: &BookInstanceFields) -> AppResult<BookInstance> {
        let row = sqlx::query_as::<_, BookInstanceRow>(
            r#"
            INSERT INTO book_instances (book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4)
            RETURNING id, book_id, imprint, status, due_back
            "#,
        )
        .bind(&fields.book_id)
        .bind(&fields.imprint)
        .bind(fields.status.as_str())
        .bind(fields.due_back)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, id: Uuid, fields: &BookInstanceFields) -> AppResult<Option<BookInstance>> {
        sqlx::query_as::<_, BookInstanceRow>(
            r#"
            UPDATE book_instances
            SET book_id = $2, imprint = $3, status = $4, due_back = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, book_id, imprint, status, due_back
            "#,
        )
        .bind(id)
        .bind(&fields.book_id)
        .bind(&fields.imprint)
        .bind(fields.status.as_str())
        .bind(fields.due_back)
        .fetch_optional(&self.pool)
        .await?
        .map(BookInstance::try_from)
        .transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(%id, "delete matched no book instance");
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
