use async_trait::async_trait;
use sqlx::PgConnection;

use crate::pagination::models::PageRow;

/// Read access to the accepted items of a search run, ordered by `processed_item_id`.
///
/// The pagers only ever use these range and count primitives, so the Postgres store
/// and the in-memory test store must agree on them exactly.
#[async_trait]
pub trait ProcessedItemStore: Send {
    async fn count_total(&mut self, search_id: i64) -> Result<i64, sqlx::Error>;

    /// Rows with id strictly greater than `after` (all rows when `None`).
    async fn count_after(&mut self, search_id: i64, after: Option<i64>) -> Result<i64, sqlx::Error>;

    /// Rows with id strictly less than `before` (all rows when `None`).
    async fn count_before(&mut self, search_id: i64, before: Option<i64>) -> Result<i64, sqlx::Error>;

    /// Ascending rows after `after`.
    async fn rows_after(
        &mut self,
        search_id: i64,
        after: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error>;

    /// Descending rows before `before`.
    async fn rows_before(
        &mut self,
        search_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error>;

    /// Ascending rows skipping the first `offset`.
    async fn rows_at_offset(
        &mut self,
        search_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error>;

    /// Ascending rows with id `>= start_id`.
    async fn rows_from(
        &mut self,
        search_id: i64,
        start_id: i64,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error>;
}

/// Postgres-backed store borrowing one pooled connection for the duration of a request.
pub struct PgProcessedItemStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgProcessedItemStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

const ROW_COLUMNS: &str = r#"
    SELECT pi.processed_item_id, pi.external_id, i.item_url, i.image_urls
    FROM processed_items pi
    JOIN items i ON i.external_id = pi.external_id
"#;

#[async_trait]
impl ProcessedItemStore for PgProcessedItemStore<'_> {
    async fn count_total(&mut self, search_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM processed_items WHERE search_id = $1")
            .bind(search_id)
            .fetch_one(&mut *self.conn)
            .await
    }

    async fn count_after(&mut self, search_id: i64, after: Option<i64>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM processed_items
            WHERE search_id = $1 AND ($2::BIGINT IS NULL OR processed_item_id > $2)
            "#,
        )
        .bind(search_id)
        .bind(after)
        .fetch_one(&mut *self.conn)
        .await
    }

    async fn count_before(&mut self, search_id: i64, before: Option<i64>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM processed_items
            WHERE search_id = $1 AND ($2::BIGINT IS NULL OR processed_item_id < $2)
            "#,
        )
        .bind(search_id)
        .bind(before)
        .fetch_one(&mut *self.conn)
        .await
    }

    async fn rows_after(
        &mut self,
        search_id: i64,
        after: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        let sql = format!(
            "{ROW_COLUMNS}
            WHERE pi.search_id = $1 AND ($2::BIGINT IS NULL OR pi.processed_item_id > $2)
            ORDER BY pi.processed_item_id ASC
            LIMIT $3"
        );
        sqlx::query_as::<_, PageRow>(&sql)
            .bind(search_id)
            .bind(after)
            .bind(limit)
            .fetch_all(&mut *self.conn)
            .await
    }

    async fn rows_before(
        &mut self,
        search_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        let sql = format!(
            "{ROW_COLUMNS}
            WHERE pi.search_id = $1 AND ($2::BIGINT IS NULL OR pi.processed_item_id < $2)
            ORDER BY pi.processed_item_id DESC
            LIMIT $3"
        );
        sqlx::query_as::<_, PageRow>(&sql)
            .bind(search_id)
            .bind(before)
            .bind(limit)
            .fetch_all(&mut *self.conn)
            .await
    }

    async fn rows_at_offset(
        &mut self,
        search_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        let sql = format!(
            "{ROW_COLUMNS}
            WHERE pi.search_id = $1
            ORDER BY pi.processed_item_id ASC
            LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PageRow>(&sql)
            .bind(search_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *self.conn)
            .await
    }

    async fn rows_from(
        &mut self,
        search_id: i64,
        start_id: i64,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        let sql = format!(
            "{ROW_COLUMNS}
            WHERE pi.search_id = $1 AND pi.processed_item_id >= $2
            ORDER BY pi.processed_item_id ASC
            LIMIT $3"
        );
        sqlx::query_as::<_, PageRow>(&sql)
            .bind(search_id)
            .bind(start_id)
            .bind(limit)
            .fetch_all(&mut *self.conn)
            .await
    }
}
