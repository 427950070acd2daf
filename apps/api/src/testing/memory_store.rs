use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::pagination::models::PageRow;
use crate::pagination::store::ProcessedItemStore;
use crate::testing::page_row;

/// `ProcessedItemStore` over a sorted map, mirroring the Postgres queries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// `(search_id, processed_item_id)` → external id.
    rows: BTreeMap<(i64, i64), String>,
    fail_next: bool,
}

impl MemoryStore {
    pub fn with_rows(search_id: i64, ids: &[i64]) -> Self {
        let mut store = Self::default();
        store.insert_rows(search_id, ids);
        store
    }

    pub fn insert_rows(&mut self, search_id: i64, ids: &[i64]) {
        for &id in ids {
            self.rows.insert((search_id, id), format!("ext-{id}"));
        }
    }

    /// The next store call fails as if the pool were exhausted.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    fn check(&mut self) -> Result<(), sqlx::Error> {
        if std::mem::take(&mut self.fail_next) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }

    /// Ascending rows of one search matching `keep`.
    fn select(&self, search_id: i64, keep: impl Fn(i64) -> bool) -> Vec<PageRow> {
        self.rows
            .range((search_id, i64::MIN)..=(search_id, i64::MAX))
            .filter(|((_, id), _)| keep(*id))
            .map(|((_, id), ext)| page_row(*id, ext))
            .collect()
    }
}

fn take(rows: Vec<PageRow>, limit: i64) -> Vec<PageRow> {
    rows.into_iter().take(limit.max(0) as usize).collect()
}

#[async_trait]
impl ProcessedItemStore for MemoryStore {
    async fn count_total(&mut self, search_id: i64) -> Result<i64, sqlx::Error> {
        self.check()?;
        Ok(self.select(search_id, |_| true).len() as i64)
    }

    async fn count_after(&mut self, search_id: i64, after: Option<i64>) -> Result<i64, sqlx::Error> {
        self.check()?;
        Ok(self
            .select(search_id, |id| after.map_or(true, |a| id > a))
            .len() as i64)
    }

    async fn count_before(&mut self, search_id: i64, before: Option<i64>) -> Result<i64, sqlx::Error> {
        self.check()?;
        Ok(self
            .select(search_id, |id| before.map_or(true, |b| id < b))
            .len() as i64)
    }

    async fn rows_after(
        &mut self,
        search_id: i64,
        after: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        self.check()?;
        let rows = self.select(search_id, |id| after.map_or(true, |a| id > a));
        Ok(take(rows, limit))
    }

    async fn rows_before(
        &mut self,
        search_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        self.check()?;
        let mut rows = self.select(search_id, |id| before.map_or(true, |b| id < b));
        rows.reverse();
        Ok(take(rows, limit))
    }

    async fn rows_at_offset(
        &mut self,
        search_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        self.check()?;
        let rows = self.select(search_id, |_| true);
        Ok(take(rows.into_iter().skip(offset.max(0) as usize).collect(), limit))
    }

    async fn rows_from(
        &mut self,
        search_id: i64,
        start_id: i64,
        limit: i64,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        self.check()?;
        let rows = self.select(search_id, |id| id >= start_id);
        Ok(take(rows, limit))
    }
}
