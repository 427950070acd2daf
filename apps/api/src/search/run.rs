//! One search run: persist a fetched batch, classify it against the profile's
//! rejection memory, and record the outcome atomically.

use std::collections::HashSet;

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{error, info};

use crate::catalog::CatalogItem;
use crate::errors::AppError;
use crate::pagination::models::{page_count, Cursors, PageResponse};
use crate::search::classifier::{classify, exclude_known_rejections};
use crate::search::fingerprint::ProfileFingerprint;
use crate::search::ledger::{lookup_rejected, record_rejections};
use crate::search::params::SearchProfile;

/// An accepted item with the id it was stored under.
#[derive(Debug, Clone)]
pub struct AcceptedItem {
    pub processed_item_id: i64,
    pub item: CatalogItem,
}

#[derive(Debug, Clone)]
pub struct SearchRunOutcome {
    pub search_id: i64,
    pub fingerprint: ProfileFingerprint,
    /// In batch order, which is also ascending `processed_item_id` order.
    pub accepted: Vec<AcceptedItem>,
    /// Newly rejected in this run.
    pub rejected_count: usize,
    /// Skipped because the ledger already held them for this profile.
    pub previously_rejected: usize,
}

impl SearchRunOutcome {
    pub fn processed_ids(&self) -> Vec<i64> {
        self.accepted.iter().map(|a| a.processed_item_id).collect()
    }

    /// First page of the run. Cursors come from the stored ids of the returned items.
    pub fn first_page(&self, page_size: i64) -> PageResponse {
        let page: Vec<&AcceptedItem> = self
            .accepted
            .iter()
            .take(page_size.max(0) as usize)
            .collect();
        let cursors = match (page.first(), page.last()) {
            (Some(first), Some(last)) => Cursors {
                prev: Some(first.processed_item_id),
                next: Some(last.processed_item_id),
            },
            _ => Cursors::default(),
        };
        let total_items = self.accepted.len() as i64;

        PageResponse {
            return_items: page.into_iter().map(|a| a.item.clone()).collect(),
            cursors,
            total_items,
            page_count: page_count(total_items, page_size),
            search_id: self.search_id,
        }
    }
}

/// Runs the whole batch in one transaction. Nothing is visible unless every step succeeds.
pub async fn execute(
    pool: &PgPool,
    items: Vec<CatalogItem>,
    profile: &SearchProfile,
) -> Result<SearchRunOutcome, AppError> {
    let fingerprint = ProfileFingerprint::compute(profile);
    let items = dedupe_batch(items);

    let mut tx = pool.begin().await?;
    let result = persist(&mut *tx, items, fingerprint, profile.budget_ceiling()).await;
    let outcome = finish(tx, result).await?;

    info!(
        "Search run {} committed: {} accepted, {} rejected, {} previously rejected (profile {})",
        outcome.search_id,
        outcome.accepted.len(),
        outcome.rejected_count,
        outcome.previously_rejected,
        outcome.fingerprint
    );
    Ok(outcome)
}

/// Keeps the first occurrence of each external id.
pub fn dedupe_batch(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.external_id.clone()))
        .collect()
}

async fn persist(
    conn: &mut PgConnection,
    items: Vec<CatalogItem>,
    fingerprint: ProfileFingerprint,
    budget_ceiling: Option<f64>,
) -> Result<SearchRunOutcome, sqlx::Error> {
    save_item_references(conn, &items).await?;

    let search_id: i64 =
        sqlx::query_scalar("INSERT INTO searches DEFAULT VALUES RETURNING search_id")
            .fetch_one(&mut *conn)
            .await?;

    let known = lookup_rejected(&mut *conn, &fingerprint).await?;
    let (fresh, previously_rejected) = exclude_known_rejections(items, &known);
    let classification = classify(fresh, budget_ceiling);

    let rejected_ids: Vec<String> = classification
        .rejected
        .iter()
        .map(|item| item.external_id.clone())
        .collect();
    record_rejections(&mut *conn, &fingerprint, &rejected_ids).await?;

    let mut accepted = Vec::with_capacity(classification.accepted.len());
    for item in classification.accepted {
        let processed_item_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO processed_items (search_id, external_id)
            VALUES ($1, $2)
            RETURNING processed_item_id
            "#,
        )
        .bind(search_id)
        .bind(&item.external_id)
        .fetch_one(&mut *conn)
        .await?;
        accepted.push(AcceptedItem {
            processed_item_id,
            item,
        });
    }

    Ok(SearchRunOutcome {
        search_id,
        fingerprint,
        accepted,
        rejected_count: rejected_ids.len(),
        previously_rejected: previously_rejected.len(),
    })
}

/// Stores reference data for items seen for the first time. Known items are left as-is.
///
/// One statement, keys in ascending `external_id` order: concurrent runs that share new
/// items then wait on each other in the same order instead of deadlocking.
async fn save_item_references(
    conn: &mut PgConnection,
    items: &[CatalogItem],
) -> Result<(), sqlx::Error> {
    if items.is_empty() {
        return Ok(());
    }

    let mut sorted: Vec<&CatalogItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.external_id.cmp(&b.external_id));

    let mut external_ids = Vec::with_capacity(sorted.len());
    let mut item_urls = Vec::with_capacity(sorted.len());
    let mut leads = Vec::with_capacity(sorted.len());
    let mut image_urls = Vec::with_capacity(sorted.len());
    for item in sorted {
        external_ids.push(item.external_id.clone());
        item_urls.push(item.item_url.clone());
        leads.push(item.lead.clone());
        image_urls.push(
            serde_json::to_string(&item.image_urls)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?,
        );
    }

    sqlx::query(
        r#"
        INSERT INTO items (external_id, item_url, lead, image_urls)
        SELECT t.external_id, t.item_url, t.lead, t.image_urls::jsonb
        FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[])
            AS t(external_id, item_url, lead, image_urls)
        ORDER BY t.external_id
        ON CONFLICT (external_id) DO NOTHING
        "#,
    )
    .bind(&external_ids)
    .bind(&item_urls)
    .bind(&leads)
    .bind(&image_urls)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Commits on success; on failure rolls back explicitly and reports the failed step.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, sqlx::Error>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            error!("Search run failed, rolling back: {err}");
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed: {rollback_err}");
            }
            Err(AppError::Database(err))
        }
    }
}
