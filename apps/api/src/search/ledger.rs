//! Rejection ledger: the permanent `(fingerprint, external_id)` memory of items a
//! profile has already turned down. Rows are only ever inserted.

use std::collections::HashSet;

use sqlx::PgExecutor;

use crate::search::fingerprint::ProfileFingerprint;

/// Records rejections for a fingerprint. Pairs that already exist are skipped, including
/// duplicates within `external_ids` itself. Rows go in ascending id order so concurrent
/// runs lock keys in the same order. Returns the number of new rows.
pub async fn record_rejections<'e, E>(
    executor: E,
    fingerprint: &ProfileFingerprint,
    external_ids: &[String],
) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    if external_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO filtered_items (profile_fingerprint, external_id)
        SELECT $1, t.external_id
        FROM UNNEST($2::text[]) AS t(external_id)
        ORDER BY t.external_id
        ON CONFLICT (profile_fingerprint, external_id) DO NOTHING
        "#,
    )
    .bind(fingerprint.as_str())
    .bind(external_ids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Every external id ever rejected under this fingerprint.
pub async fn lookup_rejected<'e, E>(
    executor: E,
    fingerprint: &ProfileFingerprint,
) -> Result<HashSet<String>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT external_id FROM filtered_items WHERE profile_fingerprint = $1",
    )
    .bind(fingerprint.as_str())
    .fetch_all(executor)
    .await?;

    Ok(ids.into_iter().collect())
}
