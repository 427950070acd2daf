use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::queries::{document, LOT_DETAILS_QUERY, LOT_SEARCH_QUERY};
use super::{CatalogClient, CatalogError, CatalogQuery, Lot};
use crate::config::CatalogConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a, V: Serialize> {
    operation_name: &'a str,
    query: String,
    variables: V,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlErrorBody>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LotSearchData {
    lot_search: LotSearchPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LotSearchPayload {
    paged_results: PagedResults,
}

#[derive(Debug, Deserialize)]
struct PagedResults {
    #[serde(default)]
    results: Vec<Lot>,
}

#[derive(Debug, Deserialize)]
struct LotDetailsData {
    lot: Option<LotDetailsPayload>,
}

#[derive(Debug, Deserialize)]
struct LotDetailsPayload {
    lot: Option<Lot>,
}

/// HTTP client for the catalog's GraphQL endpoint.
#[derive(Clone)]
pub struct GraphQlCatalogClient {
    client: Client,
    endpoint: String,
}

impl GraphQlCatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            endpoint: config.graphql_url.clone(),
        })
    }

    async fn execute<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T, CatalogError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest {
            operation_name: operation,
            query: document(query),
            variables,
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Catalog {operation} returned {status}");
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let parsed: GraphQlResponse<T> =
            serde_json::from_str(&text).map_err(|e| CatalogError::Parse(e.to_string()))?;

        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CatalogError::GraphQl(message));
        }

        debug!("Catalog {operation} succeeded");
        parsed
            .data
            .ok_or_else(|| CatalogError::Parse(format!("{operation} response had no data")))
    }
}

#[async_trait]
impl CatalogClient for GraphQlCatalogClient {
    async fn search_lots(&self, query: &CatalogQuery) -> Result<Vec<Lot>, CatalogError> {
        let data: LotSearchData = self.execute("LotSearch", LOT_SEARCH_QUERY, query).await?;
        Ok(data.lot_search.paged_results.results)
    }

    async fn fetch_lot(&self, external_id: &str) -> Result<Lot, CatalogError> {
        let variables = json!({
            "lotId": lot_id_variable(external_id),
            "countAsView": true,
        });
        let data: LotDetailsData = self
            .execute("GetLotDetails", LOT_DETAILS_QUERY, variables)
            .await?;

        data.lot
            .and_then(|l| l.lot)
            .ok_or_else(|| CatalogError::NotFound(external_id.to_string()))
    }
}

/// The catalog types lot ids as `Int`; pass numeric ids as numbers and anything else verbatim.
fn lot_id_variable(external_id: &str) -> Value {
    external_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(external_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lot_id_variable_prefers_numbers() {
        assert_eq!(lot_id_variable("255310167"), json!(255310167));
        assert_eq!(lot_id_variable("abc-1"), json!("abc-1"));
    }

    #[test]
    fn test_search_response_parses_nested_results() {
        let body = r#"{"data":{"lotSearch":{"pagedResults":{"totalCount":1,"results":[{"id":5,"lead":"Clock"}]}}}}"#;
        let parsed: GraphQlResponse<LotSearchData> = serde_json::from_str(body).unwrap();
        let results = parsed.data.unwrap().lot_search.paged_results.results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "5");
    }

    #[test]
    fn test_missing_lot_parses_as_none() {
        let body = r#"{"data":{"lot":{"lot":null}}}"#;
        let parsed: GraphQlResponse<LotDetailsData> = serde_json::from_str(body).unwrap();
        assert!(parsed.data.unwrap().lot.unwrap().lot.is_none());
    }
}
