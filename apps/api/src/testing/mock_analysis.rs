use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::analysis::{AnalysisError, AnalysisService};
use crate::catalog::CatalogItem;

/// Records every batch it receives and answers with `{ "analyzed": [ids...] }`.
#[derive(Debug, Default)]
pub struct MockAnalysis {
    batches: RwLock<Vec<Vec<String>>>,
    fail: RwLock<bool>,
}

impl MockAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_all(&self) {
        *self.fail.write().await = true;
    }

    pub async fn batches(&self) -> Vec<Vec<String>> {
        self.batches.read().await.clone()
    }
}

#[async_trait]
impl AnalysisService for MockAnalysis {
    async fn analyze(&self, items: &[CatalogItem]) -> Result<Value, AnalysisError> {
        if *self.fail.read().await {
            return Err(AnalysisError::Api {
                status: 503,
                message: "analysis offline".to_string(),
            });
        }
        let ids: Vec<String> = items.iter().map(|i| i.external_id.clone()).collect();
        self.batches.write().await.push(ids.clone());
        Ok(json!({ "analyzed": ids }))
    }
}
