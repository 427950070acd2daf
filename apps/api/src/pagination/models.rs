use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::catalog::CatalogItem;

/// Paging direction relative to the client's current cursors.
/// The empty string is the initial request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    #[serde(rename = "")]
    Initial,
    Next,
    Prev,
}

/// First (`prev`) and last (`next`) `processed_item_id` of the page the client holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    pub prev: Option<i64>,
    pub next: Option<i64>,
}

impl Cursors {
    /// Cursors spanning `rows`, or `None` for an empty window.
    pub fn spanning(rows: &[PageRow]) -> Option<Self> {
        Some(Self {
            prev: Some(rows.first()?.processed_item_id),
            next: Some(rows.last()?.processed_item_id),
        })
    }
}

/// How the caller wants the next window chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Cursor { cursors: Cursors, direction: Direction },
    Number { page: i64 },
}

/// One accepted item joined with its stored reference data.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    pub processed_item_id: i64,
    pub external_id: String,
    pub item_url: String,
    pub image_urls: Json<Vec<String>>,
}

/// Rows chosen for a page plus the bookkeeping the client needs to ask for the next one.
#[derive(Debug, Clone)]
pub struct Window {
    pub search_id: i64,
    pub rows: Vec<PageRow>,
    pub cursors: Cursors,
    pub total_items: i64,
    pub page_count: i64,
}

impl Window {
    pub fn into_response(self, items: Vec<CatalogItem>) -> PageResponse {
        PageResponse {
            return_items: items,
            cursors: self.cursors,
            total_items: self.total_items,
            page_count: self.page_count,
            search_id: self.search_id,
        }
    }
}

/// Response body for both "submit a search" and "fetch a page".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub return_items: Vec<CatalogItem>,
    pub cursors: Cursors,
    pub total_items: i64,
    pub page_count: i64,
    pub search_id: i64,
}

/// `ceil(total / page_size)`, zero for an empty set.
pub fn page_count(total_items: i64, page_size: i64) -> i64 {
    total_items / page_size + i64::from(total_items % page_size > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(0, 13), 0);
        assert_eq!(page_count(13, 13), 1);
        assert_eq!(page_count(14, 13), 2);
        assert_eq!(page_count(3, 2), 2);
    }

    #[test]
    fn test_direction_wire_format() {
        assert_eq!(serde_json::from_str::<Direction>(r#""""#).unwrap(), Direction::Initial);
        assert_eq!(serde_json::from_str::<Direction>(r#""next""#).unwrap(), Direction::Next);
        assert_eq!(serde_json::from_str::<Direction>(r#""prev""#).unwrap(), Direction::Prev);
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = PageResponse {
            return_items: vec![],
            cursors: Cursors { prev: Some(1), next: Some(2) },
            total_items: 2,
            page_count: 1,
            search_id: 9,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["totalItems"], 2);
        assert_eq!(value["pageCount"], 1);
        assert_eq!(value["searchId"], 9);
        assert_eq!(value["cursors"]["next"], 2);
        assert!(value["returnItems"].as_array().unwrap().is_empty());
    }
}
