use std::collections::HashSet;

use crate::catalog::CatalogItem;

/// Result of partitioning a fetched batch. Every input item lands in exactly one list.
#[derive(Debug, Default)]
pub struct Classification {
    pub accepted: Vec<CatalogItem>,
    pub rejected: Vec<CatalogItem>,
}

/// Accepts an item iff its minimum bid fits under the budget ceiling.
/// No ceiling accepts everything; an item without a minimum bid cannot be shown to fit
/// a ceiling and is rejected.
pub fn classify(items: Vec<CatalogItem>, budget_ceiling: Option<f64>) -> Classification {
    let (accepted, rejected) = items
        .into_iter()
        .partition(|item| within_budget(item.min_bid, budget_ceiling));
    Classification { accepted, rejected }
}

fn within_budget(min_bid: Option<f64>, ceiling: Option<f64>) -> bool {
    match (min_bid, ceiling) {
        (_, None) => true,
        (Some(bid), Some(ceiling)) => bid <= ceiling,
        (None, Some(_)) => false,
    }
}

/// Splits off items already rejected for this profile. Returns `(fresh, known)`.
pub fn exclude_known_rejections(
    items: Vec<CatalogItem>,
    known_rejected: &HashSet<String>,
) -> (Vec<CatalogItem>, Vec<CatalogItem>) {
    items
        .into_iter()
        .partition(|item| !known_rejected.contains(&item.external_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, min_bid: Option<f64>) -> CatalogItem {
        CatalogItem {
            external_id: id.to_string(),
            min_bid,
            ..Default::default()
        }
    }

    fn ids(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.external_id.as_str()).collect()
    }

    #[test]
    fn test_partition_is_exact_and_ordered() {
        let batch = vec![
            item("a", Some(5.0)),
            item("b", Some(50.0)),
            item("c", Some(10.0)),
            item("d", Some(10.01)),
        ];
        let result = classify(batch, Some(10.0));
        assert_eq!(ids(&result.accepted), vec!["a", "c"]);
        assert_eq!(ids(&result.rejected), vec!["b", "d"]);
    }

    #[test]
    fn test_min_bid_equal_to_budget_is_accepted() {
        let result = classify(vec![item("a", Some(25.0))], Some(25.0));
        assert_eq!(result.accepted.len(), 1);
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn test_no_budget_accepts_everything() {
        let batch = vec![item("a", Some(1e9)), item("b", None)];
        let result = classify(batch, None);
        assert_eq!(ids(&result.accepted), vec!["a", "b"]);
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn test_zero_budget_is_a_real_ceiling() {
        let result = classify(vec![item("free", Some(0.0)), item("paid", Some(1.0))], Some(0.0));
        assert_eq!(ids(&result.accepted), vec!["free"]);
        assert_eq!(ids(&result.rejected), vec!["paid"]);
    }

    #[test]
    fn test_missing_min_bid_rejected_under_ceiling() {
        let result = classify(vec![item("a", None)], Some(100.0));
        assert_eq!(ids(&result.rejected), vec!["a"]);
    }

    #[test]
    fn test_exclude_known_rejections() {
        let known: HashSet<String> = ["b".to_string()].into_iter().collect();
        let (fresh, seen) = exclude_known_rejections(
            vec![item("a", Some(1.0)), item("b", Some(1.0)), item("c", Some(1.0))],
            &known,
        );
        assert_eq!(ids(&fresh), vec!["a", "c"]);
        assert_eq!(ids(&seen), vec!["b"]);
    }
}
