use serde::{Deserialize, Serialize};

use crate::catalog::CatalogQuery;
use crate::config::CatalogConfig;

const DEFAULT_PAGE_LENGTH: i64 = 50;

/// 2^53: beyond this an `f64` no longer holds every integer, and casts may saturate.
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A raw form value. Browsers and scripts send the same field as a number, a numeric
/// string, or a boolean depending on the widget, so every form field accepts all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FormValue {
    /// Finite numeric reading of the value. Blank or non-numeric text yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            FormValue::Number(n) => *n,
            FormValue::Text(s) => s.trim().parse::<f64>().ok()?,
            FormValue::Flag(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Integer reading, truncated toward zero. `None` past `MAX_EXACT_INTEGER`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64()
            .map(f64::trunc)
            .filter(|n| n.abs() < MAX_EXACT_INTEGER)
            .map(|n| n as i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Flag(b) => Some(*b),
            FormValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            FormValue::Number(n) => Some(*n != 0.0),
        }
    }

    /// Textual reading; integral numbers print without a fractional part.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FormValue::Text(s) => Some(s.clone()),
            FormValue::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
                Some(format!("{}", *n as i64))
            }
            FormValue::Number(n) => Some(n.to_string()),
            FormValue::Flag(_) => None,
        }
    }
}

/// The search form as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    pub category: Option<FormValue>,
    pub shipping_offered: Option<FormValue>,
    pub filter: Option<String>,
    pub miles: Option<FormValue>,
    pub search_text: Option<String>,
    pub zip: Option<FormValue>,
    pub page_length: Option<FormValue>,
    pub min_profit: Option<FormValue>,
    pub budget: Option<FormValue>,
    pub time_remaining_days: Option<FormValue>,
    pub time_remaining_hours: Option<FormValue>,
}

/// The subset of form fields that decides whether two searches are "the same"
/// for rejection purposes. Catalog-only fields (category, text, filter) are excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchProfile {
    pub miles: Option<FormValue>,
    pub zip: Option<FormValue>,
    pub min_profit: Option<FormValue>,
    pub budget: Option<FormValue>,
    pub time_remaining_days: Option<FormValue>,
    pub time_remaining_hours: Option<FormValue>,
}

impl SearchProfile {
    /// Budget ceiling for classification; `None` means unbounded.
    pub fn budget_ceiling(&self) -> Option<f64> {
        self.budget.as_ref().and_then(FormValue::as_f64)
    }
}

impl SearchForm {
    pub fn profile(&self) -> SearchProfile {
        SearchProfile {
            miles: self.miles.clone(),
            zip: self.zip.clone(),
            min_profit: self.min_profit.clone(),
            budget: self.budget.clone(),
            time_remaining_days: self.time_remaining_days.clone(),
            time_remaining_hours: self.time_remaining_hours.clone(),
        }
    }

    /// Builds `LotSearch` variables from the form plus configured catalog defaults.
    pub fn catalog_query(&self, config: &CatalogConfig) -> CatalogQuery {
        CatalogQuery {
            page_number: 1,
            page_length: self
                .page_length
                .as_ref()
                .and_then(FormValue::as_i64)
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PAGE_LENGTH),
            category: self.category.as_ref().and_then(FormValue::as_i64),
            search_text: non_blank(self.search_text.clone()),
            zip: non_blank(self.zip.as_ref().and_then(FormValue::as_text)),
            miles: self.miles.as_ref().and_then(FormValue::as_i64),
            shipping_offered: self
                .shipping_offered
                .as_ref()
                .and_then(FormValue::as_bool)
                .unwrap_or(false),
            status: Some(config.lot_status.clone()),
            sort_order: Some(config.sort_order.clone()),
            filter: non_blank(self.filter.clone()),
            count_as_view: true,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
