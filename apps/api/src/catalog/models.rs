use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const ITEM_URL_BASE: &str = "https://hibid.com/lot";

// ────────────────────────────────────────────────────────────────────────────
// Raw catalog records (as returned by the GraphQL endpoint)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    #[serde(deserialize_with = "external_id")]
    pub id: String,
    pub item_id: Option<i64>,
    pub lead: Option<String>,
    pub description: Option<String>,
    pub picture_count: Option<i64>,
    pub featured_picture: Option<Picture>,
    pub pictures: Option<Vec<Picture>>,
    pub auction: Option<Auction>,
    pub lot_state: Option<LotState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picture {
    pub description: Option<String>,
    pub full_size_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub bid_open_date_time: Option<String>,
    pub bid_close_date_time: Option<String>,
    pub buyer_premium: Option<String>,
    pub bid_increments: Option<Value>,
    pub auction_options: Option<AuctionOptions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionOptions {
    pub shipping_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotState {
    pub bid_count: Option<i64>,
    pub buy_now: Option<f64>,
    pub high_bid: Option<f64>,
    pub is_closed: Option<bool>,
    pub min_bid: Option<f64>,
    pub status: Option<String>,
    pub time_left: Option<String>,
}

/// Lot ids arrive as integers from the catalog but are opaque strings everywhere else.
fn external_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Int(i64),
        Text(String),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Int(n) => n.to_string(),
        IdRepr::Text(s) => s,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Flattened item shape returned to clients
// ────────────────────────────────────────────────────────────────────────────

/// A catalog lot flattened into the shape the client renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub external_id: String,
    pub item_url: String,
    pub image_urls: Vec<String>,
    pub lead: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub picture_count: Option<i64>,
    pub shipping_type: Option<String>,
    pub item_id: Option<i64>,
    pub bid_increments: Option<Value>,
    pub bid_open_date_time: Option<String>,
    pub bid_close_date_time: Option<String>,
    pub buyer_premium: Option<String>,
    pub bid_count: Option<i64>,
    pub buy_now_price: Option<f64>,
    pub high_bid: Option<f64>,
    pub auction_closed: Option<bool>,
    pub min_bid: Option<f64>,
    pub auction_status: Option<String>,
    pub time_left: Option<String>,
}

impl From<Lot> for CatalogItem {
    fn from(lot: Lot) -> Self {
        let item_url = build_item_url(lot.lead.as_deref(), &lot.id).unwrap_or_default();
        let image_urls = lot
            .pictures
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.full_size_location)
            .collect();
        let auction = lot.auction.unwrap_or_default();
        let state = lot.lot_state.unwrap_or_default();

        CatalogItem {
            external_id: lot.id,
            item_url,
            image_urls,
            lead: lot.lead,
            title: lot.featured_picture.and_then(|p| p.description),
            description: lot.description,
            picture_count: lot.picture_count,
            shipping_type: auction.auction_options.and_then(|o| o.shipping_type),
            item_id: lot.item_id,
            bid_increments: auction.bid_increments,
            bid_open_date_time: auction.bid_open_date_time,
            bid_close_date_time: auction.bid_close_date_time,
            buyer_premium: auction.buyer_premium,
            bid_count: state.bid_count,
            buy_now_price: state.buy_now,
            high_bid: state.high_bid,
            auction_closed: state.is_closed,
            min_bid: state.min_bid,
            auction_status: state.status,
            time_left: state.time_left,
        }
    }
}

/// Builds the public lot URL, e.g. `https://hibid.com/lot/255310167/--hard-cover?ref=lot-list`.
/// Every character of the lowercased lead outside `[a-z0-9]` becomes `-`.
pub fn build_item_url(lead: Option<&str>, lot_id: &str) -> Option<String> {
    let lead = lead.filter(|l| !l.is_empty())?;
    if lot_id.is_empty() {
        return None;
    }
    let slug: String = lead
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect();
    Some(format!("{ITEM_URL_BASE}/{lot_id}/{slug}?ref=lot-list"))
}

// ────────────────────────────────────────────────────────────────────────────
// Query variables
// ────────────────────────────────────────────────────────────────────────────

/// Variables for the `LotSearch` operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub page_number: i64,
    pub page_length: i64,
    pub category: Option<i64>,
    pub search_text: Option<String>,
    pub zip: Option<String>,
    pub miles: Option<i64>,
    pub shipping_offered: bool,
    pub status: Option<String>,
    pub sort_order: Option<String>,
    pub filter: Option<String>,
    pub count_as_view: bool,
}
