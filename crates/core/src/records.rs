//! Cleaned record types the dashboard aggregates over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ordered stages of the purchase journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunnelStage {
    Sessions,
    Products,
    Cart,
    Shipping,
    Billing,
    Purchase,
}

impl FunnelStage {
    /// All stages in journey order.
    pub const ALL: [FunnelStage; 6] = [
        Self::Sessions,
        Self::Products,
        Self::Cart,
        Self::Shipping,
        Self::Billing,
        Self::Purchase,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sessions => "Sessions",
            Self::Products => "Products",
            Self::Cart => "Cart",
            Self::Shipping => "Shipping",
            Self::Billing => "Billing",
            Self::Purchase => "Purchase",
        }
    }

    /// Stage reached by viewing `url`.
    ///
    /// Landing pages (`/home`, `/lander-1`, ...) and anything unrecognised
    /// only count as a session. Product listing and product detail pages
    /// (`/the-original-mr-fuzzy`) count as browsing products.
    pub fn from_pageview_url(url: &str) -> FunnelStage {
        let path = url.trim().trim_end_matches('/');
        match path {
            "/cart" => Self::Cart,
            "/shipping" => Self::Shipping,
            p if p.starts_with("/billing") => Self::Billing,
            p if p.starts_with("/thank-you") => Self::Purchase,
            p if p.starts_with("/products") || p.starts_with("/the-") => Self::Products,
            _ => Self::Sessions,
        }
    }
}

/// A website session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Session {
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Raw traffic source (utm_source or "Direct")
    pub traffic_source: String,
    /// Marketing channel derived from source, campaign and referrer
    pub channel: String,
    pub device_type: String,
    /// Session length in seconds, when the export carries it
    #[validate(range(min = 0.0))]
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub is_repeat: bool,
    #[serde(default)]
    pub pageviews: u32,
    /// Deepest funnel stage seen in this session's pageviews
    pub furthest_stage: FunnelStage,
}

/// An order placed during a session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Order {
    #[validate(length(min = 1, max = 128))]
    pub order_id: String,
    pub session_id: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Order revenue in USD
    #[validate(range(min = 0.0))]
    pub value: f64,
    /// Cost of goods sold in USD
    #[validate(range(min = 0.0))]
    pub cogs: f64,
    #[validate(range(min = 1))]
    pub items_count: u32,
}

/// A single line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    #[validate(length(min = 1, max = 128))]
    pub order_item_id: String,
    pub order_id: String,
    pub product_id: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub cogs: f64,
}

impl OrderItem {
    pub fn margin(&self) -> f64 {
        self.price - self.cogs
    }
}

/// Catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub launched_at: Option<DateTime<Utc>>,
}

/// A refund against an order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Refund {
    #[validate(length(min = 1, max = 128))]
    pub refund_id: String,
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub reason: String,
}
