//! Rows exactly as they appear in CSV exports.
//!
//! Every field is an optional string so that a bad value in one column
//! never rejects the whole row at read time; the cleaner decides what to
//! keep. Aliases accept both the raw export vocabulary
//! (`website_session_id`, `created_at`, `price_usd`, ...) and the
//! normalized one (`session_id`, `timestamp`, `total_amount`, ...).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSession {
    #[serde(alias = "website_session_id")]
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(alias = "created_at")]
    pub timestamp: Option<String>,
    #[serde(alias = "is_repeat", alias = "is_repeat_session")]
    pub repeat_session: Option<String>,
    pub utm_source: Option<String>,
    pub utm_campaign: Option<String>,
    pub http_referer: Option<String>,
    pub channel: Option<String>,
    #[serde(alias = "device")]
    pub device_type: Option<String>,
    #[serde(alias = "session_duration", alias = "duration_secs")]
    pub duration: Option<String>,
    #[serde(alias = "page_views")]
    pub pageviews: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPageview {
    #[serde(alias = "website_pageview_id")]
    pub pageview_id: Option<String>,
    #[serde(alias = "website_session_id")]
    pub session_id: Option<String>,
    #[serde(alias = "timestamp")]
    pub created_at: Option<String>,
    pub pageview_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: Option<String>,
    #[serde(alias = "website_session_id")]
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(alias = "created_at", alias = "order_date")]
    pub timestamp: Option<String>,
    #[serde(alias = "price_usd", alias = "total_amount")]
    pub value: Option<String>,
    #[serde(alias = "cogs_usd")]
    pub cogs: Option<String>,
    #[serde(alias = "items_purchased")]
    pub items_count: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrderItem {
    pub order_item_id: Option<String>,
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    #[serde(alias = "price_usd")]
    pub price: Option<String>,
    #[serde(alias = "cogs_usd")]
    pub cogs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRefund {
    #[serde(alias = "order_item_refund_id")]
    pub refund_id: Option<String>,
    pub order_id: Option<String>,
    #[serde(alias = "created_at", alias = "refund_date")]
    pub timestamp: Option<String>,
    #[serde(alias = "refund_amount_usd", alias = "refund_amount")]
    pub amount: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    #[serde(alias = "product_category")]
    pub category: Option<String>,
    #[serde(alias = "created_at")]
    pub launched_at: Option<String>,
}

/// Trimmed value, or `None` when blank.
pub fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses export timestamps: RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`,
/// `YYYY-MM-DDTHH:MM:SS[.f]` or a bare date. Naive values are UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parses a finite number; integers written as floats (`"3.0"`) are accepted.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses `1`/`0`, `true`/`false` and `yes`/`no`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" | "y" => Some(true),
        "0" | "0.0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Normalizes numeric ids exported as floats (`"1234.0"` becomes `"1234"`).
pub fn normalize_id(value: &str) -> String {
    let value = value.trim();
    match value.strip_suffix(".0") {
        Some(int) if !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) => int.to_string(),
        _ => value.to_string(),
    }
}
