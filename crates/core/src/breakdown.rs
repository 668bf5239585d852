//! Per-segment and per-product breakdowns.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::aggregate::{count_by, group_by, percent, ratio, round_money, top_n, GroupStats};
use crate::dataset::DatasetView;
use crate::filter::Dimension;
use crate::limits::ALL_CATEGORIES;
use crate::records::Session;

/// Conversion figures for one channel or device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionBreakdown {
    pub key: String,
    pub sessions: u64,
    pub orders: u64,
    pub converted_sessions: u64,
    /// Converted sessions as a percentage of sessions
    pub conversion_rate: f64,
}

/// Sales figures for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub product_id: String,
    pub product_name: String,
    pub sales_count: u64,
    pub total_revenue: f64,
    pub total_margin: f64,
    /// Percentage of this product's orders that were refunded
    pub refund_rate: f64,
}

/// Average order value within one product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAov {
    pub category: String,
    /// Distinct orders with at least one item in the category
    pub orders: u64,
    pub revenue: f64,
    pub average_order_value: f64,
}

/// A channel and how many of its orders were refunded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCount {
    pub segment: String,
    pub count: u64,
}

fn dimension_key(session: &Session, dimension: Dimension) -> &str {
    match dimension {
        Dimension::Channel => &session.channel,
        Dimension::Device => &session.device_type,
    }
}

/// Session counts per channel or device.
pub fn sessions_by(view: &DatasetView<'_>, dimension: Dimension) -> BTreeMap<String, u64> {
    count_by(view.sessions.iter(), |s| dimension_key(s, dimension).to_string())
}

/// Sessions, orders and conversion per channel or device, best converting first.
///
/// Orders whose session is not in the view are not attributed to any segment.
pub fn conversion_by(view: &DatasetView<'_>, dimension: Dimension) -> Vec<ConversionBreakdown> {
    let session_keys: HashMap<&str, &str> = view
        .sessions
        .iter()
        .copied()
        .map(|s| (s.session_id.as_str(), dimension_key(s, dimension)))
        .collect();

    let sessions = count_by(view.sessions.iter().copied(), |s| dimension_key(*s, dimension));
    let orders = count_by(
        view.orders
            .iter()
            .filter_map(|o| session_keys.get(o.session_id.as_str()).copied()),
        |key| *key,
    );

    let converted_ids = view.converted_session_ids();
    let converted = count_by(
        view.sessions
            .iter()
            .copied()
            .filter(|s| converted_ids.contains(s.session_id.as_str())),
        |s| dimension_key(*s, dimension),
    );

    let mut rows: Vec<ConversionBreakdown> = sessions
        .iter()
        .map(|(key, &count)| {
            let converted_sessions = converted.get(key).copied().unwrap_or(0);
            ConversionBreakdown {
                key: key.to_string(),
                sessions: count,
                orders: orders.get(key).copied().unwrap_or(0),
                converted_sessions,
                conversion_rate: percent(converted_sessions as f64, count as f64),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.conversion_rate
            .total_cmp(&a.conversion_rate)
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}

/// Order count, revenue and average order value per channel.
///
/// Orders from unknown sessions are grouped under "Unattributed".
pub fn revenue_by_channel(view: &DatasetView<'_>) -> BTreeMap<String, GroupStats> {
    group_by(
        view.orders.iter(),
        |o| view.order_channel(o).unwrap_or("Unattributed").to_string(),
        |o| o.value,
    )
    .into_iter()
    .map(|(k, v)| (k, v.rounded()))
    .collect()
}

/// Channels with the most refunded orders.
pub fn at_risk_segments(view: &DatasetView<'_>, n: usize) -> Vec<SegmentCount> {
    let refunded = view.refunded_order_ids();
    let counts = count_by(
        view.orders
            .iter()
            .filter(|o| refunded.contains(o.order_id.as_str())),
        |o| view.order_channel(o).unwrap_or("Unattributed").to_string(),
    );

    top_n(&counts, n)
        .into_iter()
        .map(|(segment, count)| SegmentCount { segment, count })
        .collect()
}

/// Average order value per product category, highest first.
///
/// An order counts once in every category it has items in, with only those
/// items' revenue. A view with orders but no line items yields a single
/// "All Categories" row over order values.
pub fn aov_by_category(view: &DatasetView<'_>) -> Vec<CategoryAov> {
    if view.items.is_empty() {
        if view.orders.is_empty() {
            return Vec::new();
        }
        let stats: GroupStats = view.orders.iter().map(|o| o.value).collect();
        return vec![CategoryAov {
            category: ALL_CATEGORIES.to_string(),
            orders: stats.count,
            revenue: round_money(stats.sum),
            average_order_value: round_money(stats.mean),
        }];
    }

    let mut categories: BTreeMap<&str, (HashSet<&str>, f64)> = BTreeMap::new();
    for item in &view.items {
        let entry = categories
            .entry(view.dataset.product_category(&item.product_id))
            .or_default();
        entry.0.insert(item.order_id.as_str());
        entry.1 += item.price;
    }

    let mut rows: Vec<CategoryAov> = categories
        .into_iter()
        .map(|(category, (orders, revenue))| CategoryAov {
            category: category.to_string(),
            orders: orders.len() as u64,
            revenue: round_money(revenue),
            average_order_value: round_money(ratio(revenue, orders.len() as f64)),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.average_order_value
            .total_cmp(&a.average_order_value)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

/// Line-item sales per product, highest revenue first.
pub fn product_performance(view: &DatasetView<'_>) -> Vec<ProductPerformance> {
    let refunded = view.refunded_order_ids();

    let revenue = group_by(view.items.iter(), |i| i.product_id.clone(), |i| i.price);
    let margin = group_by(view.items.iter(), |i| i.product_id.clone(), |i| i.margin());

    let mut orders_per_product: HashMap<&str, HashSet<&str>> = HashMap::new();
    for item in &view.items {
        orders_per_product
            .entry(item.product_id.as_str())
            .or_default()
            .insert(item.order_id.as_str());
    }

    let mut rows: Vec<ProductPerformance> = revenue
        .iter()
        .map(|(product_id, stats)| {
            let orders = orders_per_product
                .get(product_id.as_str())
                .map(|ids| (ids.len(), ids.iter().filter(|id| refunded.contains(*id)).count()))
                .unwrap_or((0, 0));
            ProductPerformance {
                product_id: product_id.clone(),
                product_name: view.dataset.product_name(product_id).to_string(),
                sales_count: stats.count,
                total_revenue: round_money(stats.sum),
                total_margin: round_money(margin.get(product_id).map_or(0.0, |m| m.sum)),
                refund_rate: percent(orders.1 as f64, orders.0 as f64),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    rows
}
