//! Turns raw export rows into a validated [`Dataset`].

use std::collections::{HashMap, HashSet};

use analytics_core::channel::{derive_channel, title_case, TrafficAttributes};
use analytics_core::limits::{
    DEFAULT_CHANNEL, DEFAULT_DEVICE, DEFAULT_REFUND_REASON, UNCATEGORIZED, UNKNOWN_PRODUCT,
};
use analytics_core::records::{FunnelStage, Order, OrderItem, Product, Refund, Session};
use analytics_core::schema::{
    is_bot_session, validate_order, validate_order_item, validate_refund, validate_session,
};
use analytics_core::Dataset;
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::loader::RawTables;
use crate::raw::{field, normalize_id, parse_flag, parse_number, parse_timestamp};

/// Host whose referrers count as internal navigation.
pub const DEFAULT_SITE_HOST: &str = "mavenfuzzyfactory.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanerConfig {
    pub site_host: String,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            site_host: DEFAULT_SITE_HOST.to_string(),
        }
    }
}

/// What the cleaner kept, filled in and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub malformed_rows: usize,

    pub sessions_in: usize,
    pub sessions_out: usize,
    pub duplicate_sessions: usize,
    pub invalid_sessions: usize,
    pub bot_sessions: usize,
    pub filled_traffic_sources: usize,

    pub pageviews_in: usize,
    pub unmatched_pageviews: usize,

    pub orders_in: usize,
    pub orders_out: usize,
    pub duplicate_orders: usize,
    pub invalid_orders: usize,
    pub negative_orders: usize,
    pub orders_before_session: usize,

    pub items_in: usize,
    pub items_out: usize,
    pub orphan_items: usize,
    pub invalid_items: usize,

    pub refunds_in: usize,
    pub refunds_out: usize,
    pub invalid_refunds: usize,
    pub refunds_unknown_order: usize,
    pub refunds_before_order: usize,
    pub refunds_exceeding_order: usize,
    pub filled_refund_reasons: usize,

    pub products_in: usize,
    pub products_out: usize,
    pub invalid_products: usize,
    pub duplicate_products: usize,
    pub unnamed_products: usize,
    pub filled_categories: usize,
}

impl CleaningReport {
    /// Rows removed across all tables (pageviews are folded, not dropped).
    pub fn rows_dropped(&self) -> usize {
        (self.sessions_in - self.sessions_out)
            + (self.orders_in - self.orders_out)
            + (self.items_in - self.items_out)
            + (self.refunds_in - self.refunds_out)
            + (self.products_in - self.products_out)
    }
}

/// Cleaned dataset and the report describing how it was produced.
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub dataset: Dataset,
    pub report: CleaningReport,
}

/// Applies the cleaning rules table by table.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: CleanerConfig,
}

impl DataCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Cleans every table and builds the dataset.
    pub fn clean(&self, raw: RawTables) -> CleanedData {
        let mut report = CleaningReport {
            malformed_rows: raw.malformed_rows,
            ..Default::default()
        };

        let mut sessions = self.clean_sessions(&raw, &mut report);
        fold_pageviews(&raw, &mut sessions, &mut report);
        let orders = clean_orders(&raw, &sessions, &mut report);
        let items = clean_items(&raw, &orders, &mut report);
        let products = clean_products(&raw, &mut report);
        let refunds = clean_refunds(&raw, &orders, &mut report);

        let dataset = Dataset::new(sessions, orders, items, products, refunds);

        let m = metrics();
        m.rows_dropped.inc_by(report.rows_dropped() as u64);
        m.dataset_rows.set(dataset.row_count() as u64);

        info!(
            sessions = report.sessions_out,
            orders = report.orders_out,
            items = report.items_out,
            refunds = report.refunds_out,
            products = report.products_out,
            dropped = report.rows_dropped(),
            "Cleaning complete"
        );

        CleanedData { dataset, report }
    }

    fn clean_sessions(&self, raw: &RawTables, report: &mut CleaningReport) -> Vec<Session> {
        report.sessions_in = raw.sessions.len();
        let mut seen = HashSet::new();
        let mut sessions = Vec::with_capacity(raw.sessions.len());

        for row in &raw.sessions {
            let Some(id) = field(&row.session_id).map(normalize_id) else {
                report.invalid_sessions += 1;
                continue;
            };
            if !seen.insert(id.clone()) {
                report.duplicate_sessions += 1;
                continue;
            }
            let Some(timestamp) = field(&row.timestamp).and_then(parse_timestamp) else {
                report.invalid_sessions += 1;
                continue;
            };

            let channel = field(&row.channel);
            let utm_source = field(&row.utm_source);
            if channel.is_none() && utm_source.is_none() {
                report.filled_traffic_sources += 1;
            }

            let session = Session {
                session_id: id,
                user_id: field(&row.user_id).map(normalize_id),
                timestamp,
                traffic_source: utm_source.or(channel).unwrap_or(DEFAULT_CHANNEL).to_string(),
                channel: derive_channel(
                    TrafficAttributes {
                        channel,
                        utm_source,
                        utm_campaign: field(&row.utm_campaign),
                        http_referer: field(&row.http_referer),
                    },
                    &self.config.site_host,
                ),
                device_type: field(&row.device_type)
                    .map(title_case)
                    .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
                duration_secs: field(&row.duration).and_then(parse_number),
                is_repeat: field(&row.repeat_session)
                    .and_then(parse_flag)
                    .unwrap_or(false),
                pageviews: field(&row.pageviews)
                    .and_then(parse_number)
                    .map(|n| n.max(0.0) as u32)
                    .unwrap_or(0),
                furthest_stage: FunnelStage::Sessions,
            };

            if let Err(e) = validate_session(&session) {
                debug!(error = %e, "Dropping session");
                report.invalid_sessions += 1;
                continue;
            }
            if is_bot_session(&session) {
                report.bot_sessions += 1;
                continue;
            }
            sessions.push(session);
        }

        report.sessions_out = sessions.len();
        log_table("sessions", report.sessions_in, report.sessions_out);
        if report.bot_sessions > 0 {
            info!(count = report.bot_sessions, "Removed bot sessions");
        }
        sessions
    }
}

/// Folds pageviews into per-session totals and furthest stage.
fn fold_pageviews(raw: &RawTables, sessions: &mut [Session], report: &mut CleaningReport) {
    report.pageviews_in = raw.pageviews.len();
    if raw.pageviews.is_empty() {
        return;
    }

    let index: HashMap<String, usize> = sessions
        .iter()
        .enumerate()
        .map(|(i, s)| (s.session_id.clone(), i))
        .collect();
    let mut counted = vec![0u32; sessions.len()];

    for row in &raw.pageviews {
        let slot = field(&row.session_id)
            .map(normalize_id)
            .and_then(|id| index.get(&id).copied());
        let Some(i) = slot else {
            report.unmatched_pageviews += 1;
            continue;
        };
        counted[i] += 1;
        if let Some(url) = field(&row.pageview_url) {
            let stage = FunnelStage::from_pageview_url(url);
            if stage > sessions[i].furthest_stage {
                sessions[i].furthest_stage = stage;
            }
        }
    }

    for (session, count) in sessions.iter_mut().zip(counted) {
        session.pageviews = session.pageviews.max(count);
    }

    if report.unmatched_pageviews > 0 {
        debug!(count = report.unmatched_pageviews, "Pageviews without a kept session");
    }
}

fn clean_orders(raw: &RawTables, sessions: &[Session], report: &mut CleaningReport) -> Vec<Order> {
    report.orders_in = raw.orders.len();
    let by_id: HashMap<&str, &Session> = sessions
        .iter()
        .map(|s| (s.session_id.as_str(), s))
        .collect();
    let mut seen = HashSet::new();
    let mut orders = Vec::with_capacity(raw.orders.len());

    for row in &raw.orders {
        let Some(id) = field(&row.order_id).map(normalize_id) else {
            report.invalid_orders += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            report.duplicate_orders += 1;
            continue;
        }
        let (Some(timestamp), Some(value)) = (
            field(&row.timestamp).and_then(parse_timestamp),
            field(&row.value).and_then(parse_number),
        ) else {
            report.invalid_orders += 1;
            continue;
        };
        if value < 0.0 {
            report.negative_orders += 1;
            continue;
        }

        let session_id = field(&row.session_id).map(normalize_id).unwrap_or_default();
        let session = by_id.get(session_id.as_str()).copied();

        let order = Order {
            order_id: id,
            user_id: field(&row.user_id)
                .map(normalize_id)
                .or_else(|| session.and_then(|s| s.user_id.clone())),
            session_id,
            timestamp,
            value,
            cogs: field(&row.cogs)
                .and_then(parse_number)
                .unwrap_or(0.0)
                .max(0.0),
            items_count: field(&row.items_count)
                .and_then(parse_number)
                .map(|n| n.max(1.0) as u32)
                .unwrap_or(1),
        };

        if session.is_some_and(|s| order.timestamp < s.timestamp) {
            report.orders_before_session += 1;
            continue;
        }
        if let Err(e) = validate_order(&order, session) {
            debug!(error = %e, "Dropping order");
            report.invalid_orders += 1;
            continue;
        }
        orders.push(order);
    }

    report.orders_out = orders.len();
    log_table("orders", report.orders_in, report.orders_out);
    if report.orders_before_session > 0 {
        warn!(count = report.orders_before_session, "Removed orders placed before their session");
    }
    orders
}

fn clean_items(raw: &RawTables, orders: &[Order], report: &mut CleaningReport) -> Vec<OrderItem> {
    report.items_in = raw.items.len();
    let order_ids: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(raw.items.len());

    for row in &raw.items {
        let (Some(id), Some(product_id)) = (
            field(&row.order_item_id).map(normalize_id),
            field(&row.product_id).map(normalize_id),
        ) else {
            report.invalid_items += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            report.invalid_items += 1;
            continue;
        }
        let order_id = field(&row.order_id).map(normalize_id).unwrap_or_default();
        if !order_ids.contains(order_id.as_str()) {
            report.orphan_items += 1;
            continue;
        }

        let item = OrderItem {
            order_item_id: id,
            order_id,
            product_id,
            price: field(&row.price).and_then(parse_number).unwrap_or(0.0).max(0.0),
            cogs: field(&row.cogs).and_then(parse_number).unwrap_or(0.0).max(0.0),
        };
        if let Err(e) = validate_order_item(&item) {
            debug!(error = %e, "Dropping order item");
            report.invalid_items += 1;
            continue;
        }
        items.push(item);
    }

    report.items_out = items.len();
    log_table("order_items", report.items_in, report.items_out);
    items
}

fn clean_products(raw: &RawTables, report: &mut CleaningReport) -> Vec<Product> {
    report.products_in = raw.products.len();
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(raw.products.len());

    for row in &raw.products {
        let Some(id) = field(&row.product_id).map(normalize_id) else {
            report.invalid_products += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            report.duplicate_products += 1;
            continue;
        }
        let name = match field(&row.product_name) {
            Some(name) => name.to_string(),
            None => {
                report.unnamed_products += 1;
                UNKNOWN_PRODUCT.to_string()
            }
        };
        let category = match field(&row.category) {
            Some(category) => category.to_string(),
            None => {
                report.filled_categories += 1;
                UNCATEGORIZED.to_string()
            }
        };
        products.push(Product {
            product_id: id,
            product_name: name,
            category,
            launched_at: field(&row.launched_at).and_then(parse_timestamp),
        });
    }

    report.products_out = products.len();
    log_table("products", report.products_in, report.products_out);
    if report.duplicate_products > 0 {
        warn!(count = report.duplicate_products, "Removed duplicate products");
    }
    products
}

fn clean_refunds(raw: &RawTables, orders: &[Order], report: &mut CleaningReport) -> Vec<Refund> {
    report.refunds_in = raw.refunds.len();
    let by_id: HashMap<&str, &Order> = orders.iter().map(|o| (o.order_id.as_str(), o)).collect();
    let mut refunded: HashMap<&str, f64> = HashMap::new();
    let mut seen = HashSet::new();
    let mut refunds = Vec::with_capacity(raw.refunds.len());

    for row in &raw.refunds {
        let (Some(id), Some(timestamp), Some(amount)) = (
            field(&row.refund_id).map(normalize_id),
            field(&row.timestamp).and_then(parse_timestamp),
            field(&row.amount).and_then(parse_number),
        ) else {
            report.invalid_refunds += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            report.invalid_refunds += 1;
            continue;
        }

        let order_id = field(&row.order_id).map(normalize_id).unwrap_or_default();
        let Some(order) = by_id.get(order_id.as_str()).copied() else {
            report.refunds_unknown_order += 1;
            continue;
        };

        let reason = field(&row.reason);
        let refund = Refund {
            refund_id: id,
            order_id,
            timestamp,
            amount: amount.max(0.0),
            reason: reason.unwrap_or(DEFAULT_REFUND_REASON).to_string(),
        };

        if refund.timestamp < order.timestamp {
            report.refunds_before_order += 1;
            continue;
        }
        let already = refunded.get(order.order_id.as_str()).copied().unwrap_or(0.0);
        if already + refund.amount > order.value {
            report.refunds_exceeding_order += 1;
            continue;
        }
        if let Err(e) = validate_refund(&refund, order) {
            debug!(error = %e, "Dropping refund");
            report.invalid_refunds += 1;
            continue;
        }

        if reason.is_none() {
            report.filled_refund_reasons += 1;
        }
        refunded.insert(order.order_id.as_str(), already + refund.amount);
        refunds.push(refund);
    }

    report.refunds_out = refunds.len();
    log_table("refunds", report.refunds_in, report.refunds_out);
    if report.refunds_exceeding_order > 0 {
        warn!(
            count = report.refunds_exceeding_order,
            "Removed refunds larger than their order value"
        );
    }
    refunds
}

fn log_table(table: &'static str, rows_in: usize, rows_out: usize) {
    if rows_in != rows_out {
        info!(table, rows_in, rows_out, removed = rows_in - rows_out, "Cleaned table");
    } else {
        debug!(table, rows = rows_out, "Cleaned table");
    }
}
