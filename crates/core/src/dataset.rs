//! In-memory tables and filtered views over them.

use std::collections::{HashMap, HashSet};

use crate::filter::DashboardFilter;
use crate::limits::{UNCATEGORIZED, UNKNOWN_PRODUCT};
use crate::records::{FunnelStage, Order, OrderItem, Product, Refund, Session};

/// Cleaned tables with lookup indexes.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    sessions: Vec<Session>,
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    products: Vec<Product>,
    refunds: Vec<Refund>,
    session_index: HashMap<String, usize>,
    order_index: HashMap<String, usize>,
    product_names: HashMap<String, String>,
    product_categories: HashMap<String, String>,
}

impl Dataset {
    /// Builds the dataset and its indexes.
    ///
    /// A session with at least one order has reached the purchase stage
    /// even if its pageviews were not exported.
    pub fn new(
        mut sessions: Vec<Session>,
        orders: Vec<Order>,
        items: Vec<OrderItem>,
        products: Vec<Product>,
        refunds: Vec<Refund>,
    ) -> Self {
        let ordered: HashSet<&str> = orders.iter().map(|o| o.session_id.as_str()).collect();
        for session in sessions.iter_mut() {
            if ordered.contains(session.session_id.as_str()) {
                session.furthest_stage = FunnelStage::Purchase;
            }
        }

        let session_index = sessions
            .iter()
            .enumerate()
            .map(|(i, s)| (s.session_id.clone(), i))
            .collect();
        let order_index = orders
            .iter()
            .enumerate()
            .map(|(i, o)| (o.order_id.clone(), i))
            .collect();
        let product_names = products
            .iter()
            .map(|p| (p.product_id.clone(), p.product_name.clone()))
            .collect();
        let product_categories = products
            .iter()
            .map(|p| (p.product_id.clone(), p.category.clone()))
            .collect();

        Self {
            sessions,
            orders,
            items,
            products,
            refunds,
            session_index,
            order_index,
            product_names,
            product_categories,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn refunds(&self) -> &[Refund] {
        &self.refunds
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.session_index.get(session_id).map(|&i| &self.sessions[i])
    }

    /// Catalog name for a product, or the unknown-product placeholder.
    pub fn product_name(&self, product_id: &str) -> &str {
        self.product_names
            .get(product_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PRODUCT)
    }

    pub fn product_category(&self, product_id: &str) -> &str {
        self.product_categories
            .get(product_id)
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED)
    }

    /// Total rows across all tables.
    pub fn row_count(&self) -> usize {
        self.sessions.len()
            + self.orders.len()
            + self.items.len()
            + self.products.len()
            + self.refunds.len()
    }

    /// Applies `filter` and returns the matching rows.
    ///
    /// - Sessions must match the time range and the channel/device segment.
    /// - Orders must fall in the time range; with a segment active their
    ///   session must also be selected.
    /// - Refunds and items follow their order.
    /// - Dated refunds fall in the time range by their own date, and with a
    ///   segment active their order's session must match it.
    pub fn view(&self, filter: &DashboardFilter) -> DatasetView<'_> {
        let sessions: Vec<&Session> = self
            .sessions
            .iter()
            .filter(|s| filter.contains_time(s.timestamp))
            .filter(|s| filter.matches_segment(&s.channel, &s.device_type))
            .collect();

        let selected: HashSet<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();

        let orders: Vec<&Order> = self
            .orders
            .iter()
            .filter(|o| filter.contains_time(o.timestamp))
            .filter(|o| !filter.has_segment() || selected.contains(o.session_id.as_str()))
            .collect();

        let order_ids: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();

        let refunds = self
            .refunds
            .iter()
            .filter(|r| order_ids.contains(r.order_id.as_str()))
            .collect();
        let items = self
            .items
            .iter()
            .filter(|i| order_ids.contains(i.order_id.as_str()))
            .collect();

        let dated_refunds = self
            .refunds
            .iter()
            .filter(|r| filter.contains_time(r.timestamp))
            .filter(|r| !filter.has_segment() || self.refund_in_segment(r, filter))
            .collect();

        DatasetView {
            dataset: self,
            sessions,
            orders,
            items,
            refunds,
            dated_refunds,
        }
    }

    fn refund_in_segment(&self, refund: &Refund, filter: &DashboardFilter) -> bool {
        self.order_index
            .get(refund.order_id.as_str())
            .and_then(|&i| self.session(&self.orders[i].session_id))
            .is_some_and(|s| filter.matches_segment(&s.channel, &s.device_type))
    }
}

/// Rows selected by a [`DashboardFilter`].
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    pub dataset: &'a Dataset,
    pub sessions: Vec<&'a Session>,
    pub orders: Vec<&'a Order>,
    pub items: Vec<&'a OrderItem>,
    /// Refunds of the selected orders; drives the refund rate
    pub refunds: Vec<&'a Refund>,
    /// Refunds selected by their own date; drives refund analysis
    pub dated_refunds: Vec<&'a Refund>,
}

impl<'a> DatasetView<'a> {
    /// Order ids with at least one refund.
    pub fn refunded_order_ids(&self) -> HashSet<&'a str> {
        self.refunds.iter().map(|r| r.order_id.as_str()).collect()
    }

    /// Session ids with at least one order in the view.
    pub fn converted_session_ids(&self) -> HashSet<&'a str> {
        self.orders.iter().map(|o| o.session_id.as_str()).collect()
    }

    /// Channel of the session an order belongs to, if the session is known.
    pub fn order_channel(&self, order: &Order) -> Option<&'a str> {
        self.dataset
            .session(&order.session_id)
            .map(|s| s.channel.as_str())
    }

    /// Device of the session an order belongs to, if the session is known.
    pub fn order_device(&self, order: &Order) -> Option<&'a str> {
        self.dataset
            .session(&order.session_id)
            .map(|s| s.device_type.as_str())
    }
}
