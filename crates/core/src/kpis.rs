//! Headline KPIs over a filtered dataset view.
//!
//! Rates here are plain fractions in `[0, 1]`; the summary layer turns them
//! into rounded percentages for display.

use std::collections::HashSet;

use crate::aggregate::ratio;
use crate::dataset::DatasetView;

pub fn total_sessions(view: &DatasetView<'_>) -> u64 {
    view.sessions.len() as u64
}

/// Distinct known users among the selected sessions.
pub fn unique_users(view: &DatasetView<'_>) -> u64 {
    view.sessions
        .iter()
        .filter_map(|s| s.user_id.as_deref())
        .collect::<HashSet<_>>()
        .len() as u64
}

pub fn total_pageviews(view: &DatasetView<'_>) -> u64 {
    view.sessions.iter().map(|s| s.pageviews as u64).sum()
}

pub fn total_orders(view: &DatasetView<'_>) -> u64 {
    view.orders.len() as u64
}

/// Selected sessions with at least one selected order.
pub fn converted_sessions(view: &DatasetView<'_>) -> u64 {
    let converted = view.converted_session_ids();
    view.sessions
        .iter()
        .filter(|s| converted.contains(s.session_id.as_str()))
        .count() as u64
}

/// Converted sessions over sessions.
pub fn conversion_rate(view: &DatasetView<'_>) -> f64 {
    ratio(converted_sessions(view) as f64, total_sessions(view) as f64)
}

pub fn total_revenue(view: &DatasetView<'_>) -> f64 {
    view.orders.iter().map(|o| o.value).sum()
}

pub fn average_order_value(view: &DatasetView<'_>) -> f64 {
    ratio(total_revenue(view), total_orders(view) as f64)
}

pub fn revenue_per_session(view: &DatasetView<'_>) -> f64 {
    ratio(total_revenue(view), total_sessions(view) as f64)
}

/// Orders with at least one refund.
pub fn refunded_orders(view: &DatasetView<'_>) -> u64 {
    view.refunded_order_ids().len() as u64
}

/// Refunded orders over orders, in `[0, 1]`.
pub fn refund_rate(view: &DatasetView<'_>) -> f64 {
    ratio(refunded_orders(view) as f64, total_orders(view) as f64)
}

pub fn refund_value(view: &DatasetView<'_>) -> f64 {
    view.refunds.iter().map(|r| r.amount).sum()
}

/// Repeat sessions over sessions.
pub fn repeat_customer_rate(view: &DatasetView<'_>) -> f64 {
    let repeat = view.sessions.iter().filter(|s| s.is_repeat).count();
    ratio(repeat as f64, total_sessions(view) as f64)
}
