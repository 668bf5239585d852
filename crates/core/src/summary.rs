//! Fixed-shape dashboard summary.
//!
//! This is the JSON object served by `GET /api/dashboard` and consumed by the
//! remote source, so field names are part of the wire contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{percent, round_money, GroupStats};
use crate::breakdown::{
    aov_by_category, at_risk_segments, conversion_by, product_performance, revenue_by_channel,
    sessions_by, CategoryAov, ConversionBreakdown, ProductPerformance, SegmentCount,
};
use crate::dataset::DatasetView;
use crate::filter::Dimension;
use crate::funnel::{build_funnel, FunnelStep};
use crate::kpis;
use crate::limits::AT_RISK_SEGMENTS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub traffic: TrafficSummary,
    pub conversion: ConversionSummary,
    pub revenue: RevenueSummary,
    pub quality: QualitySummary,
    pub products: Vec<ProductPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSummary {
    pub total_sessions: u64,
    pub unique_users: u64,
    pub total_pageviews: u64,
    pub sessions_by_channel: BTreeMap<String, u64>,
    pub sessions_by_device: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Percentage of sessions with an order
    pub overall_conversion_rate: f64,
    pub total_conversions: u64,
    pub conversion_by_channel: Vec<ConversionBreakdown>,
    pub conversion_by_device: Vec<ConversionBreakdown>,
    pub funnel: Vec<FunnelStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub revenue_per_session: f64,
    pub revenue_by_channel: BTreeMap<String, GroupStats>,
    pub aov_by_category: Vec<CategoryAov>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    /// Percentage of orders with at least one refund
    pub overall_refund_rate: f64,
    pub total_refunds: u64,
    pub refund_value: f64,
    /// Percentage of sessions from returning visitors
    pub repeat_customer_rate: f64,
    pub at_risk_segments: Vec<SegmentCount>,
}

impl DashboardSummary {
    /// Computes every section from one view.
    pub fn compute(view: &DatasetView<'_>) -> Self {
        Self::compute_at(view, Utc::now())
    }

    pub fn compute_at(view: &DatasetView<'_>, generated_at: DateTime<Utc>) -> Self {
        let sessions = kpis::total_sessions(view) as f64;
        let orders = kpis::total_orders(view) as f64;

        Self {
            generated_at,
            traffic: TrafficSummary {
                total_sessions: kpis::total_sessions(view),
                unique_users: kpis::unique_users(view),
                total_pageviews: kpis::total_pageviews(view),
                sessions_by_channel: sessions_by(view, Dimension::Channel),
                sessions_by_device: sessions_by(view, Dimension::Device),
            },
            conversion: ConversionSummary {
                overall_conversion_rate: percent(kpis::converted_sessions(view) as f64, sessions),
                total_conversions: kpis::total_orders(view),
                conversion_by_channel: conversion_by(view, Dimension::Channel),
                conversion_by_device: conversion_by(view, Dimension::Device),
                funnel: build_funnel(view),
            },
            revenue: RevenueSummary {
                total_revenue: round_money(kpis::total_revenue(view)),
                average_order_value: round_money(kpis::average_order_value(view)),
                revenue_per_session: round_money(kpis::revenue_per_session(view)),
                revenue_by_channel: revenue_by_channel(view),
                aov_by_category: aov_by_category(view),
            },
            quality: QualitySummary {
                overall_refund_rate: percent(kpis::refunded_orders(view) as f64, orders),
                total_refunds: view.refunds.len() as u64,
                refund_value: round_money(kpis::refund_value(view)),
                repeat_customer_rate: round_to_percent(kpis::repeat_customer_rate(view)),
                at_risk_segments: at_risk_segments(view, AT_RISK_SEGMENTS),
            },
            products: product_performance(view),
        }
    }
}

fn round_to_percent(fraction: f64) -> f64 {
    percent(fraction, 1.0)
}
