//! Time-bucketed trends and refund analysis.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::{group_by, round_money, GroupStats};
use crate::dataset::DatasetView;
use crate::filter::TimeGranularity;

/// One time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    /// First day of the bucket
    pub period: NaiveDate,
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
}

impl PeriodStats {
    fn from_group(period: NaiveDate, stats: GroupStats) -> Self {
        let stats = stats.rounded();
        Self {
            period,
            count: stats.count,
            sum: stats.sum,
            mean: stats.mean,
        }
    }
}

/// Refund count and value for one reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundReason {
    pub reason: String,
    pub count: u64,
    pub value: f64,
}

/// Refunds broken down by reason and over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundAnalysis {
    pub total_refunds: u64,
    pub total_value: f64,
    pub by_reason: Vec<RefundReason>,
    pub trend: Vec<PeriodStats>,
}

fn to_periods(groups: BTreeMap<NaiveDate, GroupStats>) -> Vec<PeriodStats> {
    groups
        .into_iter()
        .map(|(period, stats)| PeriodStats::from_group(period, stats))
        .collect()
}

/// Sessions per bucket; `sum` is the bucket's pageviews.
pub fn sessions_trend(view: &DatasetView<'_>, granularity: TimeGranularity) -> Vec<PeriodStats> {
    to_periods(group_by(
        view.sessions.iter(),
        |s| granularity.period_start(s.timestamp),
        |s| s.pageviews as f64,
    ))
}

/// Orders per bucket; `sum` is revenue and `mean` the average order value.
pub fn revenue_trend(view: &DatasetView<'_>, granularity: TimeGranularity) -> Vec<PeriodStats> {
    to_periods(group_by(
        view.orders.iter(),
        |o| granularity.period_start(o.timestamp),
        |o| o.value,
    ))
}

/// Refunds per bucket, selected and keyed by refund date.
pub fn refund_trend(view: &DatasetView<'_>, granularity: TimeGranularity) -> Vec<PeriodStats> {
    to_periods(group_by(
        view.dated_refunds.iter(),
        |r| granularity.period_start(r.timestamp),
        |r| r.amount,
    ))
}

/// Refunds dated in the view's range by reason, highest value first, plus
/// their trend.
pub fn refund_analysis(view: &DatasetView<'_>, granularity: TimeGranularity) -> RefundAnalysis {
    let refunds = &view.dated_refunds;
    let reasons = group_by(refunds.iter(), |r| r.reason.clone(), |r| r.amount);

    let mut by_reason: Vec<RefundReason> = reasons
        .into_iter()
        .map(|(reason, stats)| RefundReason {
            reason,
            count: stats.count,
            value: round_money(stats.sum),
        })
        .collect();
    by_reason.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.reason.cmp(&b.reason)));

    RefundAnalysis {
        total_refunds: refunds.len() as u64,
        total_value: round_money(refunds.iter().map(|r| r.amount).sum()),
        by_reason,
        trend: refund_trend(view, granularity),
    }
}
