//! Records, aggregation and KPI computation for the BearCart dashboard.

pub mod aggregate;
pub mod breakdown;
pub mod channel;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod funnel;
pub mod kpis;
pub mod limits;
pub mod records;
pub mod schema;
pub mod summary;
pub mod trends;

#[cfg(test)]
mod test_support;

pub use aggregate::GroupStats;
pub use dataset::{Dataset, DatasetView};
pub use error::{Error, Result};
pub use filter::{DashboardFilter, Dimension, TimeGranularity};
pub use records::*;
pub use summary::DashboardSummary;
