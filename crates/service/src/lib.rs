//! Dashboard data service: one fixed-shape summary, from local data or a
//! single upstream fetch.

pub mod config;
pub mod dataset_source;
pub mod remote;
pub mod source;

pub use config::{build_source, SourceConfig};
pub use dataset_source::DatasetSource;
pub use remote::RemoteSource;
pub use source::{DashboardSource, SharedSource, SourceKind};
