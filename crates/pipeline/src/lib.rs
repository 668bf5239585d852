//! CSV loading, cleaning and synthetic data for the BearCart dashboard.
//!
//! ```text
//! export dir ──load_dir──▶ RawTables ──DataCleaner::clean──▶ Dataset + CleaningReport
//!                             ▲
//!            generate(seed) ──┘
//! ```

pub mod cleaner;
pub mod generator;
pub mod loader;
pub mod raw;

pub use cleaner::{CleanedData, CleanerConfig, CleaningReport, DataCleaner};
pub use generator::{generate, GeneratorConfig};
pub use loader::RawTables;

use std::path::Path;

use analytics_core::Result;

/// Loads and cleans an export directory.
pub fn load_and_clean(dir: impl AsRef<Path>, config: CleanerConfig) -> Result<CleanedData> {
    let raw = RawTables::load_dir(dir)?;
    Ok(DataCleaner::new(config).clean(raw))
}

/// Generates and cleans a synthetic dataset.
pub fn synthetic(generator: &GeneratorConfig, config: CleanerConfig) -> CleanedData {
    DataCleaner::new(config).clean(generate(generator))
}
