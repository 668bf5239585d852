//! Reading and writing export directories.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use analytics_core::error::{DataErrorCode, Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use telemetry::metrics;
use tracing::{debug, info, warn};

use crate::raw::{RawOrder, RawOrderItem, RawPageview, RawProduct, RawRefund, RawSession};

/// Accepted file names per table, raw export name first.
pub const SESSION_FILES: &[&str] = &["website_sessions.csv", "sessions.csv"];
pub const PAGEVIEW_FILES: &[&str] = &["website_pageviews.csv", "pageviews.csv"];
pub const ORDER_FILES: &[&str] = &["orders.csv"];
pub const ORDER_ITEM_FILES: &[&str] = &["order_items.csv"];
pub const REFUND_FILES: &[&str] = &["order_item_refunds.csv", "refunds.csv"];
pub const PRODUCT_FILES: &[&str] = &["products.csv"];

/// Every table of one export, unvalidated.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub sessions: Vec<RawSession>,
    pub pageviews: Vec<RawPageview>,
    pub orders: Vec<RawOrder>,
    pub items: Vec<RawOrderItem>,
    pub refunds: Vec<RawRefund>,
    pub products: Vec<RawProduct>,
    /// Rows the CSV reader could not decode
    pub malformed_rows: usize,
}

impl RawTables {
    /// Loads every table found in `dir`.
    ///
    /// Sessions and orders are required; the other tables are optional.
    /// Undecodable rows are skipped and counted.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let start = Instant::now();

        if !dir.is_dir() {
            return Err(Error::data(
                DataErrorCode::LoadFailed,
                format!("data directory {} does not exist", dir.display()),
            ));
        }

        let mut tables = RawTables::default();

        let sessions = require(dir, SESSION_FILES)?;
        tables.sessions = read_table(&sessions, &mut tables.malformed_rows)?;

        let orders = require(dir, ORDER_FILES)?;
        tables.orders = read_table(&orders, &mut tables.malformed_rows)?;

        if let Some(path) = find(dir, PAGEVIEW_FILES) {
            tables.pageviews = read_table(&path, &mut tables.malformed_rows)?;
        }
        if let Some(path) = find(dir, ORDER_ITEM_FILES) {
            tables.items = read_table(&path, &mut tables.malformed_rows)?;
        }
        if let Some(path) = find(dir, REFUND_FILES) {
            tables.refunds = read_table(&path, &mut tables.malformed_rows)?;
        }
        if let Some(path) = find(dir, PRODUCT_FILES) {
            tables.products = read_table(&path, &mut tables.malformed_rows)?;
        }

        let m = metrics();
        m.rows_loaded.inc_by(tables.row_count() as u64);
        m.rows_malformed.inc_by(tables.malformed_rows as u64);
        m.load_latency_ms.observe(start.elapsed().as_millis() as u64);

        info!(
            dir = %dir.display(),
            sessions = tables.sessions.len(),
            pageviews = tables.pageviews.len(),
            orders = tables.orders.len(),
            items = tables.items.len(),
            refunds = tables.refunds.len(),
            products = tables.products.len(),
            malformed = tables.malformed_rows,
            "Loaded raw tables"
        );

        Ok(tables)
    }

    /// Writes each non-empty table under its raw export name.
    pub fn write_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::data(
                DataErrorCode::LoadFailed,
                format!("cannot create {}: {}", dir.display(), e),
            )
        })?;

        write_table(&dir.join(SESSION_FILES[0]), &self.sessions)?;
        write_table(&dir.join(ORDER_FILES[0]), &self.orders)?;
        if !self.pageviews.is_empty() {
            write_table(&dir.join(PAGEVIEW_FILES[0]), &self.pageviews)?;
        }
        if !self.items.is_empty() {
            write_table(&dir.join(ORDER_ITEM_FILES[0]), &self.items)?;
        }
        if !self.refunds.is_empty() {
            write_table(&dir.join(REFUND_FILES[0]), &self.refunds)?;
        }
        if !self.products.is_empty() {
            write_table(&dir.join(PRODUCT_FILES[0]), &self.products)?;
        }

        debug!(dir = %dir.display(), rows = self.row_count(), "Wrote raw tables");
        Ok(())
    }

    /// Rows across all tables, excluding malformed ones.
    pub fn row_count(&self) -> usize {
        self.sessions.len()
            + self.pageviews.len()
            + self.orders.len()
            + self.items.len()
            + self.refunds.len()
            + self.products.len()
    }
}

fn find(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|name| dir.join(name)).find(|p| p.is_file())
}

fn require(dir: &Path, names: &[&str]) -> Result<PathBuf> {
    find(dir, names).ok_or_else(|| {
        Error::data(
            DataErrorCode::LoadFailed,
            format!("none of {} found in {}", names.join(", "), dir.display()),
        )
    })
}

fn read_table<T: DeserializeOwned>(path: &Path, malformed: &mut usize) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| {
        Error::data(
            DataErrorCode::LoadFailed,
            format!("cannot open {}: {}", path.display(), e),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                // +2: one for the header, one for 1-based numbering
                warn!(file = %path.display(), line = idx + 2, error = %e, "Skipping malformed row");
                *malformed += 1;
            }
        }
    }

    debug!(file = %path.display(), rows = rows.len(), "Read table");
    Ok(rows)
}

fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let to_error = |e: csv::Error| {
        Error::data(
            DataErrorCode::LoadFailed,
            format!("cannot write {}: {}", path.display(), e),
        )
    };

    let mut writer = csv::Writer::from_path(path).map_err(to_error)?;
    for row in rows {
        writer.serialize(row).map_err(to_error)?;
    }
    writer.flush().map_err(|e| {
        Error::data(
            DataErrorCode::LoadFailed,
            format!("cannot flush {}: {}", path.display(), e),
        )
    })
}
