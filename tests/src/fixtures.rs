//! Test fixtures: a small export whose KPIs are easy to check by hand.
//!
//! | session | user | channel | device  | order        |
//! |---------|------|---------|---------|--------------|
//! | S1      | u1   | Email   | Desktop | O1 100.00    |
//! | S2      | u2   | Email   | Mobile  |              |
//! | S3      | u1   | Direct  | Desktop | O2 50.00     |
//! | S4      | u3   | Direct  | Mobile  |              |
//!
//! O1 (one P1 "Bears" item) has one 20.00 refund, dated 2024-01-05.
//! O2 is one P2 "Gifts" item.

use std::path::Path;

use pipeline::raw::{RawOrder, RawOrderItem, RawProduct, RawRefund, RawSession};
use pipeline::{CleanedData, DataCleaner, RawTables};

fn session(id: &str, user: &str, at: &str, channel: &str, device: &str, repeat: bool) -> RawSession {
    RawSession {
        session_id: Some(id.into()),
        user_id: Some(user.into()),
        timestamp: Some(at.into()),
        repeat_session: Some(if repeat { "1" } else { "0" }.into()),
        channel: Some(channel.into()),
        device_type: Some(device.into()),
        pageviews: Some("3".into()),
        ..Default::default()
    }
}

fn order(id: &str, session: &str, at: &str, value: &str) -> RawOrder {
    RawOrder {
        order_id: Some(id.into()),
        session_id: Some(session.into()),
        timestamp: Some(at.into()),
        value: Some(value.into()),
        items_count: Some("1".into()),
        ..Default::default()
    }
}

/// The raw export described in the module docs.
pub fn raw_tables() -> RawTables {
    RawTables {
        sessions: vec![
            session("S1", "u1", "2024-01-01 10:00:00", "Email", "desktop", false),
            session("S2", "u2", "2024-01-02 10:00:00", "Email", "mobile", false),
            session("S3", "u1", "2024-01-03 10:00:00", "Direct", "desktop", true),
            session("S4", "u3", "2024-01-10 10:00:00", "Direct", "mobile", false),
        ],
        orders: vec![
            order("O1", "S1", "2024-01-01 10:30:00", "100.00"),
            order("O2", "S3", "2024-01-03 11:00:00", "50.00"),
        ],
        items: vec![
            RawOrderItem {
                order_item_id: Some("I1".into()),
                order_id: Some("O1".into()),
                product_id: Some("P1".into()),
                price: Some("100.00".into()),
                cogs: Some("40.00".into()),
            },
            RawOrderItem {
                order_item_id: Some("I2".into()),
                order_id: Some("O2".into()),
                product_id: Some("P2".into()),
                price: Some("50.00".into()),
                cogs: Some("20.00".into()),
            },
        ],
        products: vec![
            RawProduct {
                product_id: Some("P1".into()),
                product_name: Some("Mr. Fuzzy".into()),
                category: Some("Bears".into()),
                launched_at: None,
            },
            RawProduct {
                product_id: Some("P2".into()),
                product_name: Some("Love Bear".into()),
                category: Some("Gifts".into()),
                launched_at: None,
            },
        ],
        refunds: vec![RawRefund {
            refund_id: Some("R1".into()),
            order_id: Some("O1".into()),
            timestamp: Some("2024-01-05 09:00:00".into()),
            amount: Some("20.00".into()),
            reason: Some("Defective".into()),
        }],
        ..Default::default()
    }
}

/// The fixture export after cleaning.
pub fn cleaned() -> CleanedData {
    DataCleaner::default().clean(raw_tables())
}

/// Writes the fixture export as CSV files under `dir`.
pub fn write_csv_dir(dir: &Path) {
    raw_tables()
        .write_dir(dir)
        .expect("Failed to write fixture CSVs");
}

/// Top-level keys every dashboard summary carries.
pub const SUMMARY_KEYS: &[&str] = &[
    "generated_at",
    "traffic",
    "conversion",
    "revenue",
    "quality",
    "products",
];
