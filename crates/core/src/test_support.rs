//! Small hand-checked dataset shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::dataset::Dataset;
use crate::records::{FunnelStage, Order, OrderItem, Product, Refund, Session};

pub(crate) fn ts(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn session(
    id: &str,
    user: Option<&str>,
    at: DateTime<Utc>,
    channel: &str,
    device: &str,
    pageviews: u32,
    stage: FunnelStage,
    repeat: bool,
) -> Session {
    Session {
        session_id: id.into(),
        user_id: user.map(Into::into),
        timestamp: at,
        traffic_source: channel.to_lowercase(),
        channel: channel.into(),
        device_type: device.into(),
        duration_secs: Some(120.0),
        is_repeat: repeat,
        pageviews,
        furthest_stage: stage,
    }
}

pub(crate) fn order(id: &str, session: &str, at: DateTime<Utc>, value: f64, items: u32) -> Order {
    Order {
        order_id: id.into(),
        session_id: session.into(),
        user_id: None,
        timestamp: at,
        value,
        cogs: value * 0.4,
        items_count: items,
    }
}

fn item(id: &str, order: &str, product: &str, price: f64, cogs: f64) -> OrderItem {
    OrderItem {
        order_item_id: id.into(),
        order_id: order.into(),
        product_id: product.into(),
        price,
        cogs,
    }
}

pub(crate) fn refund(id: &str, order: &str, at: DateTime<Utc>, amount: f64, reason: &str) -> Refund {
    Refund {
        refund_id: id.into(),
        order_id: order.into(),
        timestamp: at,
        amount,
        reason: reason.into(),
    }
}

/// Six sessions, four orders (three converted sessions), two refunds on one order.
pub(crate) fn sample_dataset() -> Dataset {
    use FunnelStage::*;

    let sessions = vec![
        session("s1", Some("u1"), ts(1, 10, 0), "Paid Search", "Desktop", 6, Billing, false),
        session("s2", Some("u2"), ts(2, 11, 0), "Paid Search", "Mobile", 2, Products, false),
        session("s3", Some("u1"), ts(5, 9, 0), "Email", "Desktop", 5, Sessions, true),
        session("s4", Some("u3"), ts(10, 14, 0), "Email", "Mobile", 1, Sessions, false),
        session("s5", None, ts(12, 16, 0), "Direct", "Tablet", 4, Cart, false),
        session("s6", Some("u4"), ts(20, 20, 0), "Direct", "Desktop", 3, Shipping, true),
    ];

    let orders = vec![
        order("o1", "s1", ts(1, 10, 20), 100.0, 2),
        order("o2", "s1", ts(1, 10, 45), 60.0, 1),
        order("o3", "s3", ts(5, 9, 30), 40.0, 1),
        order("o4", "s6", ts(20, 20, 30), 100.0, 2),
    ];

    let items = vec![
        item("i1", "o1", "p1", 60.0, 25.0),
        item("i2", "o1", "p2", 40.0, 15.0),
        item("i3", "o2", "p1", 60.0, 20.0),
        item("i4", "o3", "p2", 40.0, 15.0),
        item("i5", "o4", "p1", 60.0, 25.0),
        item("i6", "o4", "p3", 40.0, 20.0),
    ];

    let products = vec![
        Product {
            product_id: "p1".into(),
            product_name: "The Original Mr. Fuzzy".into(),
            category: "Bears".into(),
            launched_at: None,
        },
        Product {
            product_id: "p2".into(),
            product_name: "The Forever Love Bear".into(),
            category: "Gifts".into(),
            launched_at: None,
        },
    ];

    let refunds = vec![
        refund("r1", "o1", ts(4, 12, 0), 20.0, "Defective"),
        refund("r2", "o1", ts(6, 12, 0), 10.0, "Wrong Item"),
    ];

    Dataset::new(sessions, orders, items, products, refunds)
}
