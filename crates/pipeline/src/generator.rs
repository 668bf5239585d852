//! Seeded synthetic exports for demos and tests.
//!
//! Output is in the raw export vocabulary so it goes through the same
//! cleaner as real data, and includes a little deliberate dirt (duplicate
//! sessions, bot durations, a negative order, a refund dated before its
//! order) so the cleaning rules are always exercised.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::loader::RawTables;
use crate::raw::{RawOrder, RawOrderItem, RawPageview, RawProduct, RawRefund, RawSession};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `(utm_source, utm_campaign, http_referer)` per traffic source.
const TRAFFIC: &[(Option<&str>, Option<&str>, Option<&str>)] = &[
    (Some("gsearch"), Some("nonbrand"), Some("https://www.gsearch.com")),
    (Some("bsearch"), Some("brand"), Some("https://www.bsearch.com")),
    (Some("email"), Some("newsletter"), None),
    (Some("socialbook"), Some("pilot"), Some("https://www.socialbook.com")),
    (Some("affiliate"), None, None),
    (None, None, Some("https://www.bearblog.example")),
    (None, None, None),
];

const DEVICES: &[&str] = &["desktop", "mobile", "tablet"];

/// `(name, category, price, cogs)`
const PRODUCTS: &[(&str, &str, f64, f64)] = &[
    ("The Original Mr. Fuzzy", "Teddy Bears", 49.99, 19.49),
    ("The Forever Love Bear", "Gifts", 59.99, 22.49),
    ("The Birthday Sugar Panda", "Gifts", 45.99, 14.49),
    ("The Hudson River Mini bear", "Mini Bears", 29.99, 9.49),
];

const REFUND_REASONS: &[&str] = &[
    "Defective",
    "Wrong Item",
    "Not as Described",
    "Customer Request",
    "Late Delivery",
];

const LANDING_PAGES: &[&str] = &["/home", "/lander-1", "/lander-2"];

/// Pages after landing, in journey order.
const JOURNEY: &[&str] = &[
    "/products",
    "/the-original-mr-fuzzy",
    "/cart",
    "/shipping",
    "/billing-2",
    "/thank-you-for-your-order",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub sessions: usize,
    pub days: i64,
    pub start: DateTime<Utc>,
    /// Share of sessions that place an order
    pub conversion_rate: f64,
    /// Share of orders that get a refund
    pub refund_rate: f64,
    /// Inject rows the cleaner should remove
    pub dirty: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sessions: 2_000,
            days: 90,
            start: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
            conversion_rate: 0.15,
            refund_rate: 0.08,
            dirty: true,
        }
    }
}

/// Generates raw tables; the same config always yields the same tables.
pub fn generate(config: &GeneratorConfig) -> RawTables {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut tables = RawTables {
        products: PRODUCTS
            .iter()
            .enumerate()
            .map(|(i, (name, category, _, _))| RawProduct {
                product_id: Some((i + 1).to_string()),
                product_name: Some(name.to_string()),
                category: Some(category.to_string()),
                launched_at: Some(fmt(config.start - Duration::days(365))),
            })
            .collect(),
        ..Default::default()
    };

    let span_secs = config.days.max(1) * 86_400;
    let user_pool = (config.sessions * 2 / 3).max(1);
    let mut seen_users = std::collections::HashSet::new();
    let mut next_pageview = 1u64;
    let mut next_item = 1u64;

    for n in 1..=config.sessions {
        let at = config.start + Duration::seconds(rng.gen_range(0..span_secs));
        let user = rng.gen_range(1..=user_pool);
        let repeat = !seen_users.insert(user);
        let (utm_source, utm_campaign, referer) = TRAFFIC[rng.gen_range(0..TRAFFIC.len())];
        let converts = rng.gen_bool(config.conversion_rate.clamp(0.0, 1.0));

        // Non-converting sessions stop somewhere before the thank-you page.
        let depth = if converts {
            JOURNEY.len()
        } else {
            rng.gen_range(0..JOURNEY.len())
        };

        let session_id = n.to_string();
        let mut page_at = at;
        let landing = LANDING_PAGES.choose(&mut rng).copied().unwrap_or("/home");
        for url in std::iter::once(landing).chain(JOURNEY[..depth].iter().copied()) {
            tables.pageviews.push(RawPageview {
                pageview_id: Some(next_pageview.to_string()),
                session_id: Some(session_id.clone()),
                created_at: Some(fmt(page_at)),
                pageview_url: Some(url.to_string()),
            });
            next_pageview += 1;
            page_at += Duration::seconds(rng.gen_range(5..120));
        }

        tables.sessions.push(RawSession {
            session_id: Some(session_id.clone()),
            user_id: Some(user.to_string()),
            timestamp: Some(fmt(at)),
            repeat_session: Some(if repeat { "1" } else { "0" }.to_string()),
            utm_source: utm_source.map(String::from),
            utm_campaign: utm_campaign.map(String::from),
            http_referer: referer.map(String::from),
            channel: None,
            device_type: DEVICES.choose(&mut rng).map(|d| d.to_string()),
            duration: Some(format!("{}", (page_at - at).num_seconds().max(1))),
            pageviews: None,
        });

        if !converts {
            continue;
        }

        let order_id = (tables.orders.len() + 1).to_string();
        let order_at = page_at;
        let item_count = rng.gen_range(1..=3usize);
        let mut value = 0.0;
        let mut cogs = 0.0;
        let mut first_price = 0.0;
        for i in 0..item_count {
            let product = rng.gen_range(0..PRODUCTS.len());
            let (_, _, price, cost) = PRODUCTS[product];
            if i == 0 {
                first_price = price;
            }
            value += price;
            cogs += cost;
            tables.items.push(RawOrderItem {
                order_item_id: Some(next_item.to_string()),
                order_id: Some(order_id.clone()),
                product_id: Some((product + 1).to_string()),
                price: Some(format!("{:.2}", price)),
                cogs: Some(format!("{:.2}", cost)),
            });
            next_item += 1;
        }

        tables.orders.push(RawOrder {
            order_id: Some(order_id.clone()),
            session_id: Some(session_id),
            user_id: Some(user.to_string()),
            timestamp: Some(fmt(order_at)),
            value: Some(format!("{:.2}", value)),
            cogs: Some(format!("{:.2}", cogs)),
            items_count: Some(item_count.to_string()),
        });

        if rng.gen_bool(config.refund_rate.clamp(0.0, 1.0)) {
            let refund_at = order_at + Duration::days(rng.gen_range(1..=14));
            tables.refunds.push(RawRefund {
                refund_id: Some((tables.refunds.len() + 1).to_string()),
                order_id: Some(order_id),
                timestamp: Some(fmt(refund_at)),
                amount: Some(format!("{:.2}", first_price)),
                reason: REFUND_REASONS.choose(&mut rng).map(|r| r.to_string()),
            });
        }
    }

    if config.dirty {
        add_dirt(&mut tables, &mut rng);
    }

    info!(
        seed = config.seed,
        sessions = tables.sessions.len(),
        orders = tables.orders.len(),
        refunds = tables.refunds.len(),
        "Generated synthetic exports"
    );
    tables
}

fn add_dirt(tables: &mut RawTables, rng: &mut StdRng) {
    let n = tables.sessions.len();
    if n == 0 {
        return;
    }

    // ~1% duplicated sessions, ~2% bot durations.
    for _ in 0..(n / 100).max(1) {
        let dup = tables.sessions[rng.gen_range(0..n)].clone();
        tables.sessions.push(dup);
    }
    for _ in 0..(n / 50).max(1) {
        let idx = rng.gen_range(0..n);
        let bot = if rng.gen_bool(0.5) { "0" } else { "40000" };
        tables.sessions[idx].duration = Some(bot.to_string());
    }

    // A session with no source at all, and one with an unparseable timestamp.
    tables.sessions[rng.gen_range(0..n)].utm_source = None;
    tables.sessions.push(RawSession {
        session_id: Some((n + 1).to_string()),
        timestamp: Some("not-a-timestamp".to_string()),
        ..Default::default()
    });

    if let Some(first) = tables.orders.first().cloned() {
        tables.orders.push(RawOrder {
            order_id: Some((tables.orders.len() + 1).to_string()),
            value: Some("-10.00".to_string()),
            ..first
        });
    }

    if let Some(order) = tables.orders.first() {
        tables.refunds.push(RawRefund {
            refund_id: Some((tables.refunds.len() + 1).to_string()),
            order_id: order.order_id.clone(),
            timestamp: Some("2000-01-01 00:00:00".to_string()),
            amount: Some("1.00".to_string()),
            reason: None,
        });
    }
}

fn fmt(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
