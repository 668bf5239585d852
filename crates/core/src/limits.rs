//! Thresholds and display precision used across cleaning and aggregation.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so identifier limits are duplicated in `records.rs`. Keep both in sync
//! when modifying.

// === Cleaning ===

/// Sessions shorter than this are treated as bots (seconds).
pub const MIN_SESSION_DURATION_SECS: f64 = 1.0;

/// Sessions longer than this are treated as bots (8 hours).
pub const MAX_SESSION_DURATION_SECS: f64 = 8.0 * 60.0 * 60.0;

/// Maximum identifier length for sessions, orders and refunds.
pub const MAX_ID_LEN: usize = 128;

/// Channel assigned when a session has no traffic source at all.
pub const DEFAULT_CHANNEL: &str = "Direct";

/// Device assigned when a session has no device type.
pub const DEFAULT_DEVICE: &str = "Unknown";

/// Product name used for order items without a catalog entry.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Category for products exported without one, and for items without a catalog entry.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Single category row used when a view has orders but no line items.
pub const ALL_CATEGORIES: &str = "All Categories";

/// Reason assigned to refunds exported without one.
pub const DEFAULT_REFUND_REASON: &str = "Refund";

// === Display ===

/// Decimal places for percentages.
pub const PERCENT_DECIMALS: u32 = 2;

/// Decimal places for currency amounts.
pub const MONEY_DECIMALS: u32 = 2;

/// Number of channels listed under at-risk segments.
pub const AT_RISK_SEGMENTS: usize = 5;
