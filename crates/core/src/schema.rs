//! Record-level validation used while cleaning exports.

use validator::Validate;

use crate::error::{Error, Result};
use crate::limits::{MAX_SESSION_DURATION_SECS, MIN_SESSION_DURATION_SECS};
use crate::records::{Order, OrderItem, Refund, Session};

/// Validates a session's fields.
pub fn validate_session(session: &Session) -> Result<()> {
    session
        .validate()
        .map_err(|e| Error::validation(format!("session {}: {}", session.session_id, e)))
}

/// Whether the session duration marks it as automated traffic.
///
/// Sessions without a recorded duration are never treated as bots.
pub fn is_bot_session(session: &Session) -> bool {
    match session.duration_secs {
        Some(d) => d < MIN_SESSION_DURATION_SECS || d > MAX_SESSION_DURATION_SECS,
        None => false,
    }
}

/// Validates an order's fields and that it was placed during or after its session.
pub fn validate_order(order: &Order, session: Option<&Session>) -> Result<()> {
    order
        .validate()
        .map_err(|e| Error::validation(format!("order {}: {}", order.order_id, e)))?;

    // Orders whose session is unknown are kept; only a known session can contradict them.
    if let Some(session) = session {
        if order.timestamp < session.timestamp {
            return Err(Error::validation(format!(
                "order {} placed before session {} started",
                order.order_id, session.session_id
            )));
        }
    }

    Ok(())
}

/// Validates an order item's fields.
pub fn validate_order_item(item: &OrderItem) -> Result<()> {
    item.validate()
        .map_err(|e| Error::validation(format!("order item {}: {}", item.order_item_id, e)))
}

/// Validates a refund against the order it refunds.
pub fn validate_refund(refund: &Refund, order: &Order) -> Result<()> {
    refund
        .validate()
        .map_err(|e| Error::validation(format!("refund {}: {}", refund.refund_id, e)))?;

    if refund.timestamp < order.timestamp {
        return Err(Error::validation(format!(
            "refund {} issued before order {}",
            refund.refund_id, order.order_id
        )));
    }

    if refund.amount > order.value {
        return Err(Error::validation(format!(
            "refund {} of {:.2} exceeds order value {:.2}",
            refund.refund_id, refund.amount, order.value
        )));
    }

    Ok(())
}
