use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::LedgerError;
use crate::feed::types::ApiTrade;
use crate::models::NormalizedTrade;

/// Convert a raw feed record into a canonical trade. Pure transform: no
/// side effects, one bad record never aborts a batch — callers log the
/// `Validation` error and move on.
///
/// Rules: price must lie in (0, 1] (a zero or negative price makes the
/// share count undefined); notional must be positive, derived from
/// `size × price` when the feed omits it. Trades below `alert_floor` are
/// accepted but flagged so downstream skips alert classification.
pub fn normalize_trade(
    raw: &ApiTrade,
    alert_floor: Decimal,
) -> Result<NormalizedTrade, LedgerError> {
    let external_id = require_str(raw.id.as_deref(), "trade id")?;
    let market_id = require_str(raw.market.as_deref(), "market id")?;
    let trader_address = require_str(raw.trader_address.as_deref(), "trader address")?;
    let outcome = require_str(raw.outcome.as_deref(), "outcome")?;

    let price = raw
        .price
        .ok_or_else(|| LedgerError::Validation("missing price".into()))?;
    if price <= Decimal::ZERO || price > Decimal::ONE {
        return Err(LedgerError::Validation(format!(
            "price {price} outside (0, 1]"
        )));
    }

    let notional = match raw.notional {
        Some(n) => n,
        None => {
            let size = raw
                .size
                .ok_or_else(|| LedgerError::Validation("missing size and notional".into()))?;
            size.abs() * price
        }
    };
    if notional <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "non-positive notional {notional}"
        )));
    }

    let occurred_at = parse_trade_timestamp(raw.timestamp.as_ref())
        .ok_or_else(|| LedgerError::Validation("missing or unparseable timestamp".into()))?;

    Ok(NormalizedTrade {
        external_id: external_id.to_string(),
        market_id: market_id.to_string(),
        trader_address: trader_address.to_string(),
        outcome: outcome.to_string(),
        share_amount: notional / price,
        notional,
        price,
        occurred_at,
        below_alert_floor: notional < alert_floor,
    })
}

fn require_str<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, LedgerError> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| LedgerError::Validation(format!("missing {field}")))
}

/// Feed timestamps arrive as epoch seconds, epoch milliseconds, or RFC 3339,
/// as a JSON number or string.
fn parse_trade_timestamp(ts: Option<&serde_json::Value>) -> Option<DateTime<Utc>> {
    ts.and_then(|t| match t {
        serde_json::Value::Number(n) => {
            let secs = n.as_i64()?;
            // If >1e12, it's milliseconds
            if secs > 1_000_000_000_000 {
                chrono::DateTime::from_timestamp(secs / 1000, ((secs % 1000) * 1_000_000) as u32)
            } else {
                chrono::DateTime::from_timestamp(secs, 0)
            }
        }
        serde_json::Value::String(s) => {
            if let Ok(secs) = s.parse::<i64>() {
                if secs > 1_000_000_000_000 {
                    return chrono::DateTime::from_timestamp(
                        secs / 1000,
                        ((secs % 1000) * 1_000_000) as u32,
                    );
                }
                return chrono::DateTime::from_timestamp(secs, 0);
            }
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    })
}
