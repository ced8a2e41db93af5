//! Price and quantity parsing
//!
//! Admin input is free text ("$9", "12.5", "6 pc"). Prices are cleaned to
//! digits and a decimal point and rendered with two decimals using
//! rust_decimal; quantities are cleaned to digits and sign and parsed as
//! integers.

use rust_decimal::prelude::*;
use serde_json::{Number, Value};

/// Rounding for rendered prices (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Null or whitespace-only string
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Normalize a price to a fixed two-decimal string
///
/// Returns `None` when nothing numeric is left after cleaning, or when a
/// JSON number is out of `Decimal` range.
pub fn normalize_price(value: &Value) -> Option<String> {
    let amount = match value {
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            parse_decimal(&cleaned)?
        }
        Value::Number(n) => decimal_from_number(n)?.abs(),
        _ => return None,
    };

    let mut rounded =
        amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DECIMAL_PLACES);
    Some(rounded.to_string())
}

fn decimal_from_number(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    Decimal::from_f64(n.as_f64()?)
}

/// Resolve an integer quantity
///
/// JSON integers (and integral floats) are taken as-is; strings keep only
/// digits and `-` before parsing.
pub fn resolve_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64 / 2.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            cleaned.parse::<i64>().ok()
        }
        _ => None,
    }
}

/// Digits with at most one decimal point (".5" and "5." are accepted)
fn parse_decimal(cleaned: &str) -> Option<Decimal> {
    if !cleaned.chars().any(|c| c.is_ascii_digit()) || cleaned.matches('.').count() > 1 {
        return None;
    }
    let mut text = String::with_capacity(cleaned.len() + 2);
    if cleaned.starts_with('.') {
        text.push('0');
    }
    text.push_str(cleaned);
    if cleaned.ends_with('.') {
        text.push('0');
    }
    Decimal::from_str(&text).ok()
}
