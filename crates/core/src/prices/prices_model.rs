use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::prices_errors::PriceError;

/// The four request kinds the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOperation {
    Insert,
    Select,
    Update,
    Delete,
}

impl PriceOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceOperation::Insert => "Insert",
            PriceOperation::Select => "Select",
            PriceOperation::Update => "Update",
            PriceOperation::Delete => "Delete",
        }
    }
}

impl fmt::Display for PriceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request kinds that change stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Insert,
    Update,
    Delete,
}

impl From<Mutation> for PriceOperation {
    fn from(mutation: Mutation) -> Self {
        match mutation {
            Mutation::Insert => PriceOperation::Insert,
            Mutation::Update => PriceOperation::Update,
            Mutation::Delete => PriceOperation::Delete,
        }
    }
}

/// Symbols are stored and compared uppercase.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase()
}

/// Prices are kept in their lowercase textual form (`1E5` -> `1e5`).
pub fn normalize_price(price: &str) -> String {
    price.to_lowercase()
}

/// Accepts what a strict float parser would: decimal and exponent forms,
/// `inf`/`infinity`/`nan` with an optional sign, and hex floats with a
/// mandatory binary exponent (`0x1.8p1`). Finite input that overflows `f64`
/// is rejected. Expects lowercase input.
fn is_float(price: &str) -> bool {
    let unsigned = price.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(price);
    if let Some(hex) = unsigned.strip_prefix("0x") {
        return parse_hex_float(hex).is_some_and(f64::is_finite);
    }
    match price.parse::<f64>() {
        Ok(value) if value.is_infinite() => matches!(unsigned, "inf" | "infinity"),
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Parses the part of a hex float after `0x`, e.g. `1.8p1`.
fn parse_hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = hex.split_once('p')?;

    let mut value = 0f64;
    let mut digits = 0usize;
    let mut frac_digits = 0i64;
    let mut seen_point = false;
    for c in mantissa.chars() {
        if c == '.' {
            if seen_point {
                return None;
            }
            seen_point = true;
            continue;
        }
        value = value * 16.0 + f64::from(c.to_digit(16)?);
        digits += 1;
        if seen_point {
            frac_digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    let exp_digits = exponent.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(exponent);
    if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if value == 0.0 {
        return Some(0.0);
    }
    let exponent: i64 = exponent.parse().ok()?;

    let mut remaining = (exponent - 4 * frac_digits).clamp(-4000, 4000) as i32;
    while remaining != 0 {
        let step = remaining.clamp(-1000, 1000);
        value *= 2f64.powi(step);
        remaining -= step;
    }
    Some(value)
}

/// One tracked currency and its current price.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CurrencyRecord {
    pub currency_type: String,
    pub currency_price: String,
}

impl CurrencyRecord {
    /// Builds a record from request input.
    ///
    /// Normalizes both parts, then rejects an empty symbol or a price that
    /// does not parse as a floating-point number.
    pub fn parse(
        symbol: &str,
        price: &str,
        operation: PriceOperation,
    ) -> std::result::Result<Self, PriceError> {
        let currency_type = normalize_symbol(symbol);
        let currency_price = normalize_price(price);

        if currency_type.is_empty() {
            return Err(PriceError::EmptySymbol(operation));
        }
        if !is_float(&currency_price) {
            return Err(PriceError::PriceNotNumber(operation));
        }

        Ok(Self {
            currency_type,
            currency_price,
        })
    }

    /// Rebuilds a record from a stored row. Stored prices were validated on
    /// their way in, so no parsing happens here.
    pub fn from_store(currency_type: String, currency_price: String) -> Self {
        Self {
            currency_type,
            currency_price,
        }
    }
}

/// Audit entry written once per successful update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub id: i32,
    pub currency_type: String,
    pub original_price: String,
    pub new_price: String,
    pub created_at: NaiveDateTime,
}

/// Outcome of a mutation that passed validation and the existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReply {
    pub mutation: Mutation,
    pub currency_type: String,
    /// False when the store write failed. The failure is logged and the
    /// reply text is unchanged.
    pub persisted: bool,
}

impl MutationReply {
    pub fn new(mutation: Mutation, currency_type: String, persisted: bool) -> Self {
        Self {
            mutation,
            currency_type,
            persisted,
        }
    }

    /// Human-readable reply text for this outcome.
    pub fn message(&self) -> String {
        match self.mutation {
            Mutation::Insert => format!("{} insert success", self.currency_type),
            Mutation::Update => format!("Update {} success", self.currency_type),
            Mutation::Delete => format!("Delete {} success", self.currency_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_symbol_and_price() {
        let record = CurrencyRecord::parse("eth", "1E5", PriceOperation::Insert).unwrap();
        assert_eq!(record.currency_type, "ETH");
        assert_eq!(record.currency_price, "1e5");
    }

    #[test]
    fn parse_rejects_empty_symbol_before_price() {
        let err = CurrencyRecord::parse("", "abc", PriceOperation::Update).unwrap_err();
        assert_eq!(err, PriceError::EmptySymbol(PriceOperation::Update));
    }

    #[test]
    fn parse_rejects_non_numeric_prices() {
        for price in ["abc", "", "1.2.3", "12,5", "1e400", "-1e400", "infinite"] {
            let err = CurrencyRecord::parse("btc", price, PriceOperation::Insert).unwrap_err();
            assert_eq!(err, PriceError::PriceNotNumber(PriceOperation::Insert), "{price}");
        }
    }

    #[test]
    fn parse_accepts_float_forms() {
        for price in ["0", "-3", "1234.5", ".5", "1e-3", "+7.25", "1e-400"] {
            assert!(CurrencyRecord::parse("btc", price, PriceOperation::Insert).is_ok(), "{price}");
        }
    }

    #[test]
    fn parse_accepts_spelled_out_infinity_and_nan() {
        for price in ["inf", "+Inf", "-INFINITY", "NaN"] {
            assert!(CurrencyRecord::parse("btc", price, PriceOperation::Update).is_ok(), "{price}");
        }
    }

    #[test]
    fn parse_handles_hex_floats() {
        for price in ["0x1p4", "0X1P-2", "-0x1.8p1", "0x.8p0", "0x0p99999"] {
            assert!(CurrencyRecord::parse("btc", price, PriceOperation::Insert).is_ok(), "{price}");
        }
        for price in ["0x1", "0xp4", "0x1p", "0x1.2.3p1", "0xgp1", "0x1p2000"] {
            let err = CurrencyRecord::parse("btc", price, PriceOperation::Insert).unwrap_err();
            assert_eq!(err, PriceError::PriceNotNumber(PriceOperation::Insert), "{price}");
        }
    }

    #[test]
    fn hex_float_values() {
        assert_eq!(parse_hex_float("1p4"), Some(16.0));
        assert_eq!(parse_hex_float("1.8p1"), Some(3.0));
        assert_eq!(parse_hex_float("1p-2"), Some(0.25));
        assert_eq!(parse_hex_float("ff"), None);
    }

    #[test]
    fn record_serializes_with_pascal_case_keys() {
        let record = CurrencyRecord::from_store("ETH".into(), "1234.5".into());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"CurrencyType":"ETH","CurrencyPrice":"1234.5"}"#);
    }

    #[test]
    fn reply_messages() {
        let ins = MutationReply::new(Mutation::Insert, "ETH".into(), true);
        let upd = MutationReply::new(Mutation::Update, "ETH".into(), true);
        let del = MutationReply::new(Mutation::Delete, "ETH".into(), false);
        assert_eq!(ins.message(), "ETH insert success");
        assert_eq!(upd.message(), "Update ETH success");
        assert_eq!(del.message(), "Delete ETH success");
    }

    #[test]
    fn mutations_map_to_their_operation() {
        assert_eq!(PriceOperation::from(Mutation::Insert), PriceOperation::Insert);
        assert_eq!(PriceOperation::from(Mutation::Update), PriceOperation::Update);
        assert_eq!(PriceOperation::from(Mutation::Delete), PriceOperation::Delete);
    }
}
