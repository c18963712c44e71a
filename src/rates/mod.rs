//! exchange-rate lookup
//!
//! the combination engine takes a plain `f64`; providers sit behind the
//! `RateProvider` seam so runs can use the live API, a fixed override, or a
//! stub in tests

mod coinbase;

pub use coinbase::CoinbaseClient;

use serde_json::Value as JsonValue;

use crate::error::RateError;

pub trait RateProvider {
    /// units of `to` for one unit of `from`
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError>;
}

/// a rate supplied up front, e.g. from `--rate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRate(pub f64);

impl RateProvider for FixedRate {
    fn rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        check_usable(self.0, from, to)
    }
}

/// only finite, strictly positive rates price anything meaningfully
pub fn check_usable(rate: f64, from: &str, to: &str) -> Result<f64, RateError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(RateError::Unusable {
            from: from.to_string(),
            to: to.to_string(),
            rate,
        })
    }
}

/// extract `data.rates[to]` from an exchange-rates response body
///
/// the rate may be a JSON string (the usual shape) or a number
pub fn parse_rate_response(body: &JsonValue, from: &str, to: &str) -> Result<f64, RateError> {
    let rates = body
        .get("data")
        .and_then(|d| d.get("rates"))
        .and_then(JsonValue::as_object)
        .ok_or_else(|| RateError::Malformed("missing 'data.rates' object".to_string()))?;

    let missing = || RateError::MissingCurrency {
        from: from.to_string(),
        to: to.to_string(),
    };

    let rate = match rates.get(to).ok_or_else(missing)? {
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| RateError::Malformed(format!("rate for {} is {:?}", to, s)))?,
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| RateError::Malformed(format!("rate for {} is {}", to, n)))?,
        JsonValue::Null => return Err(missing()),
        other => {
            return Err(RateError::Malformed(format!(
                "rate for {} is {}",
                to, other
            )))
        }
    };

    check_usable(rate, from, to)
}
