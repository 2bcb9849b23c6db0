//! Money parsing and currency formatting
//!
//! Keeps currency rendering consistent across insight text (e.g.
//! `MYR 5,659.68`) and infers the dominant currency of a statement so
//! generated insights can name amounts in the right currency.

use std::collections::HashMap;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

/// Currency assumed when a statement carries no usable currency codes
pub const DEFAULT_CURRENCY: &str = "MYR";

/// Marker returned when no single currency dominates a statement
pub const MULTI_CURRENCY: &str = "MULTI";

/// Share of transactions a currency needs to count as dominant
const DOMINANT_THRESHOLD: f64 = 0.9;

/// Parse a raw amount string into an exact decimal, tolerating dirty input
///
/// Statement extraction upstream produces the occasional malformed amount.
/// Strategy: exact decimal parse first, then a float rescue for scientific
/// notation and the like, and finally zero with a warning. Summation never
/// aborts on a single bad record.
pub fn parse_amount_lenient(raw: &str) -> Decimal {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    match cleaned.parse::<Decimal>() {
        Ok(value) => value,
        Err(_) => match cleaned.parse::<f64>() {
            Ok(float_value) => Decimal::from_f64(float_value).unwrap_or_else(|| {
                warn!(raw, "Amount not representable as decimal, using zero");
                Decimal::ZERO
            }),
            Err(_) => {
                warn!(raw, "Unparsable amount, using zero");
                Decimal::ZERO
            }
        },
    }
}

/// Format money as `CODE 1,234.56`: currency code, space, thousands
/// separators, two decimals
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let code = normalize_code(currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative();
    let magnitude = rounded.abs();

    let plain = format!("{:.2}", magnitude);
    let (whole, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let grouped = group_thousands(whole);

    if negative {
        format!("{} -{}.{}", code, grouped, frac)
    } else {
        format!("{} {}.{}", code, grouped, frac)
    }
}

/// Detect the statement-level currency from per-transaction currency codes
///
/// A single currency covering at least 90% of the labeled transactions wins;
/// mixed statements report `MULTI`; no usable codes at all reports the
/// default currency.
pub fn detect_dominant_currency<'a, I>(currencies: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let normalized: Vec<String> = currencies
        .into_iter()
        .filter_map(|c| c.and_then(normalize_code))
        .collect();

    if normalized.is_empty() {
        return DEFAULT_CURRENCY.to_string();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for code in &normalized {
        *counts.entry(code.as_str()).or_default() += 1;
    }

    // Ties broken by code so the result is stable
    let (code, count) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .unwrap_or((DEFAULT_CURRENCY, 0));

    let share = count as f64 / normalized.len() as f64;
    if share >= DOMINANT_THRESHOLD {
        code.to_string()
    } else {
        MULTI_CURRENCY.to_string()
    }
}

fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

fn group_thousands(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        let remaining = chars.len() - i;
        if i > 0 && remaining % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_amount_exact() {
        assert_eq!(parse_amount_lenient("50"), dec("50"));
        assert_eq!(parse_amount_lenient("5659.68"), dec("5659.68"));
        assert_eq!(parse_amount_lenient(" 1,234.50 "), dec("1234.50"));
    }

    #[test]
    fn test_parse_amount_float_rescue() {
        assert_eq!(parse_amount_lenient("1.5e2"), dec("150"));
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        assert_eq!(parse_amount_lenient("N/A"), Decimal::ZERO);
        assert_eq!(parse_amount_lenient(""), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("12.3.4"), Decimal::ZERO);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("5659.68"), "myr"), "MYR 5,659.68");
        assert_eq!(format_money(dec("50"), "USD"), "USD 50.00");
        assert_eq!(format_money(dec("1234567.891"), "EUR"), "EUR 1,234,567.89");
        assert_eq!(format_money(dec("-42.5"), "USD"), "USD -42.50");
        assert_eq!(format_money(dec("0"), ""), "MYR 0.00");
    }

    #[test]
    fn test_detect_dominant_currency() {
        let codes = vec![Some("MYR"), Some("myr"), Some("MYR"), None, Some("")];
        assert_eq!(detect_dominant_currency(codes), "MYR");
    }

    #[test]
    fn test_detect_mixed_currencies() {
        let codes = vec![Some("MYR"), Some("USD"), Some("MYR"), Some("USD")];
        assert_eq!(detect_dominant_currency(codes), MULTI_CURRENCY);
    }

    #[test]
    fn test_detect_no_codes_uses_default() {
        assert_eq!(detect_dominant_currency(vec![None, None]), DEFAULT_CURRENCY);
        assert_eq!(
            detect_dominant_currency(Vec::<Option<&str>>::new()),
            DEFAULT_CURRENCY
        );
    }
}
