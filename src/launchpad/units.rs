//! Fixed-point units
//!
//! Token quantities are counted in the smallest unit of an 18-decimal token
//! and prices are native smallest units per WHOLE token, so a trade costs
//! `quantity * price / 10^18`. The product is formed in 256 bits because
//! `10^24` units at a `10^15` price already overflows a u128.

use primitive_types::U256;
use thiserror::Error;

/// Decimal places of every launchpad token and of the native currency
pub const DECIMALS: u8 = 18;

/// One whole token (or one native coin) in smallest units
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Errors from parsing or scaling amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Invalid amount '{0}': expected a non-negative decimal number")]
    Malformed(String),
    #[error("Too many decimal places in '{input}': at most {max} allowed")]
    TooPrecise { input: String, max: u8 },
    #[error("Amount '{0}' does not fit in 128 bits")]
    Overflow(String),
}

/// Scale a whole-token count to smallest units
pub fn scale_whole(whole: u64) -> Option<u128> {
    (whole as u128).checked_mul(ONE_TOKEN)
}

/// Native cost of `quantity` smallest token units at `price` per whole token.
///
/// Rounds down. Returns `None` only when the result exceeds a u128.
pub fn quote(quantity: u128, price: u128) -> Option<u128> {
    let cost = U256::from(quantity) * U256::from(price) / U256::from(ONE_TOKEN);
    if cost > U256::from(u128::MAX) {
        None
    } else {
        Some(cost.as_u128())
    }
}

/// Parse a decimal string such as `"0.001"` into smallest units
pub fn parse_units(input: &str, decimals: u8) -> Result<u128, UnitsError> {
    let trimmed = input.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction)
    {
        return Err(UnitsError::Malformed(input.to_string()));
    }

    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            input: input.to_string(),
            max: decimals,
        });
    }

    let overflow = || UnitsError::Overflow(input.to_string());
    let scale = 10u128.checked_pow(decimals as u32).ok_or_else(overflow)?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| overflow())?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padding = 10u128.pow((decimals as usize - fraction.len()) as u32);
        fraction.parse::<u128>().map_err(|_| overflow())? * padding
    };

    whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Parse a native-currency amount written in whole coins
pub fn parse_ether(input: &str) -> Result<u128, UnitsError> {
    parse_units(input, DECIMALS)
}

/// Render smallest units as a decimal string without trailing zeros
pub fn format_units(value: u128, decimals: u8) -> String {
    let scale = 10u128.pow(decimals as u32);
    let whole = value / scale;
    let fraction = value % scale;

    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_whole() {
        assert_eq!(scale_whole(1), Some(ONE_TOKEN));
        assert_eq!(
            scale_whole(1_000_000),
            Some(1_000_000_000_000_000_000_000_000)
        );
        // u64::MAX * 10^18 still fits in u128
        assert!(scale_whole(u64::MAX).is_some());
    }

    #[test]
    fn test_quote_reference_trade() {
        // 100 tokens at 0.001 per token cost exactly 0.1
        let quantity = 100 * ONE_TOKEN;
        let price = ONE_TOKEN / 1000;
        assert_eq!(quote(quantity, price), Some(ONE_TOKEN / 10));
    }

    #[test]
    fn test_quote_survives_u128_overflowing_product() {
        // 10^24 * 10^15 overflows u128 but the quotient does not
        let quantity = 1_000_000 * ONE_TOKEN;
        let price = ONE_TOKEN / 1000;
        assert_eq!(quote(quantity, price), Some(1_000 * ONE_TOKEN));
    }

    #[test]
    fn test_quote_rounds_down() {
        // 1 unit at 0.001 per token is far below one native unit
        assert_eq!(quote(1, ONE_TOKEN / 1000), Some(0));
        assert_eq!(quote(1_500, 1_000_000_000_000_000), Some(1));
    }

    #[test]
    fn test_quote_overflow() {
        assert_eq!(quote(u128::MAX, u128::MAX), None);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_ether("1").unwrap(), ONE_TOKEN);
        assert_eq!(parse_ether("0.001").unwrap(), ONE_TOKEN / 1000);
        assert_eq!(parse_ether(".5").unwrap(), ONE_TOKEN / 2);
        assert_eq!(parse_ether("100.").unwrap(), 100 * ONE_TOKEN);
        assert_eq!(parse_units("12.34", 2).unwrap(), 1234);
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert!(matches!(parse_ether(""), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_ether("."), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_ether("-1"), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_ether("1e18"), Err(UnitsError::Malformed(_))));
        assert!(matches!(
            parse_units("0.001", 2),
            Err(UnitsError::TooPrecise { .. })
        ));
        assert!(matches!(
            parse_ether("999999999999999999999999999999"),
            Err(UnitsError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(ONE_TOKEN, DECIMALS), "1");
        assert_eq!(format_units(ONE_TOKEN / 10, DECIMALS), "0.1");
        assert_eq!(format_units(1_500 * ONE_TOKEN / 1000, DECIMALS), "1.5");
        assert_eq!(format_units(1, DECIMALS), "0.000000000000000001");
        assert_eq!(format_units(0, DECIMALS), "0");
    }
}
