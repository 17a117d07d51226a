//! Denomination-aware formatting of block fee figures.
//!
//! Every function here is pure and total. An absent input always yields an
//! absent output, never `"0"` or a placeholder: zero is a real value, and
//! how "unknown" looks on screen is the caller's decision.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wei per gwei.
pub const WEI_PER_GWEI: f64 = 1e9;

/// Wei per ether.
pub const WEI_PER_ETH: f64 = 1e18;

/// Unit fees are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    /// The chain's native currency (ETH).
    #[default]
    #[serde(alias = "eth")]
    Native,
    /// US dollars.
    #[serde(alias = "usd")]
    Fiat,
}

impl Denomination {
    /// Short unit label shown next to fee amounts.
    pub fn label(&self) -> &'static str {
        match self {
            Denomination::Native => "ETH",
            Denomination::Fiat => "USD",
        }
    }

    /// The other denomination.
    pub fn toggle(self) -> Self {
        match self {
            Denomination::Native => Denomination::Fiat,
            Denomination::Fiat => Denomination::Native,
        }
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Denomination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eth" | "native" => Ok(Denomination::Native),
            "usd" | "fiat" => Ok(Denomination::Fiat),
            other => Err(format!("unknown unit '{}', expected eth or usd", other)),
        }
    }
}

/// Format a base fee given in wei as whole gwei.
///
/// `format_gas(Some(21e9))` is `Some("21")`.
pub fn format_gas(value: Option<f64>) -> Option<String> {
    value.and_then(|wei| format_fixed(wei / WEI_PER_GWEI, 0))
}

/// Format a block's fees in the selected denomination.
///
/// Native amounts are wei rendered as ether with two decimals; fiat amounts
/// are rounded to whole units. Only the selected value is looked at.
pub fn format_fee(
    denomination: Denomination,
    native: Option<f64>,
    fiat: Option<f64>,
) -> Option<String> {
    match denomination {
        Denomination::Native => native.and_then(|wei| format_fixed(wei / WEI_PER_ETH, 2)),
        Denomination::Fiat => fiat.and_then(|usd| format_fixed(usd, 0)),
    }
}

/// Format a block height, e.g. `#17,000,000`.
pub fn format_block_number(number: Option<u64>) -> Option<String> {
    number.map(|n| format!("#{}", group_thousands(u128::from(n))))
}

/// Format the block lag count.
pub fn format_block_lag(lag: Option<u64>) -> Option<String> {
    lag.map(|n| n.to_string())
}

/// Format the age of the latest block in seconds.
pub fn format_elapsed(elapsed_seconds: Option<u64>) -> Option<String> {
    elapsed_seconds.map(|s| s.to_string())
}

/// Fixed-point rendering with `,` thousands grouping.
///
/// Rounds half away from zero. Non-finite input has no meaningful
/// rendering and is treated as absent.
fn format_fixed(value: f64, decimals: u32) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let scale = 10u128.pow(decimals);
    let scaled = (value * scale as f64).round();
    let negative = scaled < 0.0;
    let magnitude = scaled.abs() as u128;

    let int_part = group_thousands(magnitude / scale);
    let sign = if negative { "-" } else { "" };

    if decimals == 0 {
        Some(format!("{}{}", sign, int_part))
    } else {
        let frac_part = magnitude % scale;
        Some(format!(
            "{}{}.{:0width$}",
            sign,
            int_part,
            frac_part,
            width = decimals as usize
        ))
    }
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_inputs_stay_absent() {
        assert_eq!(format_gas(None), None);
        assert_eq!(format_fee(Denomination::Native, None, Some(3000.0)), None);
        assert_eq!(format_fee(Denomination::Fiat, Some(1e18), None), None);
        assert_eq!(format_fee(Denomination::Native, None, None), None);
        assert_eq!(format_block_number(None), None);
        assert_eq!(format_block_lag(None), None);
        assert_eq!(format_elapsed(None), None);
    }

    #[test]
    fn test_zero_is_not_absent() {
        assert_eq!(format_gas(Some(0.0)).as_deref(), Some("0"));
        assert_eq!(format_fee(Denomination::Native, Some(0.0), None).as_deref(), Some("0.00"));
        assert_eq!(format_fee(Denomination::Fiat, None, Some(0.0)).as_deref(), Some("0"));
        assert_eq!(format_block_lag(Some(0)).as_deref(), Some("0"));
    }

    #[test]
    fn test_format_gas_in_whole_gwei() {
        assert_eq!(format_gas(Some(21_000_000_000.0)).as_deref(), Some("21"));
        assert_eq!(format_gas(Some(12_600_000_000.0)).as_deref(), Some("13"));
        assert_eq!(format_gas(Some(12_400_000_000.0)).as_deref(), Some("12"));
        assert_eq!(format_gas(Some(1_234_000_000_000.0)).as_deref(), Some("1,234"));
    }

    #[test]
    fn test_format_fee_native_ignores_fiat() {
        let formatted = format_fee(Denomination::Native, Some(1e18), Some(3000.0));
        assert_eq!(formatted.as_deref(), Some("1.00"));

        let formatted = format_fee(Denomination::Native, Some(123_456_789_000_000_000.0), None);
        assert_eq!(formatted.as_deref(), Some("0.12"));

        let formatted = format_fee(Denomination::Native, Some(2_345e18), None);
        assert_eq!(formatted.as_deref(), Some("2,345.00"));
    }

    #[test]
    fn test_format_fee_fiat_zero_decimals() {
        let formatted = format_fee(Denomination::Fiat, Some(1e18), Some(2800.5));
        assert_eq!(formatted.as_deref(), Some("2,801"));

        let formatted = format_fee(Denomination::Fiat, None, Some(1_234_567.0));
        assert_eq!(formatted.as_deref(), Some("1,234,567"));
    }

    #[test]
    fn test_non_finite_is_absent() {
        assert_eq!(format_gas(Some(f64::NAN)), None);
        assert_eq!(format_fee(Denomination::Fiat, None, Some(f64::INFINITY)), None);
    }

    #[test]
    fn test_format_block_number() {
        assert_eq!(format_block_number(Some(17_000_000)).as_deref(), Some("#17,000,000"));
        assert_eq!(format_block_number(Some(0)).as_deref(), Some("#0"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let a = format_fee(Denomination::Native, Some(5.6e16), Some(100.0));
        let b = format_fee(Denomination::Native, Some(5.6e16), Some(100.0));
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("0.06"));
    }

    #[test]
    fn test_denomination_parse_and_toggle() {
        assert_eq!("eth".parse::<Denomination>().unwrap(), Denomination::Native);
        assert_eq!("USD".parse::<Denomination>().unwrap(), Denomination::Fiat);
        assert!("btc".parse::<Denomination>().is_err());
        assert_eq!(Denomination::Native.toggle(), Denomination::Fiat);
        assert_eq!(Denomination::Fiat.toggle().label(), "ETH");
    }
}
