//! Conversion between minor units and native-unit decimal strings

use alloy::primitives::utils::parse_units;
use alloy::primitives::U256;

/// Decimals of the ledger's native currency
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimal places used when presenting a balance
pub const DISPLAY_DECIMALS: u32 = 4;

/// Format a U256 value with decimals, trimming trailing zeros
pub fn format_units(value: U256, decimals: u32) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let remainder_str = format!(
        "{:0>width$}",
        remainder.to_string(),
        width = decimals as usize
    );
    let trimmed = remainder_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

/// Format minor units as a native-unit decimal string
pub fn format_native(value: U256) -> String {
    format_units(value, NATIVE_DECIMALS as u32)
}

/// Parse a native-unit decimal string into minor units
pub fn parse_native(amount: &str) -> Result<U256, String> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(format!("negative amount: {}", amount));
    }
    parse_units(amount, NATIVE_DECIMALS)
        .map(|units| units.get_absolute())
        .map_err(|e| format!("invalid amount '{}': {}", amount, e))
}

/// Round a native-unit decimal string half-up to `places` decimals
///
/// Returns `None` when the input is not a decimal amount.
pub fn round_decimal(amount: &str, places: u32) -> Option<String> {
    let minor = parse_native(amount).ok()?;
    let step = U256::from(10).pow(U256::from(NATIVE_DECIMALS as u32 - places));
    let rounded = (minor + step / U256::from(2)) / step;

    let scale = U256::from(10).pow(U256::from(places));
    let whole = rounded / scale;
    if places == 0 {
        return Some(whole.to_string());
    }
    let frac = rounded % scale;
    Some(format!(
        "{}.{:0>width$}",
        whole,
        frac.to_string(),
        width = places as usize
    ))
}
