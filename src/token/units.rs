//! Conversion between minimal units and display units
//!
//! A display amount is the minimal-unit amount divided by `10^decimals`.

use alloy_primitives::U256;

/// Largest decimal count whose scale `10^decimals` fits in 256 bits
pub const MAX_DECIMALS: u8 = 77;

/// `10^decimals`, or `None` if it does not fit
pub fn scale(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Render minimal units as a display string, trimming trailing zeros
pub fn format_units(amount: U256, decimals: u8) -> String {
    let Some(scale) = scale(decimals) else {
        return amount.to_string();
    };
    if decimals == 0 {
        return amount.to_string();
    }

    let whole = amount / scale;
    let fraction = amount % scale;
    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse a display string into minimal units
///
/// Returns `None` for malformed input, too many fractional digits, or overflow.
pub fn parse_units(text: &str, decimals: u8) -> Option<U256> {
    let text = text.trim();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    if fraction.len() > decimals as usize {
        return None;
    }

    let scale = scale(decimals)?;
    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).ok()?
    };

    let fraction = if fraction.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        U256::from_str_radix(&padded, 10).ok()?
    };

    whole.checked_mul(scale)?.checked_add(fraction)
}
