//! Money Conversion Module
//!
//! Conversion between the network's base unit (lamports, `u64`) and the
//! display unit (SOL, `Decimal`). All conversions go through this module.
//!
//! ## Rounding
//! - Display → base: multiply by 10^9 and truncate toward zero. Digits finer
//!   than one lamport are dropped, never rounded up.
//! - Base → display: exact, every `u64` lamport value is representable.
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use sol_wallet_desk::money::{to_base_units, to_display_units};
//!
//! let lamports = to_base_units(Decimal::new(15, 1)).unwrap(); // 1.5 SOL
//! assert_eq!(lamports, 1_500_000_000);
//! assert_eq!(to_display_units(lamports), Decimal::new(15, 1));
//! ```

use std::str::FromStr;

use rust_decimal::prelude::*;
use thiserror::Error;

/// Decimal places of the display unit
pub const SOL_DECIMALS: u32 = 9;

/// Base units per display unit
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Fraction digits shown by [`format_sol`] unless told otherwise
pub const DEFAULT_DISPLAY_DIGITS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Amount must not be negative")]
    Negative,

    #[error("Amount too large, would overflow")]
    Overflow,
}

// ============================================================================
// Parse: Client → Decimal
// ============================================================================

/// Parse a user-entered amount in display units.
///
/// Accepts plain decimals (`"0.01"`, `"5"`) and scientific notation
/// (`"1e-3"`). Zero is accepted; negatives are not.
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    let value = Decimal::from_str(amount_str)
        .or_else(|_| Decimal::from_scientific(amount_str))
        .map_err(|e| MoneyError::InvalidFormat(format!("{}: {}", amount_str, e)))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(MoneyError::Negative);
    }

    Ok(value)
}

/// `true` iff `s` is a decimal number greater than zero.
///
/// Numbers outside `Decimal`'s range or scale are still judged by their
/// digits, so `"1e40"` is positive even though it cannot be sent.
pub fn is_positive_amount(s: &str) -> bool {
    match parse_amount(s) {
        Ok(v) if v > Decimal::ZERO => true,
        _ => has_nonzero_mantissa(s.trim()),
    }
}

/// `[+]digits[.digits][e[+|-]digits]` with at least one non-zero mantissa digit
fn has_nonzero_mantissa(s: &str) -> bool {
    let s = s.strip_prefix('+').unwrap_or(s);
    let (mantissa, exponent) = match s.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (s, None),
    };

    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int.is_empty() && frac.is_empty() {
        return false;
    }
    let mut digits = int.bytes().chain(frac.bytes());
    digits.clone().all(|b| b.is_ascii_digit()) && digits.any(|b| b != b'0')
}

// ============================================================================
// Unit conversion
// ============================================================================

/// Convert display units to base units, truncating toward zero
pub fn to_base_units(amount: Decimal) -> Result<u64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative);
    }

    amount
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .map(|scaled| scaled.trunc())
        .and_then(|scaled| scaled.to_u64())
        .ok_or(MoneyError::Overflow)
}

/// Convert base units to display units (exact)
pub fn to_display_units(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, SOL_DECIMALS).normalize()
}

// ============================================================================
// Format: Decimal → Display string
// ============================================================================

/// Format an amount for display, e.g. `"1,234.5 SOL"`.
///
/// At most `digits` fraction digits are shown (half away from zero), trailing
/// zeros are dropped and the integer part is grouped by thousands.
pub fn format_sol(amount: Decimal, digits: u32) -> String {
    let rounded = amount
        .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let text = rounded.abs().to_string();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match frac {
        Some(f) => format!("{}{}.{} SOL", sign, grouped, f),
        None => format!("{}{} SOL", sign, grouped),
    }
}
