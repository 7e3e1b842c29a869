//! Boundary conversions into [`Micros`].
//!
//! Two entry points, one per kind of input:
//!
//! | Input                         | Function            | Notes                         |
//! |-------------------------------|---------------------|-------------------------------|
//! | decimal text (CSV cell, text) | [`parse_micros`]    | no floats, ≤ 6 decimal places |
//! | `f64` from a JSON snapshot    | [`micros_from_f64`] | rounds to the nearest micro   |
//!
//! No other code path should produce `Micros` from untyped input.

use crate::{Micros, MICROS_SCALE};

// ---------------------------------------------------------------------------
// PriceError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    Empty,
    Invalid { raw: String },
    TooManyDecimalPlaces { raw: String },
    /// `NaN` or infinite `f64`.
    NotFinite,
    OutOfRange { raw: String },
}

impl std::fmt::Display for PriceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "price is empty"),
            Self::Invalid { raw } => write!(f, "price is not a decimal number: '{raw}'"),
            Self::TooManyDecimalPlaces { raw } => {
                write!(f, "price has more than 6 decimal places: '{raw}'")
            }
            Self::NotFinite => write!(f, "price is not finite (NaN or Inf)"),
            Self::OutOfRange { raw } => write!(f, "price out of range: '{raw}'"),
        }
    }
}

impl std::error::Error for PriceError {}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Parse a decimal dollar string (`"96"`, `"96.5"`, `"-0.25"`, `"+1.000001"`)
/// into micros without going through floating point.
pub fn parse_micros(s: &str) -> Result<Micros, PriceError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(PriceError::Empty);
    }
    let invalid = || PriceError::Invalid { raw: s.to_string() };

    let (negative, digits) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }
    if frac_part.len() > 6 {
        return Err(PriceError::TooManyDecimalPlaces { raw: s.to_string() });
    }

    let out_of_range = || PriceError::OutOfRange { raw: s.to_string() };
    let int_val: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<i64>().map_err(|_| out_of_range())?
    };
    // Right-pad the fraction to exactly 6 digits: "5" -> "500000".
    let frac_val: i64 = if frac_part.is_empty() {
        0
    } else {
        format!("{frac_part:0<6}").parse::<i64>().map_err(|_| invalid())?
    };

    let magnitude = int_val
        .checked_mul(MICROS_SCALE)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or_else(out_of_range)?;

    Ok(Micros::new(if negative { -magnitude } else { magnitude }))
}

/// Convert an `f64` dollar amount into micros, rounding to the nearest micro.
pub fn micros_from_f64(value: f64) -> Result<Micros, PriceError> {
    if !value.is_finite() {
        return Err(PriceError::NotFinite);
    }
    let scaled = (value * MICROS_SCALE as f64).round();
    if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
        return Err(PriceError::OutOfRange {
            raw: value.to_string(),
        });
    }
    Ok(Micros::new(scaled as i64))
}
