//! Fixed-point money type.
//!
//! All money amounts (cash, limit prices, fill prices, average cost,
//! invested capital) are `i64` micros: 1 USD = 1_000_000.
//!
//! `Micros` wraps the raw `i64` so the type system prevents:
//! - Implicit construction from raw `i64` (no `From<i64>` impl).
//! - Mixing `Micros` with share counts in arithmetic.
//!
//! # Arithmetic
//!
//! - `Add`, `Sub`, `Neg`, `AddAssign`, `SubAssign` for `Micros op Micros`.
//! - `saturating_add` / `saturating_sub` clamp at `i64::MAX` / `i64::MIN`.
//! - `checked_mul_qty` / `checked_div_qty` for price × shares and
//!   invested ÷ shares with overflow and zero-divisor detection.
//!
//! Percentages and returns are plain `f64`; [`Micros::to_f64`] is the only
//! way out of fixed-point and is used for ratio maths and JSON output.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Serialize, Serializer};

use crate::MICROS_SCALE;

// ---------------------------------------------------------------------------
// Micros newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount at 1e-6 scale (micros).
///
/// Use [`Micros::new`] for explicit construction from raw micros and
/// [`Micros::from_dollars`] for whole-dollar literals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Micros(i64);

impl Micros {
    /// Zero monetary amount.
    pub const ZERO: Micros = Micros(0);

    /// Maximum representable value.
    pub const MAX: Micros = Micros(i64::MAX);

    /// Minimum representable value.
    pub const MIN: Micros = Micros(i64::MIN);

    /// Construct from raw micros.
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Construct from a whole-dollar amount.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Micros(dollars * MICROS_SCALE)
    }

    /// Extract the underlying raw `i64`.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_sub(rhs.0))
    }

    #[inline]
    pub fn checked_add(self, rhs: Micros) -> Option<Micros> {
        self.0.checked_add(rhs.0).map(Micros)
    }

    /// `true` if this amount is strictly positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `true` if this amount is strictly negative.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply a per-unit price by an integer share quantity.
    ///
    /// Returns `None` on `i64` overflow. Overflow in a trade value is a
    /// data error, never a routine saturation.
    #[inline]
    pub fn checked_mul_qty(self, qty: i64) -> Option<Micros> {
        self.0.checked_mul(qty).map(Micros)
    }

    /// Divide a total amount by a share count (truncating toward zero).
    ///
    /// Returns `None` when `qty == 0`.
    #[inline]
    pub fn checked_div_qty(self, qty: i64) -> Option<Micros> {
        self.0.checked_div(qty).map(Micros)
    }

    /// Lossy conversion to dollars for ratio maths and reporting.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / MICROS_SCALE as f64
    }

    /// Render rounded to whole cents (half away from zero), e.g. `"400.00"`.
    ///
    /// Used by the order idempotency key, which compares limit prices at
    /// two decimals.
    pub fn fmt_cents(self) -> String {
        const CENT: i128 = (MICROS_SCALE / 100) as i128;
        let raw = self.0 as i128;
        let half = CENT / 2;
        let cents = if raw >= 0 {
            (raw + half) / CENT
        } else {
            (raw - half) / CENT
        };
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.abs();
        format!("{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic operators (closed over Micros)
// ---------------------------------------------------------------------------

impl Add for Micros {
    type Output = Micros;
    #[inline]
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0 + rhs.0)
    }
}

impl Sub for Micros {
    type Output = Micros;
    #[inline]
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0 - rhs.0)
    }
}

impl Neg for Micros {
    type Output = Micros;
    #[inline]
    fn neg(self) -> Micros {
        Micros(-self.0)
    }
}

impl AddAssign for Micros {
    #[inline]
    fn add_assign(&mut self, rhs: Micros) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Micros {
    #[inline]
    fn sub_assign(&mut self, rhs: Micros) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Micros {
    fn sum<I: Iterator<Item = Micros>>(iter: I) -> Micros {
        iter.fold(Micros::ZERO, |acc, m| acc + m)
    }
}

// ---------------------------------------------------------------------------
// Display / Serialize
// ---------------------------------------------------------------------------

/// Plain decimal dollars with at least two and at most six fraction digits:
/// `96.00`, `96.1234`, `-0.50`. This is also the CSV cell format.
impl std::fmt::Display for Micros {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let abs = (self.0 as i128).abs();
        let scale = MICROS_SCALE as i128;
        let dollars = abs / scale;
        let mut frac = format!("{:06}", abs % scale);
        while frac.len() > 2 && frac.ends_with('0') {
            frac.pop();
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{dollars}.{frac}")
    }
}

/// Serialized as a JSON number in dollars.
impl Serialize for Micros {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
