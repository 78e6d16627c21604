//! Integer-first ratio type and helpers.
//!
//! Damped averages are `total / (votes + damping)`. They are compared by
//! cross-multiplication so that equal averages tie exactly and ordering never
//! depends on float rounding. Thresholds are configured as floats; a
//! [`Threshold`] holds the exact decimal they were written as, so
//! `average >= threshold` is decided without rounding either side. `as_f64`
//! exists for display only.

use crate::errors::CoreError;
use core::cmp::Ordering;

/// Exact ratio with a positive denominator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ratio {
    pub num: i128,
    pub den: i128,
}

#[inline]
fn abs_i128(x: i128) -> i128 { if x < 0 { -x } else { x } }

fn gcd_i128(mut a: i128, mut b: i128) -> i128 {
    a = abs_i128(a);
    b = abs_i128(b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    if a == 0 { 1 } else { a }
}

/// Construct a ratio, ensuring `den > 0` and reducing by GCD.
pub fn new_ratio_checked(num: i128, den: i128) -> Result<Ratio, CoreError> {
    if den == 0 {
        return Err(CoreError::DomainOutOfRange("ratio denominator is zero"));
    }
    let (mut n, mut d) = (num, den);
    if d < 0 {
        n = -n;
        d = -d;
    }
    let g = gcd_i128(n, d);
    Ok(Ratio { num: n / g, den: d / g })
}

/// Damped average `total / (votes + damping)`. `None` when the denominator is 0
/// (no votes and no damping).
pub fn damped_average(total: i64, votes: u32, damping: u32) -> Option<Ratio> {
    let den = i128::from(votes) + i128::from(damping);
    new_ratio_checked(i128::from(total), den).ok()
}

/// Compare two ratios exactly. Operands stay far below `i128` range for any
/// weight/vote counts the engine accepts, so the products cannot overflow.
pub fn compare_ratio(a: &Ratio, b: &Ratio) -> Ordering {
    (a.num * b.den).cmp(&(b.num * a.den))
}

/// Exact value of the shortest decimal that reads back as `x`: a threshold
/// written as `4.1666` is 41666/10000. `None` for non-finite values or when
/// the digits do not fit in `i128`.
pub fn decimal_ratio(x: f64) -> Option<Ratio> {
    if !x.is_finite() {
        return None;
    }
    // f64's Display is the shortest round-trip form, never in exponent notation.
    let text = x.to_string();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let mut num: i128 = 0;
    for b in int.bytes().chain(frac.bytes()) {
        num = num.checked_mul(10)?.checked_add(i128::from(b.checked_sub(b'0')?))?;
    }
    let den = 10i128.checked_pow(u32::try_from(frac.len()).ok()?)?;
    new_ratio_checked(if negative { -num } else { num }, den).ok()
}

/// A tier threshold, kept both as configured and as an exact ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold {
    raw: f64,
    exact: Option<Ratio>,
}

impl Threshold {
    pub fn new(raw: f64) -> Self {
        Threshold { raw, exact: decimal_ratio(raw) }
    }

    pub fn value(&self) -> f64 {
        self.raw
    }
}

impl Ratio {
    /// `self >= threshold`. Exact unless the cross products overflow, in which
    /// case the float values are compared. A NaN threshold is never met.
    pub fn meets(&self, threshold: &Threshold) -> bool {
        match threshold.exact.and_then(|t| self.checked_cmp(&t)) {
            Some(ord) => ord != Ordering::Less,
            None => self.as_f64() >= threshold.raw,
        }
    }

    /// Exact comparison, `None` on overflow.
    pub fn checked_cmp(&self, other: &Ratio) -> Option<Ordering> {
        let lhs = self.num.checked_mul(other.den)?;
        let rhs = other.num.checked_mul(self.den)?;
        Some(lhs.cmp(&rhs))
    }

    /// Lossy view for display.
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_ratio(self, other)
    }
}
