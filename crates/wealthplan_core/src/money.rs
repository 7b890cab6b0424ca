//! Monetary rounding and rate conversion.
//!
//! Simulated balances are rounded to cents after every arithmetic step, not
//! only at the end, so results match a ledger that truncates as it goes.

/// Round to two decimal places, halves rounding toward positive infinity.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}

/// Monthly rate that compounds to `annual_rate` over twelve months.
#[inline]
pub fn monthly_rate_from_annual(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Future value of one unit contributed at the end of each of `periods`
/// periods at `rate` per period.
///
/// Zero for non-positive horizons; `periods` itself when the rate is
/// negligibly small.
pub fn annuity_factor(rate: f64, periods: i32) -> f64 {
    if periods <= 0 {
        return 0.0;
    }
    if rate.abs() < 1e-12 {
        return f64::from(periods);
    }
    ((1.0 + rate).powi(periods) - 1.0) / rate
}

/// Smallest multiple of `step` that is greater than or equal to `amount`.
#[inline]
pub fn ceil_to_step(amount: f64, step: u32) -> f64 {
    let step = f64::from(step.max(1));
    let rounded = (amount / step).ceil() * step;
    // Guard against `amount / step` landing a hair under an integer.
    if rounded < amount { rounded + step } else { rounded }
}
