//! Month-resolution calendar arithmetic.
//!
//! Every temporal comparison in the engine works on a single integer per
//! calendar month, `year * 12 + (month - 1)`. Range checks and month counts
//! become integer comparisons with no `jiff::Span` involved.

use jiff::civil::Date;

/// Monotone month counter: `year * 12 + (month - 1)`.
pub type MonthIndex = i32;

/// Fast leap year check.
#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Fast inline days-in-month calculation without creating a `jiff::civil::Date`.
#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

#[inline]
pub fn month_index_of(year: i16, month: i8) -> MonthIndex {
    i32::from(year) * 12 + (i32::from(month) - 1)
}

/// Month index of the calendar month containing `d`.
#[inline]
pub fn month_index(d: Date) -> MonthIndex {
    month_index_of(d.year(), d.month())
}

/// Inverse of [`month_index_of`]: `(year, month)` with month in `1..=12`.
#[inline]
pub fn index_to_year_month(index: MonthIndex) -> (i16, i8) {
    let year = index.div_euclid(12) as i16;
    let month = (index.rem_euclid(12) + 1) as i8;
    (year, month)
}

/// Number of calendar months touched by `[start, end]`, counting partial
/// months as whole ones.
///
/// Returns `1` when both dates fall in the same month and `0` or less when
/// `end` lies in an earlier month than `start`.
#[inline]
pub fn months_between_inclusive(start: Date, end: Date) -> i32 {
    month_index(end) - month_index(start) + 1
}

/// Last calendar day of the given month.
#[inline]
pub fn end_of_month(year: i16, month: i8) -> Date {
    jiff::civil::date(year, month, days_in_month(year, month))
}
