use wealthplan_core::model::{Allocation, AssetClass, CashFlowEvent};

use crate::error::{ApiError, ApiResult};

pub const MIN_RATE: f64 = -0.99;
pub const MAX_RATE: f64 = 1.0;
pub const MIN_YEAR: i16 = 1900;
pub const MAX_YEAR: i16 = 3000;
pub const MAX_ROUND_STEP: i64 = 1000;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Validate a client's display name
pub fn validate_client_name(name: &str) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name", "Client name cannot be empty"));
    }

    if name.len() > 200 {
        return Err(ApiError::validation(
            "name",
            "Client name cannot exceed 200 characters",
        ));
    }

    Ok(())
}

/// Validate a snapshot's allocation list
///
/// Each percent must lie in [0, 100], each asset class may appear once and
/// the percentages must add up to 100 within `tolerance`.
pub fn validate_allocations(allocations: &[Allocation], tolerance: f64) -> ApiResult<()> {
    let mut seen = [false; AssetClass::COUNT];

    for (i, a) in allocations.iter().enumerate() {
        let field = format!("allocations[{i}].percent");
        if !a.percent.is_finite() || !(0.0..=100.0).contains(&a.percent) {
            return Err(ApiError::validation(field, "Percent must be between 0 and 100"));
        }
        if std::mem::replace(&mut seen[a.asset_class.index()], true) {
            return Err(ApiError::validation(
                format!("allocations[{i}].asset_class"),
                format!("Asset class {} appears more than once", a.asset_class.as_str()),
            ));
        }
    }

    let sum: f64 = allocations.iter().map(|a| a.percent).sum();
    if (sum - 100.0).abs() > tolerance {
        return Err(ApiError::validation(
            "allocations",
            format!("Allocation percentages must sum to 100 (got {sum:.2})"),
        ));
    }

    Ok(())
}

pub fn validate_total_value(total_value: f64) -> ApiResult<()> {
    if !total_value.is_finite() || total_value < 0.0 {
        return Err(ApiError::validation(
            "total_value",
            "Total value must be a non-negative number",
        ));
    }
    Ok(())
}

/// Validate a cash-flow event before it is stored
pub fn validate_event(event: &CashFlowEvent) -> ApiResult<()> {
    if !event.amount.is_finite() || event.amount <= 0.0 {
        return Err(ApiError::validation("amount", "Amount must be greater than 0"));
    }

    if let Some(end) = event.end {
        if end < event.start {
            return Err(ApiError::validation(
                "end",
                "End date must be on or after start date",
            ));
        }
    }

    if let Some(day) = event.execution_day {
        if !(1..=28).contains(&day) {
            return Err(ApiError::validation(
                "execution_day",
                "Execution day must be between 1 and 28",
            ));
        }
    }

    if let Some(month) = event.execution_month {
        if !(1..=12).contains(&month) {
            return Err(ApiError::validation(
                "execution_month",
                "Execution month must be between 1 and 12",
            ));
        }
    }

    Ok(())
}

pub fn validate_goal(name: &str, target_value: f64) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name", "Goal name cannot be empty"));
    }

    if !target_value.is_finite() || target_value < 0.0 {
        return Err(ApiError::validation(
            "target_value",
            "Target value must be a non-negative number",
        ));
    }

    Ok(())
}

/// Validate an annual growth rate given as a fraction (0.04 = 4%)
pub fn validate_rate(rate: f64) -> ApiResult<()> {
    if !rate.is_finite() || !(MIN_RATE..=MAX_RATE).contains(&rate) {
        return Err(ApiError::validation(
            "rate",
            format!("Rate must be between {MIN_RATE} and {MAX_RATE}"),
        ));
    }
    Ok(())
}

pub fn validate_year(field: &str, year: i16) -> ApiResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ApiError::validation(
            field,
            format!("Year must be between {MIN_YEAR} and {MAX_YEAR}"),
        ));
    }
    Ok(())
}

/// Validate both ends of a projection horizon and their order
pub fn validate_year_range(start_year: i16, until_year: i16) -> ApiResult<()> {
    validate_year("startYear", start_year)?;
    validate_year("untilYear", until_year)?;

    if start_year > until_year {
        return Err(ApiError::validation(
            "startYear",
            "startYear must be less than or equal to untilYear",
        ));
    }
    Ok(())
}

/// Validate a contribution rounding step and narrow it
pub fn validate_round_step(step: i64) -> ApiResult<u32> {
    if !(1..=MAX_ROUND_STEP).contains(&step) {
        return Err(ApiError::validation(
            "roundStep",
            format!("roundStep must be between 1 and {MAX_ROUND_STEP}"),
        ));
    }
    u32::try_from(step).map_err(|_| ApiError::validation("roundStep", "roundStep is out of range"))
}

/// Resolve pagination parameters, returning `(page, per_page)`
pub fn validate_pagination(page: Option<u32>, per_page: Option<u32>) -> ApiResult<(u32, u32)> {
    let page = page.unwrap_or(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);

    if page == 0 {
        return Err(ApiError::validation("page", "page must be at least 1"));
    }

    if per_page == 0 || per_page > MAX_PER_PAGE {
        return Err(ApiError::validation(
            "perPage",
            format!("perPage must be between 1 and {MAX_PER_PAGE}"),
        ));
    }

    Ok((page, per_page))
}
