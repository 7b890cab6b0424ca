//! Tests for the monthly wealth curve
//!
//! These tests verify:
//! - Degenerate inputs fail fast
//! - Growth compounds monthly and is rounded every step
//! - Events enter the balance in the months they fire
//! - Flow timing and the zero clamp behave as documented

use jiff::civil::date;

use crate::date_math::month_index_of;
use crate::error::SimulationError;
use crate::model::{CashFlowEvent, EventKind, Frequency, SeriesPoint};
use crate::simulation::{FlowTiming, MonthlySimulation, WealthCurveConfig, simulate_wealth_curve};

fn monthly(kind: EventKind, amount: f64, start: (i16, i8, i8)) -> CashFlowEvent {
    CashFlowEvent::new(
        kind,
        Frequency::Monthly,
        amount,
        date(start.0, start.1, start.2),
    )
}

fn values(series: &[SeriesPoint]) -> Vec<f64> {
    series.iter().map(|p| p.value).collect()
}

#[test]
fn test_rejects_horizon_before_start() {
    let config = WealthCurveConfig::new(1_000.0, 0.05, 2030, 2029);
    assert_eq!(
        simulate_wealth_curve(&config, &[]),
        Err(SimulationError::InvalidHorizon {
            start_year: 2030,
            horizon_year: 2029
        })
    );
}

#[test]
fn test_rejects_years_outside_calendar() {
    let config = WealthCurveConfig::new(1_000.0, 0.05, i16::MIN, i16::MAX);
    assert_eq!(
        simulate_wealth_curve(&config, &[]),
        Err(SimulationError::YearOutOfRange(i16::MIN))
    );

    let config = WealthCurveConfig::new(1_000.0, 0.05, 2025, 10_000);
    assert_eq!(
        simulate_wealth_curve(&config, &[]),
        Err(SimulationError::YearOutOfRange(10_000))
    );
}

#[test]
fn test_rejects_start_month_out_of_range() {
    for month in [0, 13, -1] {
        let config = WealthCurveConfig::new(1_000.0, 0.05, 2025, 2026).starting_in(month);
        assert_eq!(
            simulate_wealth_curve(&config, &[]),
            Err(SimulationError::InvalidStartMonth(month))
        );
    }
}

#[test]
fn test_rejects_rate_at_or_below_minus_one() {
    let config = WealthCurveConfig::new(1_000.0, -1.0, 2025, 2026);
    assert!(matches!(
        simulate_wealth_curve(&config, &[]),
        Err(SimulationError::InvalidRate(_))
    ));
    let config = WealthCurveConfig::new(1_000.0, f64::NAN, 2025, 2026);
    assert!(simulate_wealth_curve(&config, &[]).is_err());
}

#[test]
fn test_one_point_per_december() {
    let config = WealthCurveConfig::new(50_000.0, 0.03, 2025, 2034);
    let series = simulate_wealth_curve(&config, &[]).unwrap();
    let years: Vec<i16> = series.iter().map(|p| p.year).collect();
    assert_eq!(years, (2025..=2034).collect::<Vec<_>>());
    assert!(series.iter().all(|p| p.flow.is_none()));
}

#[test]
fn test_zero_rate_without_events_is_flat() {
    let config = WealthCurveConfig::new(12_345.678, 0.0, 2025, 2030);
    let series = simulate_wealth_curve(&config, &[]).unwrap();
    assert!(values(&series).iter().all(|v| *v == 12_345.68));
}

#[test]
fn test_one_year_of_growth() {
    let config = WealthCurveConfig::new(100_000.0, 0.05, 2025, 2025);
    let series = simulate_wealth_curve(&config, &[]).unwrap();
    assert_eq!(series.len(), 1);
    // Monthly rounding leaves the result within a few cents of 105,000
    assert!((series[0].value - 105_000.0).abs() < 0.05, "{:?}", series);
}

#[test]
fn test_growth_compounds_across_years() {
    let config = WealthCurveConfig::new(100_000.0, 0.05, 2025, 2027);
    let series = simulate_wealth_curve(&config, &[]).unwrap();
    let expected = [105_000.0, 110_250.0, 115_762.5];
    for (point, want) in series.iter().zip(expected) {
        assert!((point.value - want).abs() < 0.1, "{point:?} vs {want}");
    }
}

#[test]
fn test_partial_first_year_from_start_month() {
    let config = WealthCurveConfig::new(100_000.0, 0.05, 2025, 2025).starting_in(7);
    let series = simulate_wealth_curve(&config, &[]).unwrap();
    assert_eq!(series.len(), 1);
    let six_months = 100_000.0 * 1.05_f64.sqrt();
    assert!((series[0].value - six_months).abs() < 0.05);
}

#[test]
fn test_monthly_contribution_adds_at_least_its_sum() {
    let base = WealthCurveConfig::new(100_000.0, 0.05, 2025, 2025);
    let events = vec![
        monthly(EventKind::Contribution, 100.0, (2025, 1, 1)).until(date(2025, 12, 31)),
    ];

    let without = simulate_wealth_curve(&base, &[]).unwrap()[0].value;
    let with = simulate_wealth_curve(&base, &events).unwrap()[0].value;
    let gain = with - without;

    // 12 x 100 deposited, plus growth earned on the deposits themselves
    assert!(gain >= 1_200.0, "gain {gain}");
    assert!(gain < 1_260.0, "gain {gain}");
}

#[test]
fn test_zero_rate_flows_are_exact() {
    let config = WealthCurveConfig::new(10_000.0, 0.0, 2025, 2026);
    let events = vec![
        monthly(EventKind::Deposit, 250.0, (2025, 1, 1)),
        CashFlowEvent::new(
            EventKind::Withdrawal,
            Frequency::OneTime,
            4_000.0,
            date(2026, 2, 1),
        ),
        CashFlowEvent::new(
            EventKind::Expense,
            Frequency::Yearly,
            600.0,
            date(2025, 11, 1),
        ),
    ];

    let series = simulate_wealth_curve(&config, &events).unwrap();
    assert_eq!(values(&series), vec![12_400.0, 10_800.0]);
}

#[test]
fn test_clamp_floors_balance_at_zero() {
    let events = vec![monthly(EventKind::Withdrawal, 600.0, (2025, 1, 1))];

    let unclamped = WealthCurveConfig::new(1_000.0, 0.0, 2025, 2026);
    let series = simulate_wealth_curve(&unclamped, &events).unwrap();
    assert_eq!(values(&series), vec![-6_200.0, -13_400.0]);

    let clamped = unclamped.clone().clamped();
    let series = simulate_wealth_curve(&clamped, &events).unwrap();
    assert_eq!(values(&series), vec![0.0, 0.0]);
}

#[test]
fn test_clamped_balance_recovers_with_later_deposits() {
    let events = vec![
        CashFlowEvent::new(
            EventKind::Withdrawal,
            Frequency::OneTime,
            5_000.0,
            date(2025, 2, 1),
        ),
        CashFlowEvent::new(
            EventKind::Deposit,
            Frequency::OneTime,
            300.0,
            date(2025, 6, 1),
        ),
    ];
    let config = WealthCurveConfig::new(1_000.0, 0.0, 2025, 2025).clamped();
    let series = simulate_wealth_curve(&config, &events).unwrap();
    // The debt is forgotten rather than carried forward
    assert_eq!(series[0].value, 300.0);
}

#[test]
fn test_start_timing_grows_the_flow_in_its_month() {
    let events = vec![monthly(EventKind::Contribution, 100.0, (2025, 1, 1))];
    let end = WealthCurveConfig::new(10_000.0, 0.12, 2025, 2025);
    let start = end.clone().timing(FlowTiming::Start);

    let end_value = simulate_wealth_curve(&end, &events).unwrap()[0].value;
    let start_value = simulate_wealth_curve(&start, &events).unwrap()[0].value;

    assert!(start_value > end_value);
    // One extra month of growth on twelve deposits of 100 at ~0.95%/month
    assert!(start_value - end_value < 15.0);
}

#[test]
fn test_start_and_end_timing_agree_without_events() {
    let end = WealthCurveConfig::new(42_000.0, 0.07, 2025, 2040);
    let start = end.clone().timing(FlowTiming::Start);
    assert_eq!(
        simulate_wealth_curve(&end, &[]).unwrap(),
        simulate_wealth_curve(&start, &[]).unwrap()
    );
}

#[test]
fn test_resumed_simulation_matches_fresh_run() {
    let events = vec![monthly(EventKind::Contribution, 321.0, (2025, 3, 1))];
    let start = month_index_of(2025, 1);

    let mut resumed =
        MonthlySimulation::new(80_000.0, 0.04, start, &events, FlowTiming::End, false);
    let first = resumed.run_through(month_index_of(2026, 6));
    let second = resumed.run_through(month_index_of(2030, 12));

    let mut fresh = MonthlySimulation::new(80_000.0, 0.04, start, &events, FlowTiming::End, false);
    assert_eq!(fresh.run_through(month_index_of(2026, 6)), first);

    let config = WealthCurveConfig::new(80_000.0, 0.04, 2025, 2030);
    let series = simulate_wealth_curve(&config, &events).unwrap();
    assert_eq!(series.last().map(|p| p.value), Some(second));

    // Running to a month already passed is a no-op
    assert_eq!(resumed.run_through(month_index_of(2027, 1)), second);
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: WealthCurveConfig = serde_json::from_str(
        r#"{"initial_value": 1000.0, "annual_rate": 0.05, "start_year": 2025, "horizon_year": 2030}"#,
    )
    .unwrap();
    assert_eq!(config.start_month, 1);
    assert_eq!(config.flow_timing, FlowTiming::End);
    assert!(!config.clamp_zero);

    let timing: FlowTiming = serde_json::from_str(r#""start""#).unwrap();
    assert_eq!(timing, FlowTiming::Start);
}
