//! Fixture-driven checks of the band pipeline and the screening predicate,
//! fed through a provider the way the runner uses it.

use chrono::NaiveDate;
use devband_core::bands::{
    check_condition, check_condition_values, extract_episodes, DeviationBands, LineKind,
    ReferenceLine,
};
use devband_core::data::{fetch_with_backfill, DataProvider, StaticProvider, SyntheticProvider};
use devband_core::domain::PriceSeries;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn worked_example_against_constant_line() {
    let closes = [10.0, 10.0, 9.0, 8.0, 9.0, 11.0, 11.0, 10.0, 9.0, 8.0, 7.0, 11.0];
    let provider = StaticProvider::new().with_closes("EX", d(2024, 1, 1), &closes);
    let series = provider.fetch("EX", d(2024, 1, 1), d(2024, 12, 31)).unwrap().series;
    let line = ReferenceLine::new(LineKind::Ema, vec![10.0; closes.len()]);

    let set = extract_episodes(&series, &line);
    let found: Vec<(usize, f64)> = set.iter().map(|e| (e.index, e.deviation)).collect();
    assert_eq!(found, vec![(3, -2.0), (10, -3.0)]);
    assert_eq!(set.mean(), Some(-2.5));
    assert_eq!(set.episodes[1].date, d(2024, 1, 11));
}

#[test]
fn screening_predicate_examples() {
    assert!(check_condition_values(95.0, 100.0, Some(90.0)));
    assert!(!check_condition_values(85.0, 100.0, Some(90.0)));
    assert!(!check_condition_values(101.0, 100.0, Some(90.0)));
    assert!(!check_condition_values(95.0, 100.0, None));
}

#[test]
fn empty_series_never_passes() {
    let series = PriceSeries::empty("NONE");
    let bands = DeviationBands::build(&series, 200);
    assert!(!check_condition(&series, &bands));
}

#[test]
fn synthetic_history_builds_full_band_structure() {
    let provider = SyntheticProvider::default();
    let fetched =
        fetch_with_backfill(&provider, "RELIANCE.NS", d(2018, 1, 1), d(2023, 12, 31), 5).unwrap();
    let series = fetched.series;
    assert!(series.len() > 1000);

    let bands = DeviationBands::build(&series, 200);
    assert_eq!(bands.ema.len(), series.len());
    assert_eq!(bands.deviation.len(), series.len());
    assert!(!bands.ema_episodes.is_empty());

    let avg = bands.avg_deviation_line.as_ref().unwrap();
    assert_eq!(avg.len(), series.len());
    let mean = bands.avg_deviation.unwrap();
    assert!(mean < 0.0);
    assert!((avg.values[0] - (bands.ema.values[0] + mean)).abs() < 1e-9);

    for e in bands.ema_episodes.iter() {
        assert!(e.index >= 1);
        assert!(e.deviation < 0.0);
    }
}
