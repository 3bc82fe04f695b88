//! Unit tests for series validation driven by configuration.

use wattline::models::series::{HEARTRATE, POWER, TIME};
use wattline::{AnalyticsConfig, AnalyticsError, Column, SeriesValidator, WorkoutSeries};

fn ride(time: Vec<i64>, heartrate: Vec<i64>, power: Vec<i64>) -> WorkoutSeries {
    WorkoutSeries::from_columns(vec![
        Column::new(TIME, time),
        Column::new(HEARTRATE, heartrate),
        Column::new(POWER, power),
    ])
    .unwrap()
    .set_index(TIME)
    .unwrap()
}

#[test]
fn test_clean_ride_passes() {
    let wdf = ride(vec![0, 1, 2, 3], vec![120, 125, 130, 131], vec![200, 210, 0, 250]);
    assert!(SeriesValidator::new().validate(&wdf).is_ok());
}

#[test]
fn test_all_failures_reported_together() {
    let wdf = ride(vec![0, 1, 3, 4], vec![-1, 125, 130, 131], vec![200, 3500, -5, 250]);
    let err = SeriesValidator::new().validate(&wdf).unwrap_err();

    assert_eq!(
        err.messages(),
        &[
            "Sample rate is not (consistent) 1Hz".to_string(),
            "Column 'heartrate' has values < 0".to_string(),
            "Column 'power' has values < 0".to_string(),
            "Column 'power' has values > 3000".to_string(),
        ]
    );
}

#[test]
fn test_float_power_column() {
    let wdf = WorkoutSeries::from_columns(vec![
        Column::new(TIME, vec![0i64, 1, 2]),
        Column::new(POWER, vec![200.0, 210.5, 220.0]),
    ])
    .unwrap()
    .set_index(TIME)
    .unwrap();

    let err = SeriesValidator::new().validate(&wdf).unwrap_err();
    assert_eq!(err.messages().len(), 1);
    assert!(err.contains("Column 'power' is not of dtype int64 (found float64)"));
}

#[test]
fn test_unnamed_index() {
    let wdf = WorkoutSeries::from_columns(vec![Column::new(POWER, vec![100i64, 110])]).unwrap();
    let err = SeriesValidator::new().validate(&wdf).unwrap_err();
    assert!(err.contains("Index is named 'index', expected 'time'"));

    // Renaming fixes it; the default index counts 0, 1, 2...
    let renamed = wdf.rename_index(TIME);
    assert!(SeriesValidator::new().validate(&renamed).is_ok());
}

#[test]
fn test_ensure_valid_wraps_error() {
    let wdf = ride(vec![0, 1], vec![100, 100], vec![100, 4000]);
    let err = SeriesValidator::new().ensure_valid(&wdf).unwrap_err();

    assert!(matches!(err, AnalyticsError::Validation(_)));
    assert!(err.to_string().starts_with("Workout series is invalid:\n"));
    assert!(err.to_string().contains("Column 'power' has values > 3000"));
}

#[test]
fn test_rules_from_toml() {
    let config = AnalyticsConfig::from_toml_str(
        r#"
        [validation]
        index_name = "seconds"
        sample_step = 2

        [validation.bounds.power]
        min = 0.0
        max = 1500.0
        "#,
    )
    .unwrap();
    let validator = SeriesValidator::with_config(&config);

    let wdf =
        ride(vec![0, 2, 4], vec![-10, 100, 100], vec![100, 1600, 100]).rename_index("seconds");
    let err = validator.validate(&wdf).unwrap_err();

    // Power bounds are overridden; the default heart-rate floor still applies.
    assert_eq!(
        err.messages(),
        &[
            "Column 'heartrate' has values < 0".to_string(),
            "Column 'power' has values > 1500".to_string(),
        ]
    );

    let wdf =
        ride(vec![0, 1, 2], vec![100, 100, 100], vec![100, 100, 100]).rename_index("seconds");
    let err = validator.validate(&wdf).unwrap_err();
    assert!(err.contains("Sample rate is not (consistent) one sample every 2s"));
}

#[test]
fn test_empty_bounds_table_disables_check() {
    let config = AnalyticsConfig::from_toml_str(
        r#"
        [validation.bounds.heartrate]
        "#,
    )
    .unwrap();
    let wdf = ride(vec![0, 1, 2], vec![-1, 100, 100], vec![100, 100, 100]);
    assert!(SeriesValidator::with_config(&config).validate(&wdf).is_ok());
}
