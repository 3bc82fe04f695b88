//! Integration tests for the complete analytics pipeline.
//!
//! Tests the end-to-end flow:
//! 1. Build and validate a workout series
//! 2. Extract the mean-max power curve and best efforts
//! 3. Compute normalized power and power-to-weight
//! 4. Fit CP / W' and simulate W' balance

use wattline::metrics::pdc::PdcPoint;
use wattline::models::series::{HEARTRATE, POWER};
use wattline::{
    AnalyticsError, CpFitter, FatigueModelEngine, PowerCurveEngine, SeriesValidator,
    WPrimeAlgorithm, WPrimeSummary,
};

use super::fixture::{simulate_structured_workout, structured_workout, workout_series};

const INTERVALS: [std::ops::Range<usize>; 3] = [600..900, 1080..1380, 1560..1860];

#[test]
fn test_fixture_is_valid() {
    let wdf = structured_workout();
    SeriesValidator::new()
        .validate(&wdf)
        .expect("fixture should validate");
    assert_eq!(wdf.len(), 4200);
}

#[test]
fn test_mean_max_power_curve() {
    let power = simulate_structured_workout();
    let max = *power.iter().max().unwrap() as f64;
    let wdf = workout_series(power);

    let mmp = PowerCurveEngine::new().mean_max_power(&wdf).unwrap();

    assert_eq!(mmp.get(1), Some(max));
    assert_eq!(mmp.len(), wdf.len());
    assert_eq!(mmp.max_duration(), Some(4200));
    assert_eq!(mmp.get(4201), None);

    // A longer window can never beat the best shorter one.
    for pair in mmp.points().windows(2) {
        assert!(
            pair[1].power_watts <= pair[0].power_watts + 1e-9,
            "MMP rose from {}s to {}s",
            pair[0].duration_secs,
            pair[1].duration_secs
        );
    }

    // 5-minute best sits inside an interval.
    let five_min = mmp.get(300).unwrap();
    assert!(five_min > 225.0 && five_min < 255.0, "got {}", five_min);
}

#[test]
fn test_best_efforts_find_the_intervals() {
    let wdf = structured_workout();
    let bests = PowerCurveEngine::new()
        .compute_mean_max_bests(&wdf, 300, 3)
        .unwrap();

    assert_eq!(bests.len(), 3);
    for pair in bests.windows(2) {
        assert!(pair[0].value >= pair[1].value);
    }
    for best in &bests {
        assert!(!best.is_missing());
        assert!(best.value > 200.0);
        let start = best.index as usize;
        assert!(
            INTERVALS.iter().any(|r| start.abs_diff(r.start) < 60),
            "best effort at {} is not near an interval",
            start
        );
    }
}

#[test]
fn test_best_efforts_exhaust_then_pad_with_nan() {
    let wdf = structured_workout();
    let bests = PowerCurveEngine::new()
        .compute_mean_max_bests(&wdf, 300, 20)
        .unwrap();

    assert_eq!(bests.len(), 20);
    let found = bests.iter().take_while(|b| !b.is_missing()).count();
    assert!(found >= 7 && found <= 14, "found {}", found);
    assert!(bests[found..].iter().all(|b| b.is_missing()));

    let mut starts: Vec<usize> = bests[..found].iter().map(|b| b.index as usize).collect();
    starts.sort_unstable();
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= 300, "windows overlap: {:?}", pair);
    }
}

#[test]
fn test_best_efforts_longer_than_workout() {
    let wdf = structured_workout();
    let bests = PowerCurveEngine::new()
        .compute_mean_max_bests(&wdf, 10_000, 1)
        .unwrap();
    assert_eq!(bests.len(), 1);
    assert_eq!(bests[0], (f64::NAN, f64::NAN));

    let bests = PowerCurveEngine::new()
        .compute_mean_max_bests(&wdf, 3000, 2)
        .unwrap();
    assert!(!bests[0].is_missing());
    assert!(bests[1].is_missing());
}

#[test]
fn test_normalized_power_and_weight() {
    let wdf = structured_workout();
    let engine = PowerCurveEngine::new();

    let power = wdf.column(POWER).unwrap().values.to_f64();
    let average = power.iter().sum::<f64>() / power.len() as f64;

    let np = engine.weighted_average_power(&wdf).unwrap();
    assert!(np > average, "NP {} should exceed average {}", np, average);

    let ppkg = engine.power_per_kg(&wdf).unwrap();
    assert_eq!(ppkg.get(100), Some(power[100] / 80.0));

    // Halving the weight doubles W/kg but leaves NP alone.
    wdf.athlete().update(|a| a.weight = Some(40.0));
    assert_eq!(engine.weighted_average_power(&wdf).unwrap(), np);
    let ppkg_light = engine.power_per_kg(&wdf).unwrap();
    assert_eq!(ppkg_light.get(100), Some(power[100] / 40.0));

    wdf.athlete().update(|a| a.weight = None);
    assert_eq!(engine.weighted_average_power(&wdf).unwrap(), np);
    assert!(matches!(
        engine.power_per_kg(&wdf),
        Err(AnalyticsError::MissingData(_))
    ));
}

#[test]
fn test_w_prime_balance_over_workout() {
    let wdf = structured_workout();
    let engine = FatigueModelEngine::new();

    for algorithm in WPrimeAlgorithm::ALL {
        let balance = engine.w_prime_balance_with(&wdf, algorithm).unwrap();
        let v = balance.values();

        assert_eq!(balance.len(), wdf.len());
        assert_eq!(v[0], 30000.0);
        assert!(v.iter().all(|b| (0.0..=30000.0).contains(b)));

        for interval in INTERVALS {
            assert!(v[interval.end - 1] < v[interval.start - 1]);
            // Only Froncioni is strictly non-increasing above CP; the
            // exponential models may tick up when power dips near CP late
            // in an interval.
            if algorithm == WPrimeAlgorithm::Froncioni {
                for t in interval.start + 1..interval.end {
                    assert!(v[t] <= v[t - 1], "rose during an interval at {}", t);
                }
            }
        }
        // Everything after the last interval stays below CP.
        for t in 1861..4200 {
            assert!(v[t] >= v[t - 1], "{} fell during recovery at {}", algorithm, t);
        }
    }
}

#[test]
fn test_w_prime_balance_algorithms_differ() {
    let wdf = structured_workout();
    let engine = FatigueModelEngine::new();

    let waterworth = engine.w_prime_balance(&wdf).unwrap();
    let froncioni = engine
        .w_prime_balance_named(&wdf, "froncioni")
        .unwrap();
    let skiba = engine.w_prime_balance_named(&wdf, "skiba").unwrap();

    assert_ne!(waterworth.get(2500), froncioni.get(2500));
    assert_ne!(waterworth.get(2500), skiba.get(2500));
}

#[test]
fn test_w_prime_balance_requires_power() {
    let wdf = structured_workout().select(&[HEARTRATE]).unwrap();
    assert!(matches!(
        FatigueModelEngine::new().w_prime_balance(&wdf),
        Err(AnalyticsError::MissingData(_))
    ));
}

/// Rest at 100 W, then maximal efforts lying on CP 250 W / W' 20 kJ.
fn simulate_cp_test() -> Vec<i64> {
    let mut samples = vec![100i64; 600];
    for (secs, watts) in [(1000usize, 270i64), (400, 300), (200, 350)] {
        samples.extend(vec![watts; secs]);
        samples.extend(vec![100i64; 1200]);
    }
    samples
}

#[test]
fn test_fit_cp_then_simulate_w_prime() {
    let wdf = workout_series(simulate_cp_test());
    wdf.athlete().update(|a| {
        a.cp = None;
        a.w_prime = None;
    });

    // Without CP/W' the fatigue engine refuses to run.
    assert!(matches!(
        FatigueModelEngine::new().w_prime_balance(&wdf),
        Err(AnalyticsError::MissingData(_))
    ));

    let curve = PowerCurveEngine::new()
        .mean_max_power_for(&wdf, &[200, 400, 1000])
        .unwrap();
    assert_eq!(
        curve.points(),
        &[
            PdcPoint {
                duration_secs: 200,
                power_watts: 350.0
            },
            PdcPoint {
                duration_secs: 400,
                power_watts: 300.0
            },
            PdcPoint {
                duration_secs: 1000,
                power_watts: 270.0
            },
        ]
    );

    let model = CpFitter::new().fit(&curve).unwrap();
    assert!((model.cp - 250.0).abs() < 1e-6);
    assert!((model.w_prime - 20000.0).abs() < 1e-3);
    model.apply_to(wdf.athlete());

    let balance = FatigueModelEngine::new().w_prime_balance(&wdf).unwrap();
    let summary = WPrimeSummary::from_balance(&balance, model.w_prime).unwrap();
    // Recovery during the efforts keeps the reserve from emptying; the
    // short 350 W effort digs deepest and bottoms out on its last second.
    assert!(summary.max_depletion > 0.8, "{:?}", summary);
    assert!(summary.max_depletion < 1.0, "{:?}", summary);
    assert_eq!(summary.min_at, 4599.0);
}
