//! Engines running on several threads over the same workout.

use std::sync::Arc;
use std::thread;

use wattline::{FatigueModelEngine, PowerCurveEngine, WPrimeAlgorithm};

use super::fixture::structured_workout;

#[test]
fn test_parallel_engines_match_sequential() {
    let wdf = structured_workout();
    let power_engine = PowerCurveEngine::new();
    let fatigue_engine = FatigueModelEngine::new();

    let mmp = power_engine.mean_max_power(&wdf).unwrap();
    let np = power_engine.weighted_average_power(&wdf).unwrap();
    let balances: Vec<_> = WPrimeAlgorithm::ALL
        .iter()
        .map(|a| fatigue_engine.w_prime_balance_with(&wdf, *a).unwrap())
        .collect();

    thread::scope(|s| {
        let mmp_handle = s.spawn(|| power_engine.mean_max_power(&wdf).unwrap());
        let np_handle = s.spawn(|| power_engine.weighted_average_power(&wdf).unwrap());
        let balance_handles: Vec<_> = WPrimeAlgorithm::ALL
            .into_iter()
            .map(|a| {
                let (engine, wdf) = (&fatigue_engine, &wdf);
                s.spawn(move || engine.w_prime_balance_with(wdf, a).unwrap())
            })
            .collect();

        assert_eq!(mmp_handle.join().unwrap(), mmp);
        assert_eq!(np_handle.join().unwrap(), np);
        for (handle, expected) in balance_handles.into_iter().zip(&balances) {
            assert_eq!(&handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_athlete_update_visible_across_threads() {
    let wdf = Arc::new(structured_workout());
    let slice = wdf.slice(0..600).unwrap();

    let writer = {
        let wdf = Arc::clone(&wdf);
        thread::spawn(move || wdf.athlete().update(|a| a.weight = Some(72.5)))
    };
    writer.join().unwrap();

    // The slice shares the athlete with its source.
    assert_eq!(slice.athlete_snapshot().weight, Some(72.5));
    let ppkg = PowerCurveEngine::new().power_per_kg(&slice).unwrap();
    assert_eq!(ppkg.len(), 600);
}
