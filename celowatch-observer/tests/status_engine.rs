use celowatch_observer::{evaluate, Alert, Probe, Signal, Staleness, Status, StatusEngine, Thresholds};
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

// Test helper functions
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 12, 8, 11, 9, 47).unwrap()
}

fn ago(minutes: i64) -> Probe {
    Probe::Observed(Signal::new(Some(now() - chrono::Duration::minutes(minutes)), now()))
}

fn absent() -> Probe {
    Probe::Observed(Signal::absent(now()))
}

fn failed() -> Probe {
    Probe::Failed("error sending request".to_string())
}

fn default_thresholds() -> Thresholds {
    Thresholds::new(Duration::from_secs(30 * 60), Duration::from_secs(5 * 60))
}

fn engine(initial: Status) -> StatusEngine {
    StatusEngine::new(initial, default_thresholds())
}

const ALL: [Status; 3] = [Status::Ok, Status::ValidatorDown, Status::ChainDown];

#[test]
fn test_ok_stays_ok_when_both_fresh() {
    let mut e = engine(Status::Ok);
    let step = e.step(&ago(2), &ago(2), now());
    assert_eq!(step.status, Status::Ok);
    assert_eq!(step.alert, None);
}

#[test]
fn test_ok_to_chain_down() {
    let mut e = engine(Status::Ok);
    let step = e.step(&ago(2), &ago(6), now());
    assert_eq!(step.status, Status::ChainDown);
    assert_eq!(
        step.alert,
        Some(Alert::NetworkStopped {
            since: Staleness::Since(chrono::Duration::minutes(6)),
            threshold: Duration::from_secs(300),
        })
    );
}

#[test]
fn test_ok_to_validator_down() {
    let mut e = engine(Status::Ok);
    let step = e.step(&ago(31), &ago(1), now());
    assert_eq!(step.status, Status::ValidatorDown);
    assert!(matches!(step.alert, Some(Alert::ValidatorStalled { .. })));
}

#[test]
fn test_chain_check_wins_from_ok() {
    let mut e = engine(Status::Ok);
    let step = e.step(&ago(45), &ago(10), now());
    assert_eq!(step.status, Status::ChainDown);
    assert!(matches!(step.alert, Some(Alert::NetworkStopped { .. })));
}

#[test]
fn test_chain_down_to_ok_uses_min_threshold() {
    let mut e = engine(Status::ChainDown);
    let step = e.step(&ago(1), &ago(10), now());
    assert_eq!(step.status, Status::Ok);
    assert_eq!(step.alert, Some(Alert::NetworkRecovered));
}

#[test]
fn test_chain_down_to_validator_down() {
    // Validator last produced 6 minutes ago: beyond min(5m, 30m), chain is fresh again
    let mut e = engine(Status::ChainDown);
    let step = e.step(&ago(6), &ago(1), now());
    assert_eq!(step.status, Status::ValidatorDown);
    assert_eq!(step.alert, Some(Alert::NetworkRecoveredValidatorSilent));
}

#[test]
fn test_chain_down_stays_while_chain_stale() {
    let mut e = engine(Status::ChainDown);
    let step = e.step(&ago(20), &ago(20), now());
    assert_eq!(step.status, Status::ChainDown);
    assert_eq!(step.alert, None);
}

#[test]
fn test_validator_down_to_chain_down_regardless_of_validator() {
    for validator in [ago(0), ago(6), ago(60), absent()] {
        let mut e = engine(Status::ValidatorDown);
        let step = e.step(&validator, &ago(6), now());
        assert_eq!(step.status, Status::ChainDown);
        assert_eq!(step.alert, Some(Alert::NetworkStoppedToo));
    }
}

#[test]
fn test_validator_down_to_ok() {
    let mut e = engine(Status::ValidatorDown);
    let step = e.step(&ago(29), &ago(1), now());
    assert_eq!(step.status, Status::Ok);
    assert_eq!(step.alert, Some(Alert::ValidatorRestored));
}

#[test]
fn test_validator_down_stays_while_validator_silent() {
    let mut e = engine(Status::ValidatorDown);
    let step = e.step(&ago(31), &ago(1), now());
    assert_eq!(step.status, Status::ValidatorDown);
    assert_eq!(step.alert, None);
}

#[test]
fn test_failed_validator_fetch_leaves_status_untouched() {
    let mut e = engine(Status::Ok);
    let step = e.step(&failed(), &ago(1), now());
    assert_eq!(step.status, Status::Ok);
    assert_eq!(step.alert, Some(Alert::ProbeFailed));

    // The next tick is unaffected by the earlier failure
    let step = e.step(&ago(2), &ago(6), now());
    assert_eq!(step.status, Status::ChainDown);
}

#[test]
fn test_failure_alert_repeats_without_transition() {
    for initial in ALL {
        let mut e = engine(initial);
        for _ in 0..3 {
            let step = e.step(&ago(1), &failed(), now());
            assert_eq!(step.status, initial);
            assert_eq!(step.alert, Some(Alert::ProbeFailed));
        }
        assert_eq!(e.current(), initial);
    }
}

#[test]
fn test_absent_behaves_like_ancient_timestamp() {
    let ancient = Probe::Observed(Signal::new(
        Some(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()),
        now(),
    ));
    for initial in ALL {
        for (v_absent, v_ancient) in [(absent(), ancient.clone()), (ago(1), ago(1))] {
            let a = evaluate(initial, &default_thresholds(), &v_absent, &absent(), now());
            let b = evaluate(initial, &default_thresholds(), &v_ancient, &ancient, now());
            assert_eq!(a.status, b.status, "from {}", initial);
        }
    }
}

#[test]
fn test_absent_everything_from_ok_is_chain_down() {
    let mut e = engine(Status::Ok);
    let step = e.step(&absent(), &absent(), now());
    assert_eq!(step.status, Status::ChainDown);
}

#[test]
fn test_step_is_deterministic() {
    let samples = [0, 1, 4, 5, 6, 29, 30, 31, 120];
    for initial in ALL {
        for v in samples {
            for c in samples {
                let first = evaluate(initial, &default_thresholds(), &ago(v), &ago(c), now());
                let second = evaluate(initial, &default_thresholds(), &ago(v), &ago(c), now());
                assert_eq!(first, second);
            }
        }
    }
}

#[test]
fn test_alert_iff_status_changes() {
    let samples = [0, 1, 4, 5, 6, 29, 30, 31, 120];
    for initial in ALL {
        for v in samples {
            for c in samples {
                let mut e = engine(initial);
                let step = e.step(&ago(v), &ago(c), now());
                assert_eq!(
                    step.alert.is_some(),
                    step.status != initial,
                    "from {} with validator {}m, chain {}m",
                    initial,
                    v,
                    c
                );
                assert_eq!(e.current(), step.status);
            }
        }
    }
}

#[test]
fn test_misordered_thresholds_keep_min_rule() {
    // validator threshold shorter than chain threshold
    let thresholds = Thresholds::new(Duration::from_secs(2 * 60), Duration::from_secs(5 * 60));
    let mut e = StatusEngine::new(Status::ChainDown, thresholds);
    // 3 minutes is within the chain threshold but not within min(5m, 2m)
    let step = e.step(&ago(3), &ago(3), now());
    assert_eq!(step.status, Status::ValidatorDown);
}

#[test]
fn test_recovery_path_through_validator_down() {
    let mut e = engine(Status::Ok);
    assert_eq!(e.step(&ago(8), &ago(8), now()).status, Status::ChainDown);
    assert_eq!(e.step(&ago(9), &ago(0), now()).status, Status::ValidatorDown);
    assert_eq!(e.step(&ago(0), &ago(0), now()).status, Status::Ok);
}
