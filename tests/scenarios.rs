//! End-to-end checks of the engine through the public API.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use summit::badge::{compute_badge, BadgeTier, ChildProgress, PhaseWeighting, TierThresholds};
use summit::config::Config;
use summit::diagnostic::{compute_diagnostic, DiagnosticTerms, TermStatus};
use summit::ladder::{generate_ladder, CurveShape, MilestoneLadderConfig, RungCount};
use summit::phase::{classify_phase, GoalPhase, PhaseEngine, WeeklySnapshot};
use summit::storage::{FilePhaseStore, MemoryPhaseStore, PhaseStore};
use summit::{builtin_catalog, compute_badge_from_graph, GoalInstance, SummitError};

fn history(ratios: &[f64]) -> Vec<WeeklySnapshot> {
    let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
    ratios
        .iter()
        .enumerate()
        .map(|(i, &r)| WeeklySnapshot::new(start + Duration::weeks(i as i64), 20.0, r * 20.0))
        .collect()
}

#[test]
fn four_on_pace_weeks_promote_to_consolidation() {
    let phase = classify_phase(
        "goal",
        GoalPhase::Acquisition,
        &history(&[1.1, 1.0, 1.05, 1.2]),
    )
    .unwrap();
    assert_eq!(phase, GoalPhase::Consolidation);
}

#[test]
fn two_weak_weeks_regress_one_level() {
    let phase = classify_phase("goal", GoalPhase::Consolidation, &history(&[0.4, 0.3])).unwrap();
    assert_eq!(phase, GoalPhase::Acquisition);
}

#[test]
fn linear_ladder_from_zero_to_twenty() {
    let config = MilestoneLadderConfig::new(0.0, 20.0, CurveShape::Linear, RungCount::Explicit(4));
    assert_eq!(generate_ladder(&config).unwrap(), vec![5.0, 10.0, 15.0, 20.0]);
}

#[test]
fn acquisition_diagnostic_follows_configured_thresholds() {
    let config = Config::default();
    let score = compute_diagnostic(
        &DiagnosticTerms::new(0.6, 0.4, 0.9),
        GoalPhase::Acquisition,
        &config.diagnostic.weights,
        &config.diagnostic.thresholds,
    )
    .unwrap();

    assert!((score.composite - 0.216).abs() < 1e-9);
    assert_eq!(score.skill_leverage.status, TermStatus::ExpectedLow);

    let thresholds = config.diagnostic.thresholds;
    let weight = config.diagnostic.weights.acquisition.input_rate;
    let expected = if 0.6 < thresholds.low && weight >= thresholds.high_weight {
        TermStatus::Bottleneck
    } else if 0.6 < thresholds.moderate {
        TermStatus::Warning
    } else {
        TermStatus::Strong
    };
    assert_eq!(score.input_rate.status, expected);
    assert_eq!(score.input_rate.status, TermStatus::Warning);
}

#[test]
fn acquisition_child_keeps_badge_below_two_thirds() {
    let children = vec![
        ChildProgress::new("a", 1.0, GoalPhase::Graduated),
        ChildProgress::new("b", 1.0, GoalPhase::Graduated),
        ChildProgress::new("c", 0.0, GoalPhase::Acquisition),
    ];
    let status = compute_badge(
        "badge",
        &children,
        &TierThresholds::default(),
        &PhaseWeighting::default(),
    )
    .unwrap();
    assert!(status.progress < 0.67);
    assert_eq!(status.tier, BadgeTier::Silver);
}

#[test]
fn badge_with_no_children_is_locked() {
    let status = compute_badge(
        "badge",
        &[],
        &TierThresholds::default(),
        &PhaseWeighting::default(),
    )
    .unwrap();
    assert_eq!(status.tier, BadgeTier::None);
    assert_eq!(status.progress, 0.0);
}

#[test]
fn weekly_rollover_through_file_store_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let weeks = history(&[1.0, 1.0, 1.0, 1.0]);

    {
        let engine = PhaseEngine::new(FilePhaseStore::with_dir(dir.path()).unwrap());
        let update = engine.record_week("run-goal", &weeks).unwrap();
        assert_eq!(update.phase, GoalPhase::Consolidation);
        assert!(update.persisted);
    }

    let engine = PhaseEngine::new(FilePhaseStore::with_dir(dir.path()).unwrap());
    let replay = engine.record_week("run-goal", &weeks).unwrap();
    assert!(!replay.persisted);
    assert_eq!(replay.phase, GoalPhase::Consolidation);
    assert_eq!(engine.current("run-goal").unwrap().version, 1);
}

#[test]
fn concurrent_rollovers_apply_one_regression() {
    let store = Arc::new(MemoryPhaseStore::new());
    let engine = Arc::new(PhaseEngine::new(Arc::clone(&store)));

    engine
        .record_week("goal", &history(&[1.0, 1.0, 1.0, 1.0]))
        .unwrap();

    let mut weeks = history(&[1.0, 1.0, 1.0, 1.0, 0.4, 0.3]);
    weeks.drain(..2);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let weeks = weeks.clone();
            std::thread::spawn(move || engine.record_week_retrying("goal", &weeks, 5))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let state = store.get("goal").unwrap().unwrap();
    assert_eq!(state.phase, GoalPhase::Acquisition);
    assert_eq!(state.version, 2);
}

#[test]
fn builtin_catalog_drives_badges() {
    let graph = builtin_catalog().unwrap();
    let instances = vec![
        GoalInstance::new("i1", "sleep-schedule", 7.0, 7.0).with_phase(GoalPhase::Graduated),
        GoalInstance::new("i2", "meditate", 7.0, 7.0).with_phase(GoalPhase::Consolidation),
    ];
    let status = compute_badge_from_graph(
        &graph,
        "rested",
        &instances,
        &TierThresholds::default(),
        &PhaseWeighting::default(),
    )
    .unwrap();
    assert!(status.unlocked);

    let err = compute_badge_from_graph(
        &graph,
        "vital-body",
        &instances,
        &TierThresholds::default(),
        &PhaseWeighting::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SummitError::InvalidConfig { .. }));
}
