//! Integration tests for the study session workflow.
//!
//! These tests drive the engine the way the surrounding application
//! would: load settings from a store, start a session over a card
//! snapshot, grade through the queue, and finish against the quota
//! counters.

use std::collections::HashMap;

use chrono::NaiveDate;

use mnemo_core::{
    Card, DayCounts, Grade, Limit, MemoryStore, Mode, Scope, SessionQueue, SqliteStore,
    StartError, Store, StudyConfig, StudyEngine,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
}

fn snapshot(cards: Vec<Card>) -> HashMap<String, Card> {
    cards.into_iter().map(|c| (c.id.clone(), c)).collect()
}

fn due_review(id: &str) -> Card {
    let mut card = Card::new(id, day());
    card.repetitions = 2;
    card.interval_days = 6;
    card
}

#[test]
fn full_session_round_trip_updates_quota_and_snapshot() {
    let mut engine = StudyEngine::with_config(MemoryStore::new(), StudyConfig::default());
    let mut cards = snapshot(vec![due_review("a"), due_review("b"), Card::new("n1", day())]);

    let mut session = SessionQueue::start(
        &cards,
        &Scope::All,
        Mode::Normal,
        engine.config(),
        DayCounts::default(),
        day(),
    )
    .unwrap();
    assert_eq!(session.batch_len(), 3);

    // Persist each graded copy immediately, as the application would.
    let mut b_failed = false;
    while let Some(current) = session.current() {
        let id = current.id.clone();
        let grade = if id == "b" && !b_failed {
            b_failed = true;
            Grade::Again
        } else {
            Grade::Good
        };
        if let Some(updated) = session.grade(grade) {
            if session.mode() == Mode::Normal {
                cards.insert(id, updated);
            }
        }
    }
    assert!(session.is_complete());

    let summary = engine.finish_session(&mut session, &cards).unwrap();
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.new_cards_shown, 1);
    assert_eq!(summary.tally.again, 1);
    assert_eq!(summary.tally.good, 3);

    let counts = engine.quota().counts(day()).unwrap();
    assert_eq!(counts.reviews, 3);
    assert_eq!(counts.new_cards, 1);

    // The persisted snapshot moved forward.
    assert!(cards.get("a").unwrap().next_review > day());
    assert_eq!(cards.get("b").unwrap().repetitions, 1);
}

#[test]
fn five_reviews_with_limit_three_truncates_to_three() {
    let cards = snapshot((0..5).map(|i| due_review(&format!("r{i}"))).collect());
    let config = StudyConfig {
        new_cards_limit: Limit::Limited(10),
        max_reviews_limit: Limit::Limited(3),
        ..Default::default()
    };
    let session = SessionQueue::start(
        &cards,
        &Scope::All,
        Mode::Normal,
        &config,
        DayCounts::default(),
        day(),
    )
    .unwrap();
    assert_eq!(session.batch_len(), 3);
}

#[test]
fn quota_exhausted_normal_vs_practice() {
    let cards = snapshot(vec![due_review("a"), due_review("b")]);
    let config = StudyConfig {
        max_reviews_limit: Limit::Limited(5),
        ..Default::default()
    };
    let consumed = DayCounts {
        reviews: 5,
        new_cards: 0,
    };

    let err =
        SessionQueue::start(&cards, &Scope::All, Mode::Normal, &config, consumed, day())
            .unwrap_err();
    assert!(matches!(err, StartError::QuotaExhausted));

    let practice =
        SessionQueue::start(&cards, &Scope::All, Mode::Practice, &config, consumed, day())
            .unwrap();
    assert_eq!(practice.batch_len(), 2);
}

#[test]
fn failed_cards_always_resurface_before_completion() {
    let cards = snapshot(vec![due_review("a"), due_review("b"), due_review("c")]);
    let mut session = SessionQueue::start(
        &cards,
        &Scope::All,
        Mode::Normal,
        &StudyConfig::default(),
        DayCounts::default(),
        day(),
    )
    .unwrap();

    let mut failed_once = false;
    let mut seen_after_failure = false;
    let mut shown: Vec<String> = Vec::new();
    while let Some(current) = session.current() {
        let id = current.id.clone();
        shown.push(id.clone());
        if id == "b" && !failed_once {
            failed_once = true;
            session.grade(Grade::Again);
        } else {
            if id == "b" && failed_once {
                seen_after_failure = true;
            }
            session.grade(Grade::Good);
        }
    }
    assert!(session.is_complete());
    assert!(seen_after_failure, "failed card never resurfaced: {shown:?}");
}

#[test]
fn engine_reads_persisted_counters_across_sessions() {
    let mut store = MemoryStore::new();
    let config = StudyConfig {
        max_reviews_limit: Limit::Limited(2),
        ..Default::default()
    };
    config.save(&mut store).unwrap();
    let mut engine = StudyEngine::new(store).unwrap();

    // `start_session` evaluates due-ness against the real local date.
    let today = mnemo_core::calendar::today();
    let cards = snapshot(
        ["a", "b", "c"]
            .into_iter()
            .map(|id| {
                let mut card = Card::new(id, today);
                card.repetitions = 2;
                card.interval_days = 6;
                card
            })
            .collect(),
    );

    let mut first = engine
        .start_session(&cards, &Scope::All, Mode::Normal)
        .unwrap();
    assert_eq!(first.batch_len(), 2);
    first.grade(Grade::Good);
    first.grade(Grade::Good);
    engine.finish_session(&mut first, &cards).unwrap();

    // The day's review capacity is now spent.
    let err = engine
        .start_session(&cards, &Scope::All, Mode::Normal)
        .unwrap_err();
    assert!(matches!(err, StartError::QuotaExhausted));
}

#[test]
fn review_again_drills_the_same_cards_without_quota() {
    let mut engine = StudyEngine::with_config(MemoryStore::new(), StudyConfig::default());
    let cards = snapshot(vec![due_review("a"), due_review("b")]);

    let mut session = SessionQueue::start(
        &cards,
        &Scope::All,
        Mode::Normal,
        engine.config(),
        DayCounts::default(),
        day(),
    )
    .unwrap();
    session.grade(Grade::Good);
    session.grade(Grade::Good);
    engine.finish_session(&mut session, &cards).unwrap();

    let mut again = session.review_again().unwrap();
    assert_eq!(again.mode(), Mode::Practice);
    assert_eq!(again.batch_len(), 2);
    again.grade(Grade::Good);
    again.grade(Grade::Good);
    engine.finish_session(&mut again, &cards).unwrap();

    // Only the original normal session hit the counters.
    let counts = engine.quota().counts(day()).unwrap();
    assert_eq!(counts.reviews, 2);
}

#[test]
fn summary_forecast_scans_the_whole_snapshot() {
    let mut engine = StudyEngine::with_config(MemoryStore::new(), StudyConfig::default());
    let mut far = Card::new("far", day());
    far.next_review = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
    far.repetitions = 1;
    let cards = snapshot(vec![due_review("a"), far]);

    let mut session = SessionQueue::start(
        &cards,
        &Scope::All,
        Mode::Normal,
        engine.config(),
        DayCounts::default(),
        day(),
    )
    .unwrap();
    // Only "a" is in the batch, but the forecast still sees "far".
    assert_eq!(session.batch_len(), 1);
    session.grade(Grade::Good);

    let summary = engine.finish_session(&mut session, &cards).unwrap();
    assert_eq!(summary.forecast.due_tomorrow, 1);
}

#[test]
fn sqlite_store_persists_counters_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mnemo.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        let mut engine = StudyEngine::new(store).unwrap();
        let mut card = Card::new("a", mnemo_core::calendar::today());
        card.repetitions = 2;
        card.interval_days = 6;
        let cards = snapshot(vec![card]);
        let mut session = engine
            .start_session(&cards, &Scope::All, Mode::Normal)
            .unwrap();
        session.grade(Grade::Good);
        engine.finish_session(&mut session, &cards).unwrap();
    }

    // Reopen and observe the same counters.
    let store = SqliteStore::open(&path).unwrap();
    let today = mnemo_core::calendar::today();
    let key = format!("counts.{}", mnemo_core::calendar::iso_date(today));
    let counts: DayCounts = store.get_json(&key).unwrap().unwrap();
    assert_eq!(counts.reviews, 1);
}

#[test]
fn settings_persist_through_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mnemo.db");

    {
        let mut store = SqliteStore::open(&path).unwrap();
        let config = StudyConfig {
            new_cards_limit: Limit::Limited(5),
            session_cap: Limit::Limited(20),
            ..Default::default()
        };
        config.save(&mut store).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let loaded = StudyConfig::load(&store).unwrap();
    assert_eq!(loaded.new_cards_limit, Limit::Limited(5));
    assert_eq!(loaded.session_cap, Limit::Limited(20));
}
