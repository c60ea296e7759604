//! Serde round-trip coverage for the data types a persistence layer would
//! actually serialize (`Worker`, `ScoringConfig`). Only compiled when the
//! `serde` feature is enabled.
#![cfg(feature = "serde")]

use chrono::NaiveDate;
use dutyroster::{CohortStrategy, Qualification, ScoringConfig, Worker, YTaskType};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn worker_round_trips_through_json() {
    let worker = Worker::new("alice", "Alice", d(2024, 1, 1), 4)
        .with_qualifications([Qualification::Task(YTaskType::Supervisor), Qualification::Officer])
        .with_x_task(d(2025, 1, 10), "Rituk")
        .with_closing_history([d(2024, 12, 6), d(2024, 11, 8)])
        .with_score(3.5);

    let json = serde_json::to_string(&worker).expect("serialize worker");
    let restored: Worker = serde_json::from_str(&json).expect("deserialize worker");

    assert_eq!(restored.id, worker.id);
    assert_eq!(restored.qualifications, worker.qualifications);
    assert_eq!(restored.x_tasks, worker.x_tasks);
    assert_eq!(restored.closing_history, worker.closing_history);
    assert_eq!(restored.score, worker.score);
}

#[test]
fn scoring_config_round_trips_through_json() {
    let cfg = ScoringConfig::default()
        .with_task_weight(YTaskType::Supervisor, 2.5)
        .with_cohort_strategy(CohortStrategy::SameNumQualifications)
        .with_switch_penalties(0.25, 1.0);

    let json = serde_json::to_string(&cfg).expect("serialize config");
    let restored: ScoringConfig = serde_json::from_str(&json).expect("deserialize config");

    assert_eq!(restored.cohort_strategy, cfg.cohort_strategy);
    assert_eq!(restored.task_weight(YTaskType::Supervisor), 2.5);
    assert_eq!(restored.switch_penalty_y_task, 0.25);
    assert_eq!(restored.switch_penalty_closing, 1.0);
}

#[test]
fn empty_worker_state_round_trips() {
    let worker = Worker::new("bob", "Bob", d(2024, 6, 1), 0);
    let json = serde_json::to_string(&worker).expect("serialize worker");
    let restored: Worker = serde_json::from_str(&json).expect("deserialize worker");
    assert!(restored.qualifications.is_empty());
    assert!(restored.closing_history.is_empty());
    assert_eq!(restored.closing_interval, 0);
}
