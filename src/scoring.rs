//! Pure fairness-score updates on [`Worker`], driven by [`ScoringConfig`].
//!
//! Higher score = more-worked, therefore lower assignment priority. Every
//! function here mutates exactly the worker passed in and is otherwise
//! side-effect free.

use crate::config::{CohortStrategy, ScoringConfig};
use crate::error::ReversalKind;
use crate::worker::{Worker, YTaskType};
use std::collections::HashMap;

/// Fixed bonus for a close that landed on (or ahead of) an optimal date.
/// Optimal dates are pre-computed by the calculator, so this doesn't need
/// to recompute "how early" — it's a flat tracking bonus, matching the
/// simplified scheme the reference engine settled on.
pub fn on_close_early(worker: &mut Worker, _weeks_early: u32, cfg: &ScoringConfig) {
    worker.score += cfg.early_close_bonus;
}

/// Subtracts a per-week reduction for an overdue close, floored at zero
/// overall weeks overdue (never a bonus for being on time).
pub fn on_close_overdue(worker: &mut Worker, weeks_overdue: u32, cfg: &ScoringConfig) {
    let reduction = (weeks_overdue as f64 * cfg.overdue_reduction_per_week).max(0.0);
    worker.score = (worker.score - reduction).max(0.0);
}

/// Converts any remaining owed weekends to score and zeroes the counter —
/// the end-of-semester settling step.
pub fn apply_semester_end_compensation(worker: &mut Worker, cfg: &ScoringConfig) {
    if worker.weekends_home_owed == 0 {
        return;
    }
    let converted = worker.weekends_home_owed as f64 * cfg.owe_to_score_conversion;
    worker.score += converted;
    worker.weekends_home_owed = 0;
}

/// Groups `all_workers` into the cohort `worker` should be compared against
/// for fairness, per `cfg.cohort_strategy`.
pub fn determine_cohort<'a>(
    worker: &Worker,
    all_workers: &'a [Worker],
    task_type: Option<YTaskType>,
    cfg: &ScoringConfig,
) -> Vec<&'a Worker> {
    match cfg.cohort_strategy {
        CohortStrategy::SameNumQualifications => {
            let target = worker.qualifications.len();
            all_workers
                .iter()
                .filter(|w| w.qualifications.len() == target)
                .collect()
        }
        CohortStrategy::HasRequiredQualification => match task_type {
            None => all_workers.iter().collect(),
            Some(t) => all_workers.iter().filter(|w| w.is_qualified_for(t)).collect(),
        },
    }
}

/// If `worker`'s total Y-tasks exceed the cohort mean by more than one, adds
/// `excess * cfg.y_task_fairness_weight` to the score.
pub fn on_y_fairness(worker: &mut Worker, all_workers: &[Worker], cfg: &ScoringConfig) {
    let cohort = determine_cohort(worker, all_workers, None, cfg);
    if cohort.is_empty() {
        return;
    }
    let avg = cohort.iter().map(|w| w.total_y_tasks() as f64).sum::<f64>() / cohort.len() as f64;
    let excess = worker.total_y_tasks() as f64 - avg;
    if excess > 1.0 {
        worker.score += excess * cfg.y_task_fairness_weight;
    }
}

/// Subtracts a small penalty when a previously committed assignment is
/// later revoked, sized by `kind`.
pub fn reverse_assignment_penalty(worker: &mut Worker, kind: ReversalKind, cfg: &ScoringConfig) {
    let penalty = match kind {
        ReversalKind::YTask => cfg.switch_penalty_y_task,
        ReversalKind::Closing => cfg.switch_penalty_closing,
    };
    worker.score = (worker.score - penalty).max(0.0);
}

/// Read-only statistic: each worker's Y-task counts weighted by
/// `cfg.task_weights`, alongside (not replacing) the raw `y_task_counts`.
pub fn compute_weighted_totals(workers: &[Worker], cfg: &ScoringConfig) -> HashMap<String, f64> {
    workers
        .iter()
        .map(|w| {
            let total: f64 = w
                .y_task_counts
                .iter()
                .map(|(&task, &count)| count as f64 * cfg.task_weight(task))
                .sum();
            (w.id.clone(), total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn worker(id: &str) -> Worker {
        Worker::new(id, id, d(2024, 1, 1), 2)
    }

    #[test]
    fn early_close_adds_fixed_bonus() {
        let cfg = ScoringConfig::default();
        let mut w = worker("a");
        on_close_early(&mut w, 2, &cfg);
        assert_eq!(w.score, cfg.early_close_bonus);
    }

    #[test]
    fn overdue_reduces_score_but_not_below_zero() {
        let cfg = ScoringConfig::default();
        let mut w = worker("a");
        w.score = 1.0;
        on_close_overdue(&mut w, 10, &cfg);
        assert_eq!(w.score, 0.0);
    }

    #[test]
    fn semester_end_compensation_zeroes_owed() {
        let cfg = ScoringConfig::default();
        let mut w = worker("a");
        w.weekends_home_owed = 4;
        apply_semester_end_compensation(&mut w, &cfg);
        assert_eq!(w.weekends_home_owed, 0);
        assert_eq!(w.score, 4.0 * cfg.owe_to_score_conversion);
    }

    #[test]
    fn y_fairness_only_penalizes_significant_excess() {
        let cfg = ScoringConfig::default();
        let mut a = worker("a");
        a.y_task_counts.insert(YTaskType::Supervisor, 10);
        let b = worker("b"); // 0 tasks
        let all = vec![a.clone(), b];
        let mut a_mut = a;
        on_y_fairness(&mut a_mut, &all, &cfg);
        assert!(a_mut.score > 0.0);
    }

    #[test]
    fn reverse_penalty_differs_by_kind() {
        let cfg = ScoringConfig::default();
        let mut w = worker("a");
        w.score = 10.0;
        reverse_assignment_penalty(&mut w, ReversalKind::Closing, &cfg);
        assert_eq!(w.score, 10.0 - cfg.switch_penalty_closing);
    }

    #[test]
    fn weighted_totals_apply_task_weights() {
        let cfg = ScoringConfig::default().with_task_weight(YTaskType::Supervisor, 2.0);
        let mut w = worker("a");
        w.y_task_counts.insert(YTaskType::Supervisor, 3);
        let totals = compute_weighted_totals(&[w], &cfg);
        assert_eq!(totals["a"], 6.0);
    }
}
