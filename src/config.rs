//! Scoring configuration: tunable weights and policy toggles, read-only once built.

use std::collections::HashMap;

use crate::worker::YTaskType;

/// Reference group used when comparing a worker's workload against its peers
/// for fairness scoring (see [`crate::scoring::on_y_fairness`] and
/// [`ScoringConfig::cohort`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CohortStrategy {
    /// Workers with the same number of qualification tags.
    SameNumQualifications,
    /// Workers holding a specific required qualification (or everyone, if none given).
    HasRequiredQualification,
}

impl Default for CohortStrategy {
    fn default() -> Self {
        CohortStrategy::HasRequiredQualification
    }
}

/// Immutable, per-run bag of scoring weights and policy toggles.
///
/// Built once (typically via [`ScoringConfig::default`] plus `with_*` overrides)
/// and passed by reference into every scoring and scheduling call; nothing in
/// this crate mutates it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoringConfig {
    /// Per Y-task weight, used by [`crate::scoring::compute_weighted_totals`].
    pub task_weights: HashMap<YTaskType, f64>,
    pub cohort_strategy: CohortStrategy,
    pub early_close_bonus: f64,
    pub overdue_reduction_per_week: f64,
    pub owe_to_score_conversion: f64,
    pub y_task_fairness_weight: f64,
    pub switch_penalty_y_task: f64,
    pub switch_penalty_closing: f64,
    /// Used by an external annual reset job; the engine itself never resets anything.
    pub year_reset_enabled: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let task_weights = YTaskType::ALL.iter().map(|&t| (t, 1.0)).collect();
        Self {
            task_weights,
            cohort_strategy: CohortStrategy::default(),
            early_close_bonus: 1.0,
            overdue_reduction_per_week: 0.75,
            owe_to_score_conversion: 0.5,
            y_task_fairness_weight: 0.5,
            switch_penalty_y_task: 0.5,
            switch_penalty_closing: 1.5,
            year_reset_enabled: true,
        }
    }
}

impl ScoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task_weight(mut self, task: YTaskType, weight: f64) -> Self {
        self.task_weights.insert(task, weight);
        self
    }

    pub fn with_cohort_strategy(mut self, strategy: CohortStrategy) -> Self {
        self.cohort_strategy = strategy;
        self
    }

    pub fn with_early_close_bonus(mut self, bonus: f64) -> Self {
        self.early_close_bonus = bonus;
        self
    }

    pub fn with_overdue_reduction_per_week(mut self, reduction: f64) -> Self {
        self.overdue_reduction_per_week = reduction;
        self
    }

    pub fn with_owe_to_score_conversion(mut self, rate: f64) -> Self {
        self.owe_to_score_conversion = rate;
        self
    }

    pub fn with_y_task_fairness_weight(mut self, weight: f64) -> Self {
        self.y_task_fairness_weight = weight;
        self
    }

    pub fn with_switch_penalties(mut self, y_task: f64, closing: f64) -> Self {
        self.switch_penalty_y_task = y_task;
        self.switch_penalty_closing = closing;
        self
    }

    pub fn with_year_reset_enabled(mut self, enabled: bool) -> Self {
        self.year_reset_enabled = enabled;
        self
    }

    /// Weight applied to a given Y-task type; defaults to `1.0` for any type not
    /// explicitly overridden.
    pub fn task_weight(&self, task: YTaskType) -> f64 {
        self.task_weights.get(&task).copied().unwrap_or(1.0)
    }
}
