//! Scarcity analysis: how many workers are qualified for each Y-task type,
//! and how "scarce" each worker's qualification profile makes them.
//!
//! Used as a tie-breaker (protect scarce workers for generic slots) and as
//! a processing order (fill scarcest task types first within a day).

use std::collections::HashMap;

use crate::worker::{Worker, YTaskType};

/// Per-task-type availability and scarcity, computed once per run against
/// the full worker pool.
#[derive(Debug, Clone, Default)]
pub struct ScarcityTable {
    availability: HashMap<YTaskType, u32>,
    scarcity: HashMap<YTaskType, f64>,
}

impl ScarcityTable {
    /// `availability[t]` = number of workers qualified for `t`;
    /// `scarcity[t]` = `1 / max(1, availability[t])`.
    pub fn analyze(workers: &[Worker]) -> Self {
        let mut availability = HashMap::new();
        for &t in YTaskType::ALL {
            let count = workers.iter().filter(|w| w.is_qualified_for(t)).count() as u32;
            availability.insert(t, count);
        }
        let scarcity = availability
            .iter()
            .map(|(&t, &count)| (t, 1.0 / (count.max(1) as f64)))
            .collect();
        Self {
            availability,
            scarcity,
        }
    }

    pub fn availability(&self, task: YTaskType) -> u32 {
        self.availability.get(&task).copied().unwrap_or(0)
    }

    pub fn scarcity(&self, task: YTaskType) -> f64 {
        self.scarcity.get(&task).copied().unwrap_or(1.0)
    }

    /// Mean scarcity over the worker's task qualifications; `0.0` if they
    /// hold none.
    pub fn worker_scarcity_index(&self, worker: &Worker) -> f64 {
        let tasks: Vec<YTaskType> = worker.task_qualifications().collect();
        if tasks.is_empty() {
            return 0.0;
        }
        let sum: f64 = tasks.iter().map(|&t| self.scarcity(t)).sum();
        sum / tasks.len() as f64
    }

    /// Y-task types ordered ascending by availability — scarcest first. Ties
    /// broken by the caller-supplied canonical order ([`YTaskType::ALL`]).
    pub fn types_scarcest_first(&self) -> Vec<YTaskType> {
        let mut types: Vec<YTaskType> = YTaskType::ALL.to_vec();
        types.sort_by_key(|&t| (self.availability(t), YTaskType::ALL.iter().position(|&x| x == t)));
        types
    }
}
