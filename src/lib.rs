//! dutyroster - scheduling engine for recurring duty (Y-task) and weekend
//! closing assignment.
//!
//! Given a worker roster and a date range, [`scheduler::Scheduler`] assigns
//! weekend closers, weekend Y-tasks, and weekday Y-tasks, driven by
//! pre-computed required/optimal closing dates ([`calculator`]), per-task
//! scarcity ([`scarcity`]), and a fairness scoring model ([`scoring`],
//! [`config`]). See each module's docs for the algorithm it owns.

pub mod calculator;
pub mod config;
pub mod dates;
pub mod error;
pub mod scarcity;
pub mod scheduler;
pub mod scoring;
pub mod worker;

pub use calculator::{calculate_worker_schedule, CalculationResult};
pub use config::{CohortStrategy, ScoringConfig};
pub use error::{AssignmentError, ReversalKind, SchedulingInputError, Severity};
pub use scarcity::ScarcityTable;
pub use scheduler::{ScheduleOptions, Scheduler, SchedulerResult, WeekdayTasks};
pub use worker::{Qualification, Worker, WorkerId, YTaskType, RITUK};
