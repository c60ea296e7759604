//! The range scheduler: the orchestrator that fills weekend closers, weekend
//! Y-tasks, and weekday Y-tasks over `[start, end]`.
//!
//! Single entry point: [`Scheduler::schedule_range`]. See the crate-level
//! docs for the concurrency model — one invocation owns its `workers` slice
//! exclusively and runs to completion with no suspension points.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::calculator::{self, CalculationResult};
use crate::config::ScoringConfig;
use crate::dates::{friday_of_week, is_weekend_block_day, thursdays_in_range};
use crate::error::{AssignmentError, SchedulingInputError};
use crate::scarcity::ScarcityTable;
use crate::scoring;
use crate::worker::{Worker, WorkerId, YTaskType};

/// Per-date Y-task requests for weekdays (weekday index ∉ {Thu, Fri, Sat}).
pub type WeekdayTasks = HashMap<NaiveDate, Vec<YTaskType>>;

/// Run-scoped policy knobs, builder-constructed like [`ScoringConfig`].
#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    pub num_closers_per_weekend: usize,
    pub weekday_tasks: WeekdayTasks,
    /// Run-wide ceiling on total Y-task assignments per worker across the
    /// whole range — not a per-ISO-week ceiling, despite the legacy name.
    /// See §9B resolved open question 1.
    pub weekly_limit: u32,
    pub max_same_task_type: u32,
    /// Skips the "not closed last week" weekend-eligibility check (Stage A/B only).
    pub ignore_recent_close: bool,
    /// Skips the "not required next week" weekend-eligibility check (Stage A/B only).
    pub ignore_next_required: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            num_closers_per_weekend: 0,
            weekday_tasks: WeekdayTasks::new(),
            weekly_limit: 1,
            max_same_task_type: 1,
            ignore_recent_close: false,
            ignore_next_required: false,
        }
    }
}

impl ScheduleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_closers_per_weekend(mut self, n: usize) -> Self {
        self.num_closers_per_weekend = n;
        self
    }

    pub fn with_weekday_tasks(mut self, tasks: WeekdayTasks) -> Self {
        self.weekday_tasks = tasks;
        self
    }

    pub fn with_weekly_limit(mut self, limit: u32) -> Self {
        self.weekly_limit = limit;
        self
    }

    pub fn with_max_same_task_type(mut self, max: u32) -> Self {
        self.max_same_task_type = max;
        self
    }
}

/// `{closers, y_tasks, logs, assignment_errors, success}` — see the
/// crate-level docs §3/§6.
#[derive(Debug, Clone, Default)]
pub struct SchedulerResult {
    pub closers: HashMap<NaiveDate, Vec<WorkerId>>,
    pub y_tasks: HashMap<NaiveDate, Vec<(YTaskType, WorkerId)>>,
    pub logs: Vec<String>,
    pub assignment_errors: Vec<AssignmentError>,
    pub success: bool,
}

/// Per-run mutable counters, owned by the scheduling call — never stored on
/// `Worker`, so workers stay serializable and re-runs stay deterministic.
#[derive(Debug, Default)]
struct RunCounters {
    weekly_total: HashMap<WorkerId, u32>,
    per_type: HashMap<(WorkerId, YTaskType), u32>,
}

impl RunCounters {
    fn weekly_total(&self, id: &str) -> u32 {
        self.weekly_total.get(id).copied().unwrap_or(0)
    }

    fn per_type(&self, id: &str, task: YTaskType) -> u32 {
        self.per_type.get(&(id.to_string(), task)).copied().unwrap_or(0)
    }

    fn bump(&mut self, id: &str, task: YTaskType) {
        *self.weekly_total.entry(id.to_string()).or_insert(0) += 1;
        *self.per_type.entry((id.to_string(), task)).or_insert(0) += 1;
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Distance in weeks to the nearest optimal closing date; `i64::MAX` if the
/// worker has none (pushes them to the back of the ranking, never chosen
/// over a worker who is actually due).
fn weeks_to_nearest_optimal(worker: &Worker, friday: NaiveDate) -> i64 {
    worker
        .optimal_closing_dates
        .iter()
        .map(|&d| ((d - friday).num_days() / 7).abs())
        .min()
        .unwrap_or(i64::MAX)
}

/// The single place `closing_history` grows during a run; always followed
/// by re-running the calculator so subsequent weekends see the effect. See
/// crate docs §4.5.
fn after_closing_assigned(
    workers: &mut [Worker],
    idx: usize,
    friday: NaiveDate,
    remaining_fridays: &[NaiveDate],
    logs: &mut Vec<String>,
) {
    workers[idx].record_closing(friday);
    let result: CalculationResult = calculator::calculate_worker_schedule(&workers[idx], remaining_fridays);
    workers[idx].required_closing_dates = result.required_dates;
    workers[idx].optimal_closing_dates = result.optimal_dates;
    workers[idx].weekends_home_owed = result.final_weekends_home_owed;
    for alert in result.user_alerts {
        logs.push(alert);
    }
}

/// The scheduling engine's single operation.
pub struct Scheduler;

impl Scheduler {
    /// Assigns weekend closers, weekend Y-tasks, and weekday Y-tasks over
    /// `[start, end]`. Total: always returns a result, never panics on a
    /// scheduling failure — see the crate-level error-handling policy.
    pub fn schedule_range(
        workers: &mut [Worker],
        start: NaiveDate,
        end: NaiveDate,
        options: &ScheduleOptions,
        cfg: &ScoringConfig,
    ) -> Result<SchedulerResult, SchedulingInputError> {
        if end < start {
            return Err(SchedulingInputError::InvertedRange { start, end });
        }

        let mut seen_ids: HashSet<&WorkerId> = HashSet::new();
        for w in workers.iter() {
            if !seen_ids.insert(&w.id) {
                return Err(SchedulingInputError::DuplicateWorkerId(w.id.clone()));
            }
        }

        let mut logs: Vec<String> = Vec::new();
        let mut errors: Vec<AssignmentError> = Vec::new();
        let mut counters = RunCounters::default();
        let mut closers_result: HashMap<NaiveDate, Vec<WorkerId>> = HashMap::new();
        let mut y_tasks_result: HashMap<NaiveDate, Vec<(YTaskType, WorkerId)>> = HashMap::new();
        let mut all_closer_ids: HashSet<WorkerId> = HashSet::new();

        let id_index: HashMap<WorkerId, usize> =
            workers.iter().enumerate().map(|(i, w)| (w.id.clone(), i)).collect();

        // --- Pre-pass: precompute every worker's required/optimal closes. ---
        let thursdays = thursdays_in_range(start, end);
        let fridays: Vec<NaiveDate> = thursdays.iter().map(|&t| t + Duration::days(1)).collect();

        for worker in workers.iter_mut() {
            let result = calculator::calculate_worker_schedule(worker, &fridays);
            worker.required_closing_dates = result.required_dates;
            worker.optimal_closing_dates = result.optimal_dates;
            worker.weekends_home_owed = result.final_weekends_home_owed;
            logs.extend(result.user_alerts);
        }

        let scarcity = ScarcityTable::analyze(workers);
        let scarce_order = scarcity.types_scarcest_first();

        // --- Weekend scheduling loop. ---
        if !thursdays.is_empty() {
            logs.push("=== WEEKEND SCHEDULING ===".to_string());
        }

        for (idx, &thursday) in thursdays.iter().enumerate() {
            let friday = thursday + Duration::days(1);
            let saturday = friday + Duration::days(1);
            let remaining_fridays = &fridays[idx + 1..];

            // A. Choose closers.
            let mut chosen: Vec<WorkerId> = Vec::new();
            let mut chosen_set: HashSet<WorkerId> = HashSet::new();

            let required_now: Vec<usize> = workers
                .iter()
                .enumerate()
                .filter(|(_, w)| w.required_closing_dates.contains(&friday))
                .map(|(i, _)| i)
                .collect();
            for i in required_now {
                if chosen_set.insert(workers[i].id.clone()) {
                    chosen.push(workers[i].id.clone());
                    after_closing_assigned(workers, i, friday, remaining_fridays, &mut logs);
                }
            }

            if chosen.len() < options.num_closers_per_weekend {
                let last_week_friday = friday - Duration::weeks(1);
                let next_week_friday = friday + Duration::weeks(1);

                let mut candidates: Vec<usize> = workers
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| w.participates_in_closing())
                    .filter(|(_, w)| !chosen_set.contains(&w.id))
                    .filter(|(_, w)| !w.closing_history.contains(&last_week_friday))
                    .filter(|(_, w)| !w.required_closing_dates.contains(&next_week_friday))
                    .filter(|(_, w)| !w.required_closing_dates.contains(&last_week_friday))
                    .map(|(i, _)| i)
                    .collect();

                candidates.sort_by(|&a, &b| {
                    let wa = &workers[a];
                    let wb = &workers[b];
                    let due_a = u8::from(!wa.optimal_closing_dates.contains(&friday));
                    let due_b = u8::from(!wb.optimal_closing_dates.contains(&friday));
                    due_a
                        .cmp(&due_b)
                        .then_with(|| {
                            weeks_to_nearest_optimal(wa, friday).cmp(&weeks_to_nearest_optimal(wb, friday))
                        })
                        .then_with(|| cmp_f64(wa.score, wb.score))
                        .then_with(|| {
                            wa.closing_history
                                .iter()
                                .next_back()
                                .cmp(&wb.closing_history.iter().next_back())
                        })
                        .then_with(|| wa.id.cmp(&wb.id))
                });

                for &i in &candidates {
                    if chosen.len() >= options.num_closers_per_weekend {
                        break;
                    }
                    if chosen_set.insert(workers[i].id.clone()) {
                        chosen.push(workers[i].id.clone());
                        after_closing_assigned(workers, i, friday, remaining_fridays, &mut logs);
                    }
                }
            }

            if chosen.len() < options.num_closers_per_weekend {
                errors.push(AssignmentError::warning(
                    "Weekend Closer",
                    friday,
                    format!(
                        "could not fill {} closer slot(s)",
                        options.num_closers_per_weekend - chosen.len()
                    ),
                ));
                logs.push(format!(
                    "{}: could not fill all closer slots ({}/{})",
                    crate::dates::format_ddmmyyyy(friday),
                    chosen.len(),
                    options.num_closers_per_weekend
                ));
            }

            all_closer_ids.extend(chosen.iter().cloned());
            closers_result.insert(friday, chosen.clone());

            // B. Weekend Y-task fill.
            for &day in &[thursday, friday, saturday] {
                let mut assigned_today: HashSet<WorkerId> = HashSet::new();
                for &task in &scarce_order {
                    if let Some((worker_id, via_stage)) = Self::pick_weekend_assignee(
                        workers,
                        &id_index,
                        &chosen,
                        &chosen_set,
                        &counters,
                        task,
                        day,
                        friday,
                        &assigned_today,
                        options,
                        &scarcity,
                        &mut logs,
                    ) {
                        let i = id_index[&worker_id];
                        workers[i].assign_y_task(day, task);
                        counters.bump(&worker_id, task);
                        assigned_today.insert(worker_id.clone());
                        y_tasks_result.entry(day).or_default().push((task, worker_id.clone()));
                        logs.push(format!(
                            "{}: assigned {} to {} ({})",
                            crate::dates::format_ddmmyyyy(day),
                            task,
                            worker_id,
                            via_stage
                        ));
                    } else {
                        errors.push(AssignmentError::error(
                            task.as_str(),
                            day,
                            "No qualified workers for this task",
                        ));
                    }
                }
            }
        }

        // --- Weekday scheduling loop. ---
        if !options.weekday_tasks.is_empty() {
            logs.push("=== WEEKDAY SCHEDULING ===".to_string());
        }

        let mut weekdays: Vec<NaiveDate> = options.weekday_tasks.keys().copied().collect();
        weekdays.sort();
        for date in weekdays {
            if is_weekend_block_day(date) {
                continue;
            }
            let mut tasks: Vec<YTaskType> = options.weekday_tasks[&date].clone();
            tasks.sort_by_key(|t| scarce_order.iter().position(|x| x == t).unwrap_or(usize::MAX));

            let week_friday = friday_of_week(date);
            let prior_day = date - Duration::days(1);

            for task in tasks {
                let strict: Vec<usize> = workers
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| w.is_qualified_for(task))
                    .filter(|(_, w)| !w.y_tasks.contains_key(&date))
                    .filter(|(_, w)| counters.weekly_total(&w.id) < options.weekly_limit)
                    .filter(|(_, w)| counters.per_type(&w.id, task) < options.max_same_task_type)
                    .filter(|(_, w)| !all_closer_ids.contains(&w.id))
                    .filter(|(_, w)| {
                        !closers_result
                            .get(&week_friday)
                            .is_some_and(|ids| ids.contains(&w.id))
                    })
                    .filter(|(_, w)| !w.has_blocking_x_task_on(prior_day))
                    .map(|(i, _)| i)
                    .collect();

                let (mut survivors, stage_label) = if !strict.is_empty() {
                    (strict, "strict")
                } else {
                    logs.push(format!(
                        "{}: relaxing weekly/weekend-closer limits for {}",
                        crate::dates::format_ddmmyyyy(date),
                        task
                    ));
                    let relaxed: Vec<usize> = workers
                        .iter()
                        .enumerate()
                        .filter(|(_, w)| w.is_qualified_for(task))
                        .filter(|(_, w)| !w.y_tasks.contains_key(&date))
                        .filter(|(_, w)| counters.per_type(&w.id, task) < options.max_same_task_type)
                        .map(|(i, _)| i)
                        .collect();
                    if !relaxed.is_empty() {
                        (relaxed, "relaxed: weekly+closer")
                    } else {
                        logs.push(format!(
                            "{}: relaxing per-type cap for {}",
                            crate::dates::format_ddmmyyyy(date),
                            task
                        ));
                        let fully_relaxed: Vec<usize> = workers
                            .iter()
                            .enumerate()
                            .filter(|(_, w)| w.is_qualified_for(task))
                            .filter(|(_, w)| !w.y_tasks.contains_key(&date))
                            .map(|(i, _)| i)
                            .collect();
                        (fully_relaxed, "relaxed: per-type cap")
                    }
                };

                if survivors.is_empty() {
                    errors.push(AssignmentError::error(
                        task.as_str(),
                        date,
                        "All qualified workers already assigned or ineligible",
                    ));
                    continue;
                }

                survivors.sort_by(|&a, &b| {
                    let wa = &workers[a];
                    let wb = &workers[b];
                    cmp_f64(wa.score, wb.score)
                        .then_with(|| wa.y_task_count(task).cmp(&wb.y_task_count(task)))
                        .then_with(|| cmp_f64(scarcity.worker_scarcity_index(wb), scarcity.worker_scarcity_index(wa)))
                        .then_with(|| wa.id.cmp(&wb.id))
                });

                let chosen_i = survivors[0];
                let worker_id = workers[chosen_i].id.clone();
                workers[chosen_i].assign_y_task(date, task);
                counters.bump(&worker_id, task);
                y_tasks_result.entry(date).or_default().push((task, worker_id.clone()));
                logs.push(format!(
                    "{}: assigned {} to {} ({stage_label})",
                    crate::dates::format_ddmmyyyy(date),
                    task,
                    worker_id
                ));
            }
        }

        // --- Finalisation. ---
        logs.push("=== FINAL FAIRNESS UPDATE ===".to_string());
        let snapshot = workers.to_vec();
        for worker in workers.iter_mut() {
            scoring::on_y_fairness(worker, &snapshot, cfg);
        }

        let num_errors = errors.iter().filter(|e| e.is_error()).count();
        let num_warnings = errors.len() - num_errors;
        logs.push(format!(
            "Run complete: {num_errors} error(s), {num_warnings} warning(s)"
        ));

        Ok(SchedulerResult {
            closers: closers_result,
            y_tasks: y_tasks_result,
            logs,
            assignment_errors: errors,
            success: num_errors == 0,
        })
    }

    /// Read-only statistic: per-worker Y-task counts weighted by
    /// `cfg.task_weights`, alongside (not replacing) the raw counts.
    pub fn weighted_totals(workers: &[Worker], cfg: &ScoringConfig) -> HashMap<WorkerId, f64> {
        scoring::compute_weighted_totals(workers, cfg)
    }

    #[allow(clippy::too_many_arguments)]
    fn pick_weekend_assignee(
        workers: &[Worker],
        id_index: &HashMap<WorkerId, usize>,
        closers: &[WorkerId],
        closers_set: &HashSet<WorkerId>,
        counters: &RunCounters,
        task: YTaskType,
        day: NaiveDate,
        friday: NaiveDate,
        assigned_today: &HashSet<WorkerId>,
        options: &ScheduleOptions,
        scarcity: &ScarcityTable,
        logs: &mut Vec<String>,
    ) -> Option<(WorkerId, &'static str)> {
        let rank = |ids: &mut Vec<WorkerId>| {
            ids.sort_by(|a, b| {
                let wa = &workers[id_index[a]];
                let wb = &workers[id_index[b]];
                cmp_f64(wa.score, wb.score)
                    .then_with(|| cmp_f64(scarcity.worker_scarcity_index(wb), scarcity.worker_scarcity_index(wa)))
                    .then_with(|| wa.id.cmp(&wb.id))
            });
        };

        // weekly_limit is a cross-cutting cap (§4.4), enforced here the same way
        // as every other stage: first under the cap, relaxed only as a last resort.
        let under_weekly_cap = |w: &Worker| counters.weekly_total(&w.id) < options.weekly_limit;
        let not_already_assigned_today = |w: &Worker| -> bool {
            !assigned_today.contains(&w.id) && !w.y_tasks.contains_key(&day)
        };

        // Closer-first attempt.
        let mut closer_candidates: Vec<WorkerId> = closers
            .iter()
            .filter(|id| {
                let w = &workers[id_index[*id]];
                w.is_qualified_for(task) && not_already_assigned_today(w) && under_weekly_cap(w)
            })
            .cloned()
            .collect();
        rank(&mut closer_candidates);
        if let Some(id) = closer_candidates.into_iter().next() {
            return Some((id, "closer"));
        }

        let eligible = |w: &Worker| -> bool {
            not_already_assigned_today(w)
                && under_weekly_cap(w)
                && (options.ignore_recent_close || !w.closing_history.contains(&(friday - Duration::weeks(1))))
                && (options.ignore_next_required
                    || !w.required_closing_dates.contains(&(friday + Duration::weeks(1))))
                && w.y_task_count(task) < options.max_same_task_type
        };

        // Stage A: eligible AND already "due" to close this weekend.
        let mut stage_a: Vec<WorkerId> = workers
            .iter()
            .filter(|w| !closers_set.contains(&w.id))
            .filter(|w| w.is_qualified_for(task))
            .filter(|w| eligible(w))
            .filter(|w| w.optimal_closing_dates.contains(&friday))
            .map(|w| w.id.clone())
            .collect();
        rank(&mut stage_a);
        if let Some(id) = stage_a.into_iter().next() {
            return Some((id, "stage A: due non-closer"));
        }

        // Stage B: eligible, regardless of "due" status.
        let mut stage_b: Vec<WorkerId> = workers
            .iter()
            .filter(|w| !closers_set.contains(&w.id))
            .filter(|w| w.is_qualified_for(task))
            .filter(|w| eligible(w))
            .map(|w| w.id.clone())
            .collect();
        rank(&mut stage_b);
        if let Some(id) = stage_b.into_iter().next() {
            return Some((id, "stage B: eligible non-closer"));
        }

        // Stage C: any qualified worker not yet assigned today, ignoring
        // eligibility (closing-recency rules) but still under the weekly cap.
        let mut stage_c: Vec<WorkerId> = workers
            .iter()
            .filter(|w| w.is_qualified_for(task))
            .filter(|w| not_already_assigned_today(w))
            .filter(|w| under_weekly_cap(w))
            .map(|w| w.id.clone())
            .collect();
        rank(&mut stage_c);
        if let Some(id) = stage_c.into_iter().next() {
            return Some((id, "stage C: last-ditch"));
        }

        // Stage D: every other stage was exhausted purely by the weekly cap;
        // relax it as the final fallback, logged the same way the weekday
        // pipeline logs its own relaxed tiers.
        logs.push(format!(
            "{}: relaxing weekly limit for {}",
            crate::dates::format_ddmmyyyy(day),
            task
        ));
        let mut stage_d: Vec<WorkerId> = workers
            .iter()
            .filter(|w| w.is_qualified_for(task))
            .filter(|w| not_already_assigned_today(w))
            .map(|w| w.id.clone())
            .collect();
        rank(&mut stage_d);
        stage_d.into_iter().next().map(|id| (id, "stage D: relaxed weekly limit"))
    }
}
