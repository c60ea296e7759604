//! Closing schedule calculator: given a worker and the semester's Fridays,
//! derives required closes (forced by X-tasks), optimal closes
//! (interval-driven), and residual "weekends owed" debt, without mutating
//! the worker — see [`CalculationResult`] and [`calculate_worker_schedule`].

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::worker::Worker;

/// One week's outcome in the internal walk; never exposed outside this
/// module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeekState {
    Home,
    Close,
}

/// Output of [`calculate_worker_schedule`] — the calculator's only public
/// entry point. The caller (range scheduler) applies this to the worker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationResult {
    pub required_dates: BTreeSet<NaiveDate>,
    pub optimal_dates: BTreeSet<NaiveDate>,
    pub final_weekends_home_owed: u32,
    pub calculation_log: Vec<String>,
    pub user_alerts: Vec<String>,
}

/// Last closing Friday, synthesizing a plausible one if the worker has never
/// closed — see §9B resolved open question 4 for why this isn't "zero debt".
fn last_close_date(worker: &Worker, semester_start: NaiveDate) -> NaiveDate {
    match worker.closing_history.iter().next_back() {
        Some(&d) => d,
        None => semester_start - Duration::weeks((worker.closing_interval.max(1) as i64) - 1),
    }
}

fn weeks_since(last_close: NaiveDate, semester_start: NaiveDate) -> i64 {
    (semester_start - last_close).num_days().div_euclid(7)
}

/// Week indices (into `fridays`) whose Mon-Sun week contains any X-task for
/// this worker — forced closes, regardless of `Rituk`.
fn x_task_weeks(worker: &Worker, fridays: &[NaiveDate]) -> BTreeSet<usize> {
    fridays
        .iter()
        .enumerate()
        .filter(|(_, &f)| worker.has_x_task_in_week_of(f))
        .map(|(i, _)| i)
        .collect()
}

/// Smart interval walk: the candidate week indices interval policy would
/// close on, shifted away from X-task-adjacent weeks where possible.
fn smart_interval_closes(interval: u32, weeks_since_last: i64, n_weeks: usize, x_weeks: &BTreeSet<usize>) -> BTreeSet<usize> {
    let mut closes = BTreeSet::new();
    if interval == 0 {
        return closes;
    }
    let interval = interval as i64;

    let first_close = (interval - weeks_since_last - 1).max(0) as usize;
    let step = interval.max(1) as usize;

    let neighbours_clear = |w: usize, x_weeks: &BTreeSet<usize>| -> bool {
        let prev_has_x = w > 0 && x_weeks.contains(&(w - 1));
        let next_has_x = (w + 1) < n_weeks && x_weeks.contains(&(w + 1));
        !prev_has_x && !next_has_x
    };

    let mut current = first_close;
    while current < n_weeks {
        if neighbours_clear(current, x_weeks) {
            closes.insert(current);
        } else {
            let mut shifted = false;
            for shift in 1..(interval as usize).max(1) {
                let candidate = current + shift;
                if candidate >= n_weeks {
                    break;
                }
                if neighbours_clear(candidate, x_weeks) {
                    closes.insert(candidate);
                    shifted = true;
                    break;
                }
            }
            if !shifted {
                for shift in 1..(interval as usize).max(1) {
                    if shift > current {
                        break;
                    }
                    let candidate = current - shift;
                    if neighbours_clear(candidate, x_weeks) {
                        closes.insert(candidate);
                        shifted = true;
                        break;
                    }
                }
            }
            // If no shift works, this interval slot is dropped; it becomes
            // debt when the main walk reaches a week that isn't scheduled.
        }
        current += step;
    }

    closes
}

/// Count of consecutive `Home` weeks immediately before `idx`.
fn home_weeks_before(schedule: &[WeekState], idx: usize) -> usize {
    let mut count = 0;
    for i in (0..idx).rev() {
        if schedule[i] == WeekState::Home {
            count += 1;
        } else {
            break;
        }
    }
    count
}

/// Tries to convert a `Close` within the last 3 weeks to `Home`, to make
/// room for an X-task close. Per §9B resolved open question 2, only a week
/// outside `x_weeks` (an optimal close) is eligible — a forced close is
/// never downgraded.
fn try_downgrade_recent_close(schedule: &mut [WeekState], idx: usize, x_weeks: &BTreeSet<usize>) -> bool {
    let start = idx.saturating_sub(3);
    for i in (start..idx).rev() {
        if schedule[i] == WeekState::Close && !x_weeks.contains(&i) {
            schedule[i] = WeekState::Home;
            return true;
        }
    }
    false
}

/// Runs the calculator for a single worker against the semester's ordered
/// Friday list. Pure: does not mutate `worker`.
pub fn calculate_worker_schedule(worker: &Worker, semester_fridays: &[NaiveDate]) -> CalculationResult {
    if semester_fridays.is_empty() {
        return CalculationResult {
            final_weekends_home_owed: worker.weekends_home_owed,
            calculation_log: vec!["No semester weeks provided".to_string()],
            ..Default::default()
        };
    }

    let n = semester_fridays.len();
    let mut schedule = vec![WeekState::Home; n];
    let mut owed: i64 = worker.weekends_home_owed as i64;
    let mut log = Vec::new();
    let mut alerts = Vec::new();

    let semester_start = semester_fridays[0];
    let last_close = last_close_date(worker, semester_start);
    let since = weeks_since(last_close, semester_start);

    let x_weeks = x_task_weeks(worker, semester_fridays);
    let interval_closes = if worker.participates_in_closing() {
        smart_interval_closes(worker.closing_interval, since, n, &x_weeks)
    } else {
        BTreeSet::new()
    };

    for week_idx in 0..n {
        let week_num = week_idx + 1;
        let has_x_task = x_weeks.contains(&week_idx);
        let should_close_by_interval = interval_closes.contains(&week_idx);
        let prev_was_close = week_idx > 0 && schedule[week_idx - 1] == WeekState::Close;

        if has_x_task {
            if prev_was_close {
                alerts.push(format!(
                    "CRITICAL: week {week_num} X-task would force a consecutive close for {} — algorithm failure, dropping it",
                    worker.name
                ));
                log.push(format!(
                    "Week {week_num}: CRITICAL ERROR - X-task would cause consecutive close - keeping HOME"
                ));
                schedule[week_idx] = WeekState::Home;
            } else {
                let before = home_weeks_before(&schedule, week_idx);
                if before >= 2 {
                    let debt_change = if should_close_by_interval { 0 } else { 1 };
                    owed += debt_change;
                    log.push(format!(
                        "Week {week_num}: X-task - forced close, debt change +{debt_change}, total owed {owed}"
                    ));
                    schedule[week_idx] = WeekState::Close;
                } else if try_downgrade_recent_close(&mut schedule, week_idx, &x_weeks) {
                    owed += 1;
                    log.push(format!(
                        "Week {week_num}: X-task - downgraded a recent optimal close to HOME, debt +1, total owed {owed}"
                    ));
                    schedule[week_idx] = WeekState::Close;
                } else {
                    let penalty = if before == 0 { 2 } else { 1 };
                    owed += penalty;
                    alerts.push(format!(
                        "Worker {} has an X-task but only {before} home week(s) before it; forced assignment, debt +{penalty}",
                        worker.name
                    ));
                    log.push(format!(
                        "Week {week_num}: X-task - forced close with only {before} home week(s) before, debt +{penalty}, total owed {owed}"
                    ));
                    schedule[week_idx] = WeekState::Close;
                }
            }
        } else if should_close_by_interval {
            if prev_was_close {
                owed += 1;
                log.push(format!(
                    "Week {week_num}: interval close skipped (would be consecutive) - HOME given, debt +1, total owed {owed}"
                ));
                schedule[week_idx] = WeekState::Home;
            } else if owed > 0 {
                owed -= 1;
                log.push(format!(
                    "Week {week_num}: paying back debt - HOME instead of close, total owed {owed}"
                ));
                schedule[week_idx] = WeekState::Home;
            } else {
                log.push(format!("Week {week_num}: normal interval close"));
                schedule[week_idx] = WeekState::Close;
            }
        } else {
            log.push(format!("Week {week_num}: home week"));
            schedule[week_idx] = WeekState::Home;
        }
    }

    let mut required_dates = BTreeSet::new();
    let mut optimal_dates = BTreeSet::new();
    for (week_idx, &state) in schedule.iter().enumerate() {
        if state == WeekState::Close {
            let week_date = semester_fridays[week_idx];
            if x_weeks.contains(&week_idx) {
                required_dates.insert(week_date);
            } else {
                optimal_dates.insert(week_date);
            }
        }
    }

    CalculationResult {
        required_dates,
        optimal_dates,
        final_weekends_home_owed: owed.max(0) as u32,
        calculation_log: log,
        user_alerts: alerts,
    }
}
