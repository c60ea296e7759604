//! Worker model: identity, qualifications, and the dynamic state the
//! calculator and range scheduler read and mutate.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;

use crate::dates::format_ddmmyyyy;

/// The five recurring daily duty types, in their canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum YTaskType {
    Supervisor,
    CnDriver,
    CnEscort,
    SouthernDriver,
    SouthernEscort,
}

impl YTaskType {
    /// All five types, in display order.
    pub const ALL: &'static [YTaskType] = &[
        YTaskType::Supervisor,
        YTaskType::CnDriver,
        YTaskType::CnEscort,
        YTaskType::SouthernDriver,
        YTaskType::SouthernEscort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            YTaskType::Supervisor => "Supervisor",
            YTaskType::CnDriver => "C&N Driver",
            YTaskType::CnEscort => "C&N Escort",
            YTaskType::SouthernDriver => "Southern Driver",
            YTaskType::SouthernEscort => "Southern Escort",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        YTaskType::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for YTaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A qualification tag: one of the five Y-task types, or the "officer" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Qualification {
    Task(YTaskType),
    Officer,
}

/// The special X-task name that does not block Y-task duty (case-insensitive).
pub const RITUK: &str = "Rituk";

pub fn is_rituk(task_name: &str) -> bool {
    task_name.eq_ignore_ascii_case(RITUK)
}

/// Stable identifier for a [`Worker`].
pub type WorkerId = String;

/// A worker's qualifications, interval, histories, counters, and
/// pre-computed closing dates.
///
/// Mutated only by the closing schedule calculator (precompute time) and the
/// range scheduler (assignment time) — see the crate-level docs for the
/// lifecycle and invariants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub qualifications: BTreeSet<Qualification>,
    /// Closing interval in whole weeks. `0` ⇒ does not participate in closing.
    pub closing_interval: u32,
    pub seniority: f64,
    /// Higher = more-worked, therefore lower assignment priority.
    pub score: f64,
    pub start_date: NaiveDate,

    /// Read-only during scheduling: externally fixed absences, keyed by date.
    pub x_tasks: BTreeMap<NaiveDate, String>,
    /// Grows during scheduling; at most one entry per date.
    pub y_tasks: BTreeMap<NaiveDate, YTaskType>,
    /// Ordered, unique, ascending Fridays this worker has closed.
    pub closing_history: BTreeSet<NaiveDate>,
    /// Computed by the calculator; disjoint from `optimal_closing_dates`.
    pub required_closing_dates: BTreeSet<NaiveDate>,
    /// Computed by the calculator; disjoint from `required_closing_dates`.
    pub optimal_closing_dates: BTreeSet<NaiveDate>,
    pub y_task_counts: HashMap<YTaskType, u32>,
    /// Weekends owed to the worker for closing out of turn. Never negative.
    pub weekends_home_owed: u32,
}

impl Worker {
    pub fn new(
        id: impl Into<WorkerId>,
        name: impl Into<String>,
        start_date: NaiveDate,
        closing_interval: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            qualifications: BTreeSet::new(),
            closing_interval,
            seniority: 0.0,
            score: 0.0,
            start_date,
            x_tasks: BTreeMap::new(),
            y_tasks: BTreeMap::new(),
            closing_history: BTreeSet::new(),
            required_closing_dates: BTreeSet::new(),
            optimal_closing_dates: BTreeSet::new(),
            y_task_counts: HashMap::new(),
            weekends_home_owed: 0,
        }
    }

    pub fn with_qualification(mut self, q: Qualification) -> Self {
        self.qualifications.insert(q);
        self
    }

    pub fn with_qualifications(mut self, qs: impl IntoIterator<Item = Qualification>) -> Self {
        self.qualifications.extend(qs);
        self
    }

    pub fn with_seniority(mut self, seniority: f64) -> Self {
        self.seniority = seniority;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_x_task(mut self, date: NaiveDate, task_name: impl Into<String>) -> Self {
        self.x_tasks.insert(date, task_name.into());
        self
    }

    pub fn with_closing_history(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.closing_history.extend(dates);
        self
    }

    pub fn is_qualified_for(&self, task: YTaskType) -> bool {
        self.qualifications.contains(&Qualification::Task(task))
    }

    pub fn is_officer(&self) -> bool {
        self.qualifications.contains(&Qualification::Officer)
    }

    pub fn task_qualifications(&self) -> impl Iterator<Item = YTaskType> + '_ {
        self.qualifications.iter().filter_map(|q| match q {
            Qualification::Task(t) => Some(*t),
            Qualification::Officer => None,
        })
    }

    pub fn participates_in_closing(&self) -> bool {
        self.closing_interval > 0
    }

    /// Any X-task on `date`, including `Rituk`. Used to determine forced
    /// closing weeks, which are not exempted by `Rituk`.
    pub fn has_x_task_on(&self, date: NaiveDate) -> bool {
        self.x_tasks.contains_key(&date)
    }

    /// An X-task on `date` that is not `Rituk` — this is what blocks Y-task
    /// duty and triggers the one-day post-cool-down.
    pub fn has_blocking_x_task_on(&self, date: NaiveDate) -> bool {
        self.x_tasks.get(&date).is_some_and(|t| !is_rituk(t))
    }

    /// True if any date in this worker's X-tasks falls within the Mon-Sun
    /// week anchored by `friday`.
    pub fn has_x_task_in_week_of(&self, friday: NaiveDate) -> bool {
        use crate::dates::monday_of_week;
        let monday = monday_of_week(friday);
        self.x_tasks
            .keys()
            .any(|d| monday_of_week(*d) == monday)
    }

    pub fn total_y_tasks(&self) -> u32 {
        self.y_task_counts.values().sum()
    }

    pub fn y_task_count(&self, task: YTaskType) -> u32 {
        self.y_task_counts.get(&task).copied().unwrap_or(0)
    }

    /// Records a Y-task assignment. Panics if `date` is already assigned —
    /// callers (the range scheduler) must filter duplicates before calling.
    pub(crate) fn assign_y_task(&mut self, date: NaiveDate, task: YTaskType) {
        debug_assert!(
            !self.y_tasks.contains_key(&date),
            "double Y-task assignment on the same date must be filtered before commit"
        );
        self.y_tasks.insert(date, task);
        *self.y_task_counts.entry(task).or_insert(0) += 1;
    }

    /// The only place `closing_history` grows during a scheduling run. Must
    /// be followed by re-running the calculator for this worker — see the
    /// `after_closing_assigned` hook in `crate::scheduler`.
    pub(crate) fn record_closing(&mut self, friday: NaiveDate) {
        self.closing_history.insert(friday);
    }

    /// Formats a worker's X-task map the way logs reference it externally.
    pub fn x_task_log_entries(&self) -> Vec<String> {
        self.x_tasks
            .iter()
            .map(|(d, t)| format!("{}: {}", format_ddmmyyyy(*d), t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn worker() -> Worker {
        Worker::new("w1", "Alice", d(2024, 1, 1), 3)
            .with_qualification(Qualification::Task(YTaskType::Supervisor))
    }

    #[test]
    fn qualification_lookup() {
        let w = worker();
        assert!(w.is_qualified_for(YTaskType::Supervisor));
        assert!(!w.is_qualified_for(YTaskType::CnDriver));
        assert!(!w.is_officer());
    }

    #[test]
    fn rituk_is_case_insensitive() {
        assert!(is_rituk("rituk"));
        assert!(is_rituk("RITUK"));
        assert!(!is_rituk("Guard"));
    }

    #[test]
    fn blocking_x_task_excludes_rituk() {
        let w = worker().with_x_task(d(2025, 1, 10), "Rituk");
        assert!(w.has_x_task_on(d(2025, 1, 10)));
        assert!(!w.has_blocking_x_task_on(d(2025, 1, 10)));
    }

    #[test]
    fn blocking_x_task_includes_other_types() {
        let w = worker().with_x_task(d(2025, 1, 10), "Reserves");
        assert!(w.has_blocking_x_task_on(d(2025, 1, 10)));
    }

    #[test]
    fn assign_y_task_updates_counts() {
        let mut w = worker();
        w.assign_y_task(d(2025, 1, 6), YTaskType::Supervisor);
        assert_eq!(w.y_task_count(YTaskType::Supervisor), 1);
        assert_eq!(w.total_y_tasks(), 1);
    }

    #[test]
    fn y_task_type_display_matches_vocabulary() {
        assert_eq!(YTaskType::CnDriver.to_string(), "C&N Driver");
        assert_eq!(YTaskType::from_str_opt("Southern Escort"), Some(YTaskType::SouthernEscort));
    }
}
