//! Per-project time aggregation.
//!
//! # Algorithm Summary
//!
//! 1. Derive intervals from consecutive events (see [`crate::interval`])
//! 2. Group them by name and sum durations into [`ProjectTimes`]
//! 3. Optionally fold the ongoing interval into its project's bucket
//! 4. Partition the bucket sum into included and excluded totals
//!
//! Each bucket goes wholly to one side of the partition, so
//! `included + excluded` always equals the sum of all buckets.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::event::{Named, Record};
use crate::interval::{Interval, IntervalsByName, derive_intervals, group_by_name};
use crate::ongoing::{OngoingInterval, ongoing_interval};
use crate::types::{LUNCH, STOP, Seconds};

/// Project names whose time is reported separately from the work total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExcludeSet(BTreeSet<String>);

impl ExcludeSet {
    /// Builds a set from any list of names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// The reserved bookkeeping names, `STOP` and `LUNCH`.
    pub fn reserved() -> Self {
        Self::new([STOP, LUNCH])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Work and bookkeeping totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Time in buckets not in the exclusion set.
    pub included: Seconds,
    /// Time in excluded buckets.
    pub excluded: Seconds,
}

/// Accumulated time per project name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectTimes(BTreeMap<String, Seconds>);

impl ProjectTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sums interval durations per name.
    pub fn sum_by_project(grouped: &IntervalsByName) -> Self {
        Self(
            grouped
                .iter()
                .map(|(name, intervals)| {
                    (name.clone(), intervals.iter().map(Interval::duration).sum())
                })
                .collect(),
        )
    }

    /// Key-wise sum over the union of both key sets.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let mut combined = self.clone();
        for (name, seconds) in &other.0 {
            combined.add_time(name, *seconds);
        }
        combined
    }

    /// Adds `seconds` to one bucket, creating it if needed.
    pub fn add_time(&mut self, name: &str, seconds: Seconds) {
        *self.0.entry(name.to_string()).or_default() += seconds;
    }

    /// Partitions the bucket sum by membership in `exclude`.
    pub fn total_time(&self, exclude: &ExcludeSet) -> Totals {
        self.0
            .iter()
            .fold(Totals::default(), |mut totals, (name, seconds)| {
                if exclude.contains(name) {
                    totals.excluded += *seconds;
                } else {
                    totals.included += *seconds;
                }
                totals
            })
    }

    /// Copy without the excluded buckets.
    #[must_use]
    pub fn without(&self, exclude: &ExcludeSet) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(name, _)| !exclude.contains(name))
                .map(|(name, seconds)| (name.clone(), *seconds))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<Seconds> {
        self.0.get(name).copied()
    }

    /// Buckets ordered by descending time, ties by name.
    pub fn sorted_by_time(&self) -> Vec<(&str, Seconds)> {
        let mut entries: Vec<_> = self
            .0
            .iter()
            .map(|(name, seconds)| (name.as_str(), *seconds))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Seconds)> {
        self.0.iter().map(|(name, seconds)| (name.as_str(), *seconds))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Seconds)> for ProjectTimes {
    fn from_iter<I: IntoIterator<Item = (String, Seconds)>>(iter: I) -> Self {
        let mut times = Self::new();
        for (name, seconds) in iter {
            times.add_time(&name, seconds);
        }
        times
    }
}

/// Everything computed for one day of project events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub intervals: Vec<Interval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ongoing: Option<OngoingInterval>,
    pub project_times: ProjectTimes,
    pub totals: Totals,
}

/// Computes intervals, per-project times and totals for a sorted day.
///
/// With `now`, the ongoing interval (if any) is folded into its project and
/// the totals. Without it, only closed intervals count.
pub fn summarize_day<E: Record + Named>(
    events: &[E],
    exclude: &ExcludeSet,
    now: Option<NaiveDateTime>,
) -> DaySummary {
    let intervals = derive_intervals(events);
    let grouped = group_by_name(intervals.iter().cloned());
    let mut project_times = ProjectTimes::sum_by_project(&grouped);

    let ongoing = now.and_then(|now| ongoing_interval(events, now));
    if let Some(ongoing) = &ongoing {
        project_times.add_time(&ongoing.name, ongoing.duration);
    }

    let totals = project_times.total_time(exclude);
    DaySummary {
        intervals,
        ongoing,
        project_times,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::event::Project;
    use crate::types::EventName;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn project(h: u32, m: u32, name: &str) -> Project {
        Project::new(at(h, m), EventName::new(name).unwrap())
    }

    fn times(entries: &[(&str, i64)]) -> ProjectTimes {
        entries
            .iter()
            .map(|(name, s)| ((*name).to_string(), Seconds::new(*s)))
            .collect()
    }

    #[test]
    fn empty_day_is_all_zero() {
        let summary = summarize_day::<Project>(&[], &ExcludeSet::reserved(), Some(at(12, 0)));
        assert!(summary.project_times.is_empty());
        assert_eq!(summary.totals, Totals::default());
        assert!(summary.ongoing.is_none());
    }

    #[test]
    fn combine_sums_union_of_keys() {
        let a = times(&[("Work", 100), ("LUNCH", 50)]);
        let b = times(&[("Work", 20), ("Review", 7)]);
        let combined = a.combine(&b);
        assert_eq!(combined, times(&[("Work", 120), ("LUNCH", 50), ("Review", 7)]));
    }

    #[test]
    fn add_time_initializes_bucket() {
        let mut t = ProjectTimes::new();
        t.add_time("Work", Seconds::new(10));
        t.add_time("Work", Seconds::new(5));
        assert_eq!(t.get("Work"), Some(Seconds::new(15)));
        assert_eq!(t.get("Other"), None);
    }

    #[test]
    fn totals_partition_exactly() {
        let t = times(&[("Work", 1000), ("STOP", 30), ("LUNCH", 600), ("Review", 45)]);
        for exclude in [
            ExcludeSet::reserved(),
            ExcludeSet::default(),
            ExcludeSet::new(["Work", "Review", "STOP", "LUNCH"]),
            ExcludeSet::new(["Unknown"]),
        ] {
            let totals = t.total_time(&exclude);
            let all: Seconds = t.iter().map(|(_, s)| s).sum();
            assert_eq!(totals.included + totals.excluded, all);
        }
        let totals = t.total_time(&ExcludeSet::reserved());
        assert_eq!(totals.included, Seconds::new(1045));
        assert_eq!(totals.excluded, Seconds::new(630));
    }

    #[test]
    fn full_day_with_ongoing_fold() {
        let events = [
            project(9, 0, "Work"),
            project(9, 30, "Coding"),
            project(12, 30, "LUNCH"),
            project(13, 30, "Coding"),
        ];
        let summary = summarize_day(&events, &ExcludeSet::reserved(), Some(at(14, 0)));

        assert_eq!(summary.intervals.len(), 3);
        assert_eq!(summary.project_times.get("Work"), Some(Seconds::new(1800)));
        assert_eq!(summary.project_times.get("Coding"), Some(Seconds::new(12_600)));
        assert_eq!(summary.project_times.get("LUNCH"), Some(Seconds::new(3600)));
        assert_eq!(summary.totals.included, Seconds::new(14_400));
        assert_eq!(summary.totals.excluded, Seconds::new(3600));

        let ongoing = summary.ongoing.unwrap();
        assert_eq!(ongoing.name, "Coding");
        assert_eq!(ongoing.duration, Seconds::new(1800));
    }

    #[test]
    fn historical_mode_ignores_open_interval() {
        let events = [project(9, 0, "Work"), project(10, 0, "Review")];
        let summary = summarize_day(&events, &ExcludeSet::reserved(), None);
        assert!(summary.ongoing.is_none());
        assert_eq!(summary.project_times.get("Review"), None);
        assert_eq!(summary.totals.included, Seconds::new(3600));
    }

    #[test]
    fn stop_closes_the_day() {
        let events = [
            project(9, 0, "Work"),
            project(12, 0, "LUNCH"),
            project(13, 0, "Work"),
            project(17, 0, "STOP"),
        ];
        let summary = summarize_day(&events, &ExcludeSet::reserved(), Some(at(20, 0)));
        assert!(summary.ongoing.is_none());
        assert_eq!(summary.project_times.get("Work"), Some(Seconds::new(7 * 3600)));
        assert_eq!(summary.project_times.get("STOP"), None);
        assert_eq!(summary.totals.included, Seconds::new(7 * 3600));
        assert_eq!(summary.totals.excluded, Seconds::new(3600));
    }

    #[test]
    fn ongoing_excluded_project_counts_as_excluded() {
        let events = [project(9, 0, "Work"), project(12, 0, "LUNCH")];
        let summary = summarize_day(&events, &ExcludeSet::reserved(), Some(at(12, 20)));
        assert_eq!(summary.totals.included, Seconds::new(3 * 3600));
        assert_eq!(summary.totals.excluded, Seconds::new(1200));
    }

    #[test]
    fn without_drops_excluded_buckets() {
        let t = times(&[("Work", 10), ("LUNCH", 5), ("STOP", 1)]);
        assert_eq!(t.without(&ExcludeSet::reserved()), times(&[("Work", 10)]));
    }

    #[test]
    fn sorted_by_time_descends() {
        let t = times(&[("A", 10), ("B", 30), ("C", 10)]);
        assert_eq!(
            t.sorted_by_time(),
            vec![
                ("B", Seconds::new(30)),
                ("A", Seconds::new(10)),
                ("C", Seconds::new(10))
            ]
        );
    }
}
