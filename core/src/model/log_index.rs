use std::collections::BTreeMap;

use tracing::debug;

use crate::error::IndexError;
use crate::model::day_key::DayKey;
use crate::model::workout_log::{LogId, WorkoutLog, WorkoutLogPatch};

/// Workout logs grouped by the day they happened on.
///
/// Each bucket keeps insertion order and is never empty: removing the last
/// log of a day removes the day. The index is a cache over the log store and
/// can always be rebuilt from a full fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogIndex {
    days: BTreeMap<DayKey, Vec<WorkoutLog>>,
}

/// Minutes and kilocalories logged on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTotals {
    pub sessions: usize,
    pub minutes: u64,
    pub calories: u64,
}

impl LogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<I>(logs: I) -> Self
    where
        I: IntoIterator<Item = WorkoutLog>,
    {
        let mut index = Self::new();
        for log in logs {
            index.days.entry(log.day()).or_default().push(log);
        }
        index
    }

    pub fn lookup(&self, day: DayKey) -> &[WorkoutLog] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, log: WorkoutLog) {
        let day = log.day();
        debug!(id = %log.id, %day, "index insert");
        self.days.entry(day).or_default().push(log);
    }

    /// Applies `patch` to the log `id` in the bucket of `day`, keeping its
    /// position.
    pub fn update(
        &mut self,
        day: DayKey,
        id: &LogId,
        patch: &WorkoutLogPatch,
    ) -> Result<&WorkoutLog, IndexError> {
        let log = self
            .days
            .get_mut(&day)
            .and_then(|bucket| bucket.iter_mut().find(|log| &log.id == id))
            .ok_or_else(|| IndexError::NotFound(id.clone()))?;
        patch.apply_to(log);
        debug!(%id, %day, "index update");
        Ok(log)
    }

    pub fn delete(&mut self, day: DayKey, id: &LogId) -> Option<WorkoutLog> {
        let bucket = self.days.get_mut(&day)?;
        let pos = bucket.iter().position(|log| &log.id == id)?;
        let removed = bucket.remove(pos);
        if bucket.is_empty() {
            self.days.remove(&day);
        }
        debug!(%id, %day, "index delete");
        Some(removed)
    }

    pub fn find(&self, id: &LogId) -> Option<&WorkoutLog> {
        self.days
            .values()
            .flat_map(|bucket| bucket.iter())
            .find(|log| &log.id == id)
    }

    pub fn contains_day(&self, day: DayKey) -> bool {
        self.days.contains_key(&day)
    }

    /// Days that have at least one log, oldest first.
    pub fn days(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.days.keys().copied()
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> Vec<DayKey> {
        self.days()
            .filter(|day| day.year() == year && day.month() == month)
            .collect()
    }

    pub fn day_totals(&self, day: DayKey) -> DayTotals {
        let bucket = self.lookup(day);
        DayTotals {
            sessions: bucket.len(),
            minutes: bucket.iter().map(|log| u64::from(log.duration)).sum(),
            calories: bucket.iter().map(|log| u64::from(log.calories)).sum(),
        }
    }

    /// All buckets in day order.
    pub fn iter(&self) -> impl Iterator<Item = (DayKey, &[WorkoutLog])> {
        self.days.iter().map(|(day, bucket)| (*day, bucket.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn log(id: &str, y: i32, m: u32, d: u32, duration: u32, calories: u32) -> WorkoutLog {
        WorkoutLog {
            id: LogId::new(id),
            name: format!("workout {}", id),
            date: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap(),
            duration,
            calories,
            notes: String::new(),
            created_at: Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::from_ymd(y, m, d).unwrap()
    }

    fn sample() -> LogIndex {
        LogIndex::build(vec![
            log("1", 2024, 5, 1, 30, 200),
            log("2", 2024, 5, 1, 45, 300),
            log("3", 2024, 5, 2, 20, 100),
        ])
    }

    fn ids(logs: &[WorkoutLog]) -> Vec<&str> {
        logs.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_build_groups_by_day() {
        let index = sample();
        assert_eq!(ids(index.lookup(day(2024, 5, 1))), vec!["1", "2"]);
        assert_eq!(ids(index.lookup(day(2024, 5, 2))), vec!["3"]);
        assert!(index.lookup(day(2024, 5, 3)).is_empty());
    }

    #[test]
    fn test_build_places_every_log_exactly_once() {
        let logs = vec![
            log("a", 2024, 1, 31, 10, 10),
            log("b", 2024, 2, 1, 10, 10),
            log("c", 2024, 1, 31, 10, 10),
            log("d", 2023, 12, 31, 10, 10),
        ];
        let index = LogIndex::build(logs.clone());
        assert_eq!(index.len(), logs.len());
        for l in &logs {
            let holders: Vec<DayKey> = index
                .iter()
                .filter(|(_, bucket)| bucket.iter().any(|x| x.id == l.id))
                .map(|(d, _)| d)
                .collect();
            assert_eq!(holders, vec![l.day()]);
        }
        // supplied order is kept inside a bucket
        assert_eq!(ids(index.lookup(day(2024, 1, 31))), vec!["a", "c"]);
    }

    #[test]
    fn test_delete_last_removes_day() {
        let mut index = sample();
        let removed = index.delete(day(2024, 5, 2), &LogId::new("3"));
        assert_eq!(removed.map(|l| l.id), Some(LogId::new("3")));
        assert!(!index.contains_day(day(2024, 5, 2)));
        assert_eq!(index.days().collect::<Vec<_>>(), vec![day(2024, 5, 1)]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut index = sample();
        let before = index.clone();
        assert!(index.delete(day(2024, 5, 1), &LogId::new("3")).is_none());
        assert!(index.delete(day(2024, 6, 1), &LogId::new("1")).is_none());
        assert_eq!(index, before);
    }

    #[test]
    fn test_insert_then_delete_restores_index() {
        let mut index = sample();
        let before = index.clone();

        index.insert(log("4", 2024, 5, 3, 15, 90));
        assert_eq!(ids(index.lookup(day(2024, 5, 3))), vec!["4"]);
        index.delete(day(2024, 5, 3), &LogId::new("4"));
        assert_eq!(index, before);

        index.insert(log("5", 2024, 5, 1, 15, 90));
        assert_eq!(ids(index.lookup(day(2024, 5, 1))), vec!["1", "2", "5"]);
        index.delete(day(2024, 5, 1), &LogId::new("5"));
        assert_eq!(index, before);
    }

    #[test]
    fn test_insert_is_not_idempotent() {
        let mut index = LogIndex::new();
        index.insert(log("1", 2024, 5, 1, 30, 200));
        index.insert(log("1", 2024, 5, 1, 30, 200));
        assert_eq!(index.lookup(day(2024, 5, 1)).len(), 2);
    }

    #[test]
    fn test_update_changes_only_target() {
        let mut index = sample();
        let patch = WorkoutLogPatch {
            duration: Some(60),
            ..Default::default()
        };
        let updated = index.update(day(2024, 5, 1), &LogId::new("1"), &patch).unwrap();
        assert_eq!(updated.duration, 60);

        let bucket = index.lookup(day(2024, 5, 1));
        assert_eq!(ids(bucket), vec!["1", "2"]);
        assert_eq!(bucket[0].duration, 60);
        assert_eq!(bucket[0].calories, 200);
        assert_eq!(bucket[1], log("2", 2024, 5, 1, 45, 300));
    }

    #[test]
    fn test_update_wrong_bucket_is_not_found() {
        let mut index = sample();
        let before = index.clone();
        let patch = WorkoutLogPatch {
            calories: Some(1),
            ..Default::default()
        };
        let err = index
            .update(day(2024, 5, 2), &LogId::new("1"), &patch)
            .unwrap_err();
        assert_eq!(err, IndexError::NotFound(LogId::new("1")));
        assert_eq!(index, before);
    }

    #[test]
    fn test_totals_and_month_days() {
        let mut index = sample();
        index.insert(log("4", 2024, 6, 1, 10, 50));
        assert_eq!(
            index.day_totals(day(2024, 5, 1)),
            DayTotals {
                sessions: 2,
                minutes: 75,
                calories: 500
            }
        );
        assert_eq!(index.day_totals(day(2024, 5, 9)), DayTotals::default());
        assert_eq!(
            index.days_in_month(2024, 5),
            vec![day(2024, 5, 1), day(2024, 5, 2)]
        );
        assert_eq!(
            index.find(&LogId::new("3")).map(|l| l.day()),
            Some(day(2024, 5, 2))
        );
    }
}
