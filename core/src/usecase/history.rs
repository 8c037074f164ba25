use std::collections::BTreeMap;

use chrono::Datelike;

use crate::model::day_key::DayKey;
use crate::model::log_index::LogIndex;
use crate::service::dto::{DaySummary, WeeklyHistory};

pub struct HistoryUseCase<'a> {
    index: &'a LogIndex,
}

impl<'a> HistoryUseCase<'a> {
    pub fn new(index: &'a LogIndex) -> Self {
        Self { index }
    }

    /// Logged days grouped by ISO week, newest week first and newest day
    /// first inside each week.
    pub fn weekly_history(&self) -> Vec<WeeklyHistory> {
        let mut weeks: BTreeMap<(i32, u32), Vec<DayKey>> = BTreeMap::new();
        for day in self.index.days() {
            let iso = day.date().iso_week();
            weeks.entry((iso.year(), iso.week())).or_default().push(day);
        }

        weeks
            .into_iter()
            .rev()
            .map(|((year, week), days)| {
                let days: Vec<DaySummary> = days
                    .into_iter()
                    .rev()
                    .map(|day| DaySummary::from_index(self.index, day))
                    .collect();
                WeeklyHistory {
                    year,
                    week,
                    total_minutes: days.iter().map(|d| d.total_minutes).sum(),
                    total_calories: days.iter().map(|d| d.total_calories).sum(),
                    days,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::workout_log::{LogId, WorkoutLog};
    use chrono::{NaiveDate, Utc};

    fn log(id: &str, y: i32, m: u32, d: u32, duration: u32, calories: u32) -> WorkoutLog {
        WorkoutLog {
            id: LogId::new(id),
            name: "Run".to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(6, 30, 0)
                .unwrap(),
            duration,
            calories,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_weekly_history_groups_by_iso_week() {
        // 2024-04-29 is a Monday; 2024-05-06 starts the next ISO week
        let index = LogIndex::build(vec![
            log("1", 2024, 4, 29, 30, 200),
            log("2", 2024, 5, 1, 45, 300),
            log("3", 2024, 5, 1, 15, 100),
            log("4", 2024, 5, 6, 20, 150),
        ]);
        let history = HistoryUseCase::new(&index).weekly_history();

        assert_eq!(history.len(), 2);
        assert_eq!((history[0].year, history[0].week), (2024, 19));
        assert_eq!(history[0].total_minutes, 20);

        let week18 = &history[1];
        assert_eq!((week18.year, week18.week), (2024, 18));
        assert_eq!(week18.total_minutes, 90);
        assert_eq!(week18.total_calories, 600);
        assert_eq!(week18.days[0].date, DayKey::from_ymd(2024, 5, 1).unwrap());
        assert_eq!(week18.days[0].day_of_week, "Wed");
        assert_eq!(week18.days[0].logs.len(), 2);
        assert_eq!(week18.days[1].date, DayKey::from_ymd(2024, 4, 29).unwrap());
    }

    #[test]
    fn test_empty_index_has_no_history() {
        let index = LogIndex::new();
        assert!(HistoryUseCase::new(&index).weekly_history().is_empty());
    }
}
