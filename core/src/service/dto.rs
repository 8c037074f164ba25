use serde::{Deserialize, Serialize};

use crate::model::day_key::DayKey;
use crate::model::log_index::LogIndex;
use crate::model::workout_log::WorkoutLog;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: DayKey,
    pub day_of_week: String, // Mon, Tue...
    pub logs: Vec<WorkoutLog>,
    pub total_minutes: u64,
    pub total_calories: u64,
}

impl DaySummary {
    pub fn from_index(index: &LogIndex, day: DayKey) -> Self {
        let totals = index.day_totals(day);
        Self {
            date: day,
            day_of_week: day.date().format("%a").to_string(),
            logs: index.lookup(day).to_vec(),
            total_minutes: totals.minutes,
            total_calories: totals.calories,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeeklyHistory {
    pub year: i32,
    pub week: u32,
    pub days: Vec<DaySummary>,
    pub total_minutes: u64,
    pub total_calories: u64,
}
