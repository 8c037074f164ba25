use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use workoutlog_core::{HistoryUseCase, LogIndex};

use crate::short_id;

// Helper struct for Table Row
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Workout")]
    name: String,
    #[tabled(rename = "Min")]
    minutes: String,
    #[tabled(rename = "kcal")]
    calories: String,
}

pub fn show_history(index: &LogIndex) {
    let history = HistoryUseCase::new(index).weekly_history();
    if history.is_empty() {
        println!("No workouts logged yet.");
        return;
    }

    for week in history {
        println!(
            "\n\x1b[1;36mWeek {}, {}\x1b[0m ({} min, {} kcal)",
            week.week, week.year, week.total_minutes, week.total_calories
        );

        let mut rows = Vec::new();
        for day in &week.days {
            // 2024-05-01 (Wed)
            // 75 min 500 kcal
            let day_header = format!(
                "{} ({})\n{} min {} kcal",
                day.date, day.day_of_week, day.total_minutes, day.total_calories
            );

            for (i, log) in day.logs.iter().enumerate() {
                // Date column: Only show on first row of the day group
                let date_col = if i == 0 {
                    day_header.clone()
                } else {
                    String::new()
                };

                rows.push(HistoryRow {
                    date: date_col,
                    id: short_id(&log.id).to_string(),
                    name: log.name.clone(),
                    minutes: log.duration.to_string(),
                    calories: log.calories.to_string(),
                });
            }
        }

        let mut table = Table::new(rows);
        table
            .with(Style::modern())
            .with(Modify::new(Rows::first()).with(Color::FG_CYAN)); // Header color

        println!("{}", table);
    }
}
