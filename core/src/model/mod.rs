pub mod day_key;
pub mod log_index;
pub mod profile;
pub mod workout_log;
