use chrono::{Local, Months};
use ratatui::widgets::TableState;
use tracing::warn;
use uuid::Uuid;
use workoutlog_core::{
    draft_from_input, parse_args, patch_from_input, DayKey, LogBook, LogError, LogStore,
    WorkoutLog,
};

pub enum InputMode {
    Normal,
    Adding,
    Modifying,
}

pub struct Status {
    pub text: String,
    pub is_error: bool,
}

pub struct App<S: LogStore> {
    pub book: LogBook<S>,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub status: Option<Status>,
    /// Submission key of the open add form; kept until the save succeeds.
    form_key: Option<Uuid>,
}

impl<S: LogStore> App<S> {
    pub fn new(mut book: LogBook<S>) -> App<S> {
        book.select_day(DayKey::today());
        let mut app = App {
            book,
            state: TableState::default(),
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            status: None,
            form_key: None,
        };
        app.reset_selection();
        app
    }

    pub fn selected_day(&self) -> DayKey {
        self.book.selected_day()
    }

    pub fn logs(&self) -> &[WorkoutLog] {
        self.book.selected_logs()
    }

    pub fn selected_log(&self) -> Option<&WorkoutLog> {
        self.state.selected().and_then(|i| self.logs().get(i))
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: true,
        });
    }

    fn report(&mut self, err: &LogError) {
        warn!(error = %err, "action failed");
        self.error(err.user_message());
    }

    fn reset_selection(&mut self) {
        if self.logs().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    // Calendar navigation

    pub fn go_to_day(&mut self, day: DayKey) {
        self.book.select_day(day);
        self.reset_selection();
    }

    pub fn next_day(&mut self) {
        self.go_to_day(self.selected_day().succ());
    }

    pub fn previous_day(&mut self) {
        self.go_to_day(self.selected_day().pred());
    }

    pub fn next_week(&mut self) {
        self.go_to_day(self.selected_day().add_days(7));
    }

    pub fn previous_week(&mut self) {
        self.go_to_day(self.selected_day().add_days(-7));
    }

    pub fn next_month(&mut self) {
        let date = self.selected_day().date();
        let target = date.checked_add_months(Months::new(1)).unwrap_or(date);
        self.go_to_day(DayKey::new(target));
    }

    pub fn previous_month(&mut self) {
        let date = self.selected_day().date();
        let target = date.checked_sub_months(Months::new(1)).unwrap_or(date);
        self.go_to_day(DayKey::new(target));
    }

    pub fn today(&mut self) {
        self.go_to_day(DayKey::today());
    }

    // Workout list navigation

    pub fn next(&mut self) {
        let len = self.logs().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.logs().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    // Store actions

    pub fn reload(&mut self) {
        match self.book.load() {
            Ok(count) => self.info(format!("Loaded {} workouts", count)),
            Err(e) => self.report(&e),
        }
        self.reset_selection();
    }

    pub fn delete_log(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        let Some(log) = self.logs().get(i).cloned() else {
            return;
        };
        match self.book.delete(&log.id, log.day()) {
            Ok(Some(removed)) => self.info(format!("Deleted {}", removed.name)),
            Ok(None) => {}
            Err(e) => self.report(&e),
        }

        // Adjust selection after delete
        let len = self.logs().len();
        if len == 0 {
            self.state.select(None);
        } else if i >= len {
            self.state.select(Some(len - 1));
        }
    }

    // Input line

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.form_key = Some(Uuid::new_v4());
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn enter_modify_mode(&mut self) {
        if self.selected_log().is_some() {
            self.input_mode = InputMode::Modifying;
            self.input.clear();
            self.cursor_position = 0;
        }
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.form_key = None;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input.chars().take(chars).map(|c| c.len_utf8()).sum()
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Text before the cursor, for placing the terminal cursor.
    pub fn input_before_cursor(&self) -> &str {
        &self.input[..self.byte_index(self.cursor_position)]
    }

    pub fn submit_command(&mut self) {
        if self.input.trim().is_empty() {
            self.exit_input_mode();
            return;
        }

        let done = match self.input_mode {
            InputMode::Adding => self.submit_add(),
            InputMode::Modifying => self.submit_modify(),
            InputMode::Normal => true,
        };

        // A failed save keeps the form open so it can be retried as is.
        if done {
            self.input.clear();
            self.cursor_position = 0;
            self.exit_input_mode();
        }
    }

    fn submit_add(&mut self) -> bool {
        let args: Vec<String> = self.input.split_whitespace().map(|s| s.to_string()).collect();
        let now = self
            .selected_day()
            .date()
            .and_time(Local::now().time());
        let mut draft = match draft_from_input(parse_args(&args), now) {
            Ok(draft) => draft,
            Err(e) => {
                self.error(e.to_string());
                return false;
            }
        };
        if let Some(key) = self.form_key {
            draft.submission_key = key;
        }

        match self.book.add(draft) {
            Ok(created) => {
                let day = created.day();
                self.go_to_day(day);
                if let Some(pos) = self.logs().iter().position(|l| l.id == created.id) {
                    self.state.select(Some(pos));
                }
                self.info(format!("Logged {} on {}", created.name, day));
                true
            }
            Err(e @ LogError::DuplicateSubmission(_)) => {
                self.report(&e);
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    fn submit_modify(&mut self) -> bool {
        let Some(id) = self.selected_log().map(|l| l.id.clone()) else {
            return true;
        };
        let args: Vec<String> = self.input.split_whitespace().map(|s| s.to_string()).collect();
        let patch = match patch_from_input(parse_args(&args)) {
            Ok(patch) => patch,
            Err(e) => {
                self.error(e.to_string());
                return false;
            }
        };
        match self.book.update(&id, patch) {
            Ok(updated) => {
                self.info(format!("Updated {}", updated.name));
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Days of the displayed month that have workouts.
    pub fn busy_days(&self) -> Vec<DayKey> {
        let day = self.selected_day();
        self.book
            .index()
            .map(|index| index.days_in_month(day.year(), day.month()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::{Cell, RefCell};
    use std::io;
    use workoutlog_core::{
        LogId, NewWorkoutLog, StoreError, UserId, WorkoutLogPatch,
    };

    #[derive(Default)]
    struct MemoryStore {
        logs: RefCell<Vec<WorkoutLog>>,
        fail: Cell<bool>,
    }

    impl MemoryStore {
        fn check(&self) -> Result<(), StoreError> {
            if self.fail.get() {
                Err(StoreError::Io(io::Error::other("offline")))
            } else {
                Ok(())
            }
        }
    }

    impl LogStore for MemoryStore {
        fn fetch_all(&self, _user: &UserId) -> Result<Vec<WorkoutLog>, StoreError> {
            self.check()?;
            Ok(self.logs.borrow().clone())
        }

        fn create(&self, _user: &UserId, log: &NewWorkoutLog) -> Result<WorkoutLog, StoreError> {
            self.check()?;
            let created = WorkoutLog {
                id: LogId::new(format!("log-{}", self.logs.borrow().len() + 1)),
                name: log.name.clone(),
                date: log.date,
                duration: log.duration,
                calories: log.calories,
                notes: log.notes.clone(),
                created_at: Utc::now(),
            };
            self.logs.borrow_mut().push(created.clone());
            Ok(created)
        }

        fn update(&self, id: &LogId, patch: &WorkoutLogPatch) -> Result<(), StoreError> {
            self.check()?;
            if let Some(log) = self.logs.borrow_mut().iter_mut().find(|l| &l.id == id) {
                patch.apply_to(log);
            }
            Ok(())
        }

        fn delete(&self, id: &LogId) -> Result<(), StoreError> {
            self.check()?;
            self.logs.borrow_mut().retain(|l| &l.id != id);
            Ok(())
        }
    }

    fn app() -> App<MemoryStore> {
        let mut book = LogBook::new(MemoryStore::default(), UserId::new("u1"));
        book.load().unwrap();
        App::new(book)
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            app.input_char(c);
        }
    }

    #[test]
    fn test_add_logs_on_selected_day() {
        let mut app = app();
        app.previous_day();
        let day = app.selected_day();

        app.enter_add_mode();
        type_text(&mut app, "Run dur:30 cal:250");
        app.submit_command();

        assert!(matches!(app.input_mode, InputMode::Normal));
        assert_eq!(app.logs().len(), 1);
        assert_eq!(app.logs()[0].day(), day);
        assert_eq!(app.selected_log().map(|l| l.duration), Some(30));
    }

    #[test]
    fn test_failed_add_keeps_form_for_retry() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, "Swim");

        app.book.store().fail.set(true);
        app.submit_command();
        assert!(matches!(app.input_mode, InputMode::Adding));
        assert!(app.status.as_ref().map(|s| s.is_error).unwrap_or(false));
        assert!(app.logs().is_empty());

        app.book.store().fail.set(false);
        app.submit_command();
        assert!(matches!(app.input_mode, InputMode::Normal));
        assert_eq!(app.logs().len(), 1);
    }

    #[test]
    fn test_modify_and_delete_selected() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, "Bike dur:40");
        app.submit_command();

        app.enter_modify_mode();
        type_text(&mut app, "cal:500");
        app.submit_command();
        assert_eq!(app.selected_log().map(|l| l.calories), Some(500));
        assert_eq!(app.selected_log().map(|l| l.duration), Some(40));

        app.delete_log();
        assert!(app.logs().is_empty());
        assert_eq!(app.state.selected(), None);
        assert!(app.busy_days().is_empty());
    }

    #[test]
    fn test_cursor_editing_handles_multibyte() {
        let mut app = app();
        app.enter_add_mode();
        type_text(&mut app, "Café");
        app.move_cursor_left();
        app.delete_char();
        assert_eq!(app.input, "Caé");
        assert_eq!(app.input_before_cursor(), "Ca");
    }

    #[test]
    fn test_week_navigation() {
        let mut app = app();
        let start = app.selected_day();
        app.next_week();
        assert_eq!(app.selected_day(), start.add_days(7));
        app.previous_week();
        app.previous_day();
        assert_eq!(app.selected_day(), start.pred());
    }
}
