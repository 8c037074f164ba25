use std::collections::HashMap;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{LogError, StoreError, StoreResult};
use crate::model::day_key::DayKey;
use crate::model::log_index::LogIndex;
use crate::model::workout_log::{LogId, NewWorkoutLog, UserId, WorkoutLog, WorkoutLogPatch};
use crate::repository::LogStore;

#[derive(Debug, Clone, PartialEq)]
pub enum LogBookState {
    /// A fetch is outstanding; reads see nothing.
    Loading,
    /// Last successful fetch plus the writes applied since.
    Ready(LogIndex),
}

/// Identifies one load. Results carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    Stale,
}

/// The workout logs of one user, kept in sync with a [`LogStore`].
///
/// Every write goes to the store first; the local index changes only once
/// the store has accepted it, so a failed write leaves the index as it was.
pub struct LogBook<S: LogStore> {
    store: S,
    user: UserId,
    state: LogBookState,
    generation: u64,
    /// submission key -> id the store assigned
    submitted: HashMap<Uuid, LogId>,
    selected_day: DayKey,
    selected: Vec<WorkoutLog>,
}

fn remote_failure(op: &'static str, err: StoreError) -> LogError {
    warn!(op, error = %err, "log store call failed");
    LogError::Store(err)
}

impl<S: LogStore> LogBook<S> {
    pub fn new(store: S, user: UserId) -> Self {
        Self {
            store,
            user,
            state: LogBookState::Loading,
            generation: 0,
            submitted: HashMap::new(),
            selected_day: DayKey::today(),
            selected: Vec::new(),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> &LogBookState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LogBookState::Ready(_))
    }

    pub fn index(&self) -> Option<&LogIndex> {
        match &self.state {
            LogBookState::Ready(index) => Some(index),
            LogBookState::Loading => None,
        }
    }

    fn ready_index(&self) -> Result<&LogIndex, LogError> {
        self.index().ok_or(LogError::NotReady)
    }

    fn ready_index_mut(&mut self) -> Result<&mut LogIndex, LogError> {
        match &mut self.state {
            LogBookState::Ready(index) => Ok(index),
            LogBookState::Loading => Err(LogError::NotReady),
        }
    }

    // Loading

    /// Enters `Loading`, discarding the current index and the keys of
    /// earlier submissions. An add form is single-use, so a key only has to
    /// outlive the index it was written into.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LogBookState::Loading;
        self.selected.clear();
        self.submitted.clear();
        LoadTicket(self.generation)
    }

    /// Applies the result of the load identified by `ticket`. Results of a
    /// superseded load are dropped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: StoreResult<Vec<WorkoutLog>>,
    ) -> Result<LoadOutcome, LogError> {
        if ticket.0 != self.generation {
            warn!(ticket = ticket.0, current = self.generation, "dropping stale load");
            return Ok(LoadOutcome::Stale);
        }
        let logs = result.map_err(|e| remote_failure("fetch_all", e))?;
        Ok(LoadOutcome::Applied {
            count: self.apply_load(logs),
        })
    }

    /// Full reload from the store. Nothing can begin another load while
    /// this one runs, so the result is always applied.
    pub fn load(&mut self) -> Result<usize, LogError> {
        self.begin_load();
        let logs = self
            .store
            .fetch_all(&self.user)
            .map_err(|e| remote_failure("fetch_all", e))?;
        Ok(self.apply_load(logs))
    }

    /// Orders logs by creation time, then id, and builds the index from them.
    fn apply_load(&mut self, mut logs: Vec<WorkoutLog>) -> usize {
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let count = logs.len();
        self.state = LogBookState::Ready(LogIndex::build(logs));
        self.refresh_selected();
        info!(user = %self.user, count, "log book ready");
        count
    }

    // Reads

    pub fn lookup(&self, day: DayKey) -> &[WorkoutLog] {
        self.index().map(|index| index.lookup(day)).unwrap_or(&[])
    }

    pub fn select_day(&mut self, day: DayKey) {
        self.selected_day = day;
        self.refresh_selected();
    }

    pub fn selected_day(&self) -> DayKey {
        self.selected_day
    }

    /// Cached logs of the selected day.
    pub fn selected_logs(&self) -> &[WorkoutLog] {
        &self.selected
    }

    fn refresh_selected(&mut self) {
        self.selected = self.lookup(self.selected_day).to_vec();
    }

    fn refresh_selected_if(&mut self, day: DayKey) {
        if day == self.selected_day {
            self.refresh_selected();
        }
    }

    // Writes

    pub fn add(&mut self, draft: NewWorkoutLog) -> Result<WorkoutLog, LogError> {
        draft.validate()?;
        self.ready_index()?;
        if let Some(id) = self.submitted.get(&draft.submission_key) {
            warn!(%id, "ignoring repeated submit");
            return Err(LogError::DuplicateSubmission(id.clone()));
        }

        let created = self
            .store
            .create(&self.user, &draft)
            .map_err(|e| remote_failure("create", e))?;
        self.submitted
            .insert(draft.submission_key, created.id.clone());

        let day = created.day();
        self.ready_index_mut()?.insert(created.clone());
        self.refresh_selected_if(day);
        Ok(created)
    }

    pub fn update(&mut self, id: &LogId, patch: WorkoutLogPatch) -> Result<WorkoutLog, LogError> {
        patch.validate()?;
        let day = self
            .ready_index()?
            .find(id)
            .map(WorkoutLog::day)
            .ok_or_else(|| LogError::NotFound(id.clone()))?;

        if !patch.is_empty() {
            self.store
                .update(id, &patch)
                .map_err(|e| remote_failure("update", e))?;
        }

        let updated = self.ready_index_mut()?.update(day, id, &patch)?.clone();
        self.refresh_selected_if(day);
        Ok(updated)
    }

    /// Deletes `id` from `day`. An id that is not in that day's bucket is a
    /// no-op and never reaches the store.
    pub fn delete(&mut self, id: &LogId, day: DayKey) -> Result<Option<WorkoutLog>, LogError> {
        let present = self.ready_index()?.lookup(day).iter().any(|log| &log.id == id);
        if !present {
            debug!(%id, %day, "delete of absent log ignored");
            return Ok(None);
        }

        self.store
            .delete(id)
            .map_err(|e| remote_failure("delete", e))?;

        let removed = self.ready_index_mut()?.delete(day, id);
        self.refresh_selected_if(day);
        Ok(removed)
    }
}
