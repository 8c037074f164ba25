use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::workout_log::{LogId, NewWorkoutLog, UserId, WorkoutLog, WorkoutLogPatch};
use crate::repository::json_file::JsonFile;
use crate::repository::traits::LogStore;

const DEFAULT_FILE_NAME: &str = "workout_logs.json";

/// A stored document: an id plus an untyped payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// Log store persisting documents to `workout_logs.json` in the data
/// directory.
#[derive(Debug, Clone)]
pub struct FileLogStore {
    file: JsonFile,
}

impl FileLogStore {
    pub fn new(base_dir: Option<PathBuf>) -> StoreResult<Self> {
        let file = JsonFile::open(base_dir, DEFAULT_FILE_NAME)?;
        debug!(path = %file.path().display(), "opened log store");
        Ok(FileLogStore { file })
    }

    fn read_documents(&self) -> StoreResult<Vec<StoredDocument>> {
        self.file.read()
    }

    fn write_documents(&self, docs: &[StoredDocument]) -> StoreResult<()> {
        self.file.write(docs)
    }
}

impl LogStore for FileLogStore {
    fn fetch_all(&self, user: &UserId) -> StoreResult<Vec<WorkoutLog>> {
        let docs = self.read_documents()?;
        let logs = docs
            .iter()
            .filter(|doc| WorkoutLog::document_owner(&doc.data) == Some(user.as_str()))
            .map(|doc| WorkoutLog::from_document(&doc.id, &doc.data).map_err(StoreError::from))
            .collect::<StoreResult<Vec<_>>>()?;
        info!(%user, count = logs.len(), "fetched workout logs");
        Ok(logs)
    }

    fn create(&self, user: &UserId, log: &NewWorkoutLog) -> StoreResult<WorkoutLog> {
        let mut docs = self.read_documents()?;
        let id = Uuid::new_v4().to_string();
        let data = log.to_document(user, Utc::now());
        let created = WorkoutLog::from_document(&id, &data)?;
        docs.push(StoredDocument { id, data });
        self.write_documents(&docs)?;
        info!(id = %created.id, %user, "created workout log");
        Ok(created)
    }

    fn update(&self, id: &LogId, patch: &WorkoutLogPatch) -> StoreResult<()> {
        let mut docs = self.read_documents()?;
        let doc = docs
            .iter_mut()
            .find(|doc| doc.id == id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to_document(&mut doc.data);
        self.write_documents(&docs)?;
        info!(%id, "updated workout log");
        Ok(())
    }

    fn delete(&self, id: &LogId) -> StoreResult<()> {
        let mut docs = self.read_documents()?;
        let initial_len = docs.len();
        docs.retain(|doc| doc.id != id.as_str());

        if docs.len() == initial_len {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.write_documents(&docs)?;
        info!(%id, "deleted workout log");
        Ok(())
    }
}
