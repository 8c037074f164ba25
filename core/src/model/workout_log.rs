use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{MappingError, ValidationError};
use crate::model::day_key::DayKey;

/// Timestamp layout used for the `date` field of stored documents.
pub const DOCUMENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identity of a log, assigned by the log store on create.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct LogId(String);

impl LogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One exercise session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub id: LogId,
    pub name: String,
    pub date: NaiveDateTime,
    /// Minutes.
    pub duration: u32,
    /// Kilocalories.
    pub calories: u32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl WorkoutLog {
    pub fn day(&self) -> DayKey {
        DayKey::of(&self.date)
    }

    /// Converts an untyped store document into a log. Every field is
    /// required; a missing or mistyped field is reported, never defaulted.
    pub fn from_document(id: &str, data: &Value) -> Result<Self, MappingError> {
        let doc = Document { id, data };
        Ok(Self {
            id: LogId::new(id),
            name: doc.string("name")?,
            date: doc.date("date")?,
            duration: doc.count("duration")?,
            calories: doc.count("calories")?,
            notes: doc.string("notes")?,
            created_at: doc.instant("createdAt")?,
        })
    }

    /// Owner recorded on a store document, if it is well formed.
    pub fn document_owner(data: &Value) -> Option<&str> {
        data.get("userId").and_then(Value::as_str)
    }
}

struct Document<'a> {
    id: &'a str,
    data: &'a Value,
}

impl<'a> Document<'a> {
    fn get(&self, field: &'static str) -> Result<&'a Value, MappingError> {
        match self.data.get(field) {
            Some(Value::Null) | None => Err(MappingError::MissingField {
                id: self.id.to_string(),
                field,
            }),
            Some(value) => Ok(value),
        }
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> MappingError {
        MappingError::InvalidField {
            id: self.id.to_string(),
            field,
            reason: reason.into(),
        }
    }

    fn string(&self, field: &'static str) -> Result<String, MappingError> {
        self.get(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(field, "expected a string"))
    }

    fn count(&self, field: &'static str) -> Result<u32, MappingError> {
        let value = self.get(field)?;
        let n = value
            .as_u64()
            .ok_or_else(|| self.invalid(field, format!("expected a non-negative integer, got {}", value)))?;
        u32::try_from(n).map_err(|_| self.invalid(field, format!("{} is out of range", n)))
    }

    fn date(&self, field: &'static str) -> Result<NaiveDateTime, MappingError> {
        let raw = self.string(field)?;
        NaiveDateTime::parse_from_str(&raw, DOCUMENT_DATE_FORMAT)
            .map_err(|e| self.invalid(field, format!("'{}': {}", raw, e)))
    }

    fn instant(&self, field: &'static str) -> Result<DateTime<Utc>, MappingError> {
        let raw = self.string(field)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| self.invalid(field, format!("'{}': {}", raw, e)))
    }
}

/// Payload of the create form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewWorkoutLog {
    pub name: String,
    pub date: NaiveDateTime,
    pub duration: u32,
    pub calories: u32,
    pub notes: String,
    /// Generated when the form is opened; a second save of the same form is
    /// recognised by it.
    pub submission_key: Uuid,
}

impl NewWorkoutLog {
    pub fn new(name: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            date,
            duration: 0,
            calories: 0,
            notes: String::new(),
            submission_key: Uuid::new_v4(),
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_calories(mut self, kcal: u32) -> Self {
        self.calories = kcal;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn day(&self) -> DayKey {
        DayKey::of(&self.date)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    pub fn to_document(&self, owner: &UserId, created_at: DateTime<Utc>) -> Value {
        json!({
            "userId": owner.as_str(),
            "name": self.name.trim(),
            "date": self.date.format(DOCUMENT_DATE_FORMAT).to_string(),
            "duration": self.duration,
            "calories": self.calories,
            "notes": self.notes,
            "createdAt": created_at.to_rfc3339(),
        })
    }
}

/// Fields an update may change. The date is fixed at creation, so a log
/// never moves to another day.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkoutLogPatch {
    pub name: Option<String>,
    pub duration: Option<u32>,
    pub calories: Option<u32>,
    pub notes: Option<String>,
}

impl WorkoutLogPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.duration.is_none() && self.calories.is_none() && self.notes.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(ValidationError::EmptyName),
            _ => Ok(()),
        }
    }

    pub fn apply_to(&self, log: &mut WorkoutLog) {
        if let Some(name) = &self.name {
            log.name = name.trim().to_string();
        }
        if let Some(duration) = self.duration {
            log.duration = duration;
        }
        if let Some(calories) = self.calories {
            log.calories = calories;
        }
        if let Some(notes) = &self.notes {
            log.notes = notes.clone();
        }
    }

    /// Writes the set fields into a store document.
    pub fn apply_to_document(&self, data: &mut Value) {
        if let Some(name) = &self.name {
            data["name"] = json!(name.trim());
        }
        if let Some(duration) = self.duration {
            data["duration"] = json!(duration);
        }
        if let Some(calories) = self.calories {
            data["calories"] = json!(calories);
        }
        if let Some(notes) = &self.notes {
            data["notes"] = json!(notes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn may_first(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_document() -> Value {
        json!({
            "userId": "u1",
            "name": "Run",
            "date": "2024-05-01T07:30:00",
            "duration": 30,
            "calories": 200,
            "notes": "",
            "createdAt": "2024-05-01T08:00:00+00:00",
        })
    }

    #[test]
    fn test_from_document() {
        let log = WorkoutLog::from_document("abc", &sample_document()).unwrap();
        assert_eq!(log.id, LogId::new("abc"));
        assert_eq!(log.name, "Run");
        assert_eq!(log.duration, 30);
        assert_eq!(log.calories, 200);
        assert_eq!(log.day(), DayKey::from_ymd(2024, 5, 1).unwrap());
        assert_eq!(WorkoutLog::document_owner(&sample_document()), Some("u1"));
    }

    #[test]
    fn test_from_document_rejects_missing_field() {
        let mut doc = sample_document();
        doc.as_object_mut().unwrap().remove("notes");
        let err = WorkoutLog::from_document("abc", &doc).unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingField {
                id: "abc".to_string(),
                field: "notes"
            }
        );
    }

    #[test]
    fn test_from_document_rejects_negative_and_fractional_counts() {
        let mut doc = sample_document();
        doc["duration"] = json!(-5);
        assert!(matches!(
            WorkoutLog::from_document("abc", &doc),
            Err(MappingError::InvalidField { field: "duration", .. })
        ));

        let mut doc = sample_document();
        doc["calories"] = json!(12.5);
        assert!(matches!(
            WorkoutLog::from_document("abc", &doc),
            Err(MappingError::InvalidField { field: "calories", .. })
        ));
    }

    #[test]
    fn test_from_document_rejects_bad_date() {
        let mut doc = sample_document();
        doc["date"] = json!("yesterday");
        assert!(matches!(
            WorkoutLog::from_document("abc", &doc),
            Err(MappingError::InvalidField { field: "date", .. })
        ));
    }

    #[test]
    fn test_new_log_document_is_readable() {
        let draft = NewWorkoutLog::new("  Swim ", may_first(18))
            .with_duration(45)
            .with_calories(300)
            .with_notes("pool");
        let created_at = Utc::now();
        let doc = draft.to_document(&UserId::new("u1"), created_at);
        let log = WorkoutLog::from_document("x", &doc).unwrap();
        assert_eq!(log.name, "Swim");
        assert_eq!(log.date, may_first(18));
        assert_eq!(log.notes, "pool");
        assert_eq!(log.created_at.timestamp(), created_at.timestamp());
    }

    #[test]
    fn test_validate_blank_name() {
        let draft = NewWorkoutLog::new("   ", may_first(9));
        assert_eq!(draft.validate(), Err(ValidationError::EmptyName));

        let patch = WorkoutLogPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(patch.validate(), Err(ValidationError::EmptyName));
        assert!(WorkoutLogPatch::default().validate().is_ok());
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut log = WorkoutLog::from_document("abc", &sample_document()).unwrap();
        let patch = WorkoutLogPatch {
            duration: Some(60),
            ..Default::default()
        };
        patch.apply_to(&mut log);
        assert_eq!(log.duration, 60);
        assert_eq!(log.calories, 200);
        assert_eq!(log.name, "Run");
    }
}
