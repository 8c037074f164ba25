use thiserror::Error;

use crate::model::workout_log::LogId;

/// A document read from the log store could not be turned into a typed record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("document {id}: missing field '{field}'")]
    MissingField { id: String, field: &'static str },
    #[error("document {id}: invalid field '{field}': {reason}")]
    InvalidField {
        id: String,
        field: &'static str,
        reason: String,
    },
}

/// Form input rejected before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,
    #[error("Email is required")]
    EmptyEmail,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Malformed document: {0}")]
    Mapping(#[from] MappingError),
    #[error("Document {0} not found")]
    NotFound(String),
    #[error("Could not determine data directory")]
    NoDataDir,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("Log {0} not found in its day bucket")]
    NotFound(LogId),
}

/// Errors surfaced by the log book to its caller.
#[derive(Debug, Error)]
pub enum LogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Logs are still loading")]
    NotReady,
    #[error("Log {0} not found")]
    NotFound(LogId),
    #[error("This entry was already saved as {0}")]
    DuplicateSubmission(LogId),
    #[error("Log store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<IndexError> for LogError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::NotFound(id) => LogError::NotFound(id),
        }
    }
}

impl LogError {
    /// Text suitable for showing to the user. Store failures collapse into a
    /// generic message; the detail goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            LogError::Store(_) => "Something went wrong while saving. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account already exists for {0}")]
    EmailInUse(String),
    #[error("Not signed in")]
    NotSignedIn,
    #[error("No profile found for user {0}")]
    ProfileMissing(String),
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}
