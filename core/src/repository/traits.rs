use crate::error::{AuthError, StoreResult};
use crate::model::profile::{Account, UserProfile};
use crate::model::workout_log::{LogId, NewWorkoutLog, UserId, WorkoutLog, WorkoutLogPatch};

/// Collection of workout-log documents, filterable by owner.
pub trait LogStore {
    /// Every log of `user`, in no particular order.
    fn fetch_all(&self, user: &UserId) -> StoreResult<Vec<WorkoutLog>>;
    /// Persists a new log. The store assigns the id and creation time.
    fn create(&self, user: &UserId, log: &NewWorkoutLog) -> StoreResult<WorkoutLog>;
    fn update(&self, id: &LogId, patch: &WorkoutLogPatch) -> StoreResult<()>;
    fn delete(&self, id: &LogId) -> StoreResult<()>;
}

pub trait IdentityProvider {
    fn sign_up(&self, email: &str, password: &str) -> Result<Account, AuthError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError>;
    fn sign_out(&self) -> Result<(), AuthError>;
    fn current_user(&self) -> Result<Option<UserId>, AuthError>;
}

pub trait ProfileStore {
    fn get(&self, uid: &UserId) -> StoreResult<Option<UserProfile>>;
    /// Inserts or replaces the profile of `profile.uid`.
    fn put(&self, profile: &UserProfile) -> StoreResult<()>;
}
