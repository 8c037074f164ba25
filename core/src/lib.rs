pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use error::{AuthError, IndexError, LogError, MappingError, StoreError, ValidationError};
pub use input::{draft_from_input, expand_key, parse_args, patch_from_input, ParsedInput};
pub use model::day_key::DayKey;
pub use model::log_index::{DayTotals, LogIndex};
pub use model::profile::{Account, ProfilePatch, SignInForm, SignUpForm, UserProfile};
pub use model::workout_log::{LogId, NewWorkoutLog, UserId, WorkoutLog, WorkoutLogPatch};
pub use repository::{
    FileIdentityProvider, FileLogStore, FileProfileStore, IdentityProvider, LogStore, ProfileStore,
};
pub use service::auth_service::AuthService;
pub use service::dto::{DaySummary, WeeklyHistory};
pub use service::log_book::{LoadOutcome, LoadTicket, LogBook, LogBookState};
pub use time::{parse_log_date, parse_minutes};
pub use usecase::history::HistoryUseCase;
