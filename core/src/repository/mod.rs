pub mod account;
pub mod file;
pub mod json_file;
pub mod profile;
pub mod traits;

// Re-export
pub use account::FileIdentityProvider;
pub use file::{FileLogStore, StoredDocument};
pub use profile::FileProfileStore;
pub use traits::{IdentityProvider, LogStore, ProfileStore};
