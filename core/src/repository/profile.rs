use std::path::PathBuf;

use tracing::info;

use crate::error::StoreResult;
use crate::model::profile::UserProfile;
use crate::model::workout_log::UserId;
use crate::repository::json_file::JsonFile;
use crate::repository::traits::ProfileStore;

const PROFILES_FILE_NAME: &str = "profiles.json";

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    file: JsonFile,
}

impl FileProfileStore {
    pub fn new(base_dir: Option<PathBuf>) -> StoreResult<Self> {
        Ok(Self {
            file: JsonFile::open(base_dir, PROFILES_FILE_NAME)?,
        })
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, uid: &UserId) -> StoreResult<Option<UserProfile>> {
        let profiles: Vec<UserProfile> = self.file.read()?;
        Ok(profiles.into_iter().find(|p| &p.uid == uid))
    }

    fn put(&self, profile: &UserProfile) -> StoreResult<()> {
        let mut profiles: Vec<UserProfile> = self.file.read()?;
        if let Some(pos) = profiles.iter().position(|p| p.uid == profile.uid) {
            profiles[pos] = profile.clone();
        } else {
            profiles.push(profile.clone());
        }
        self.file.write(&profiles)?;
        info!(uid = %profile.uid, "saved profile");
        Ok(())
    }
}
