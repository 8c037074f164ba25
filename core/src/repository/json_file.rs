use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

const DEFAULT_DIR_NAME: &str = ".workoutlog";

/// Resolves the data directory, defaulting to `~/.workoutlog`, and makes
/// sure it exists.
pub fn data_dir(base_dir: Option<PathBuf>) -> StoreResult<PathBuf> {
    let path = match base_dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .ok_or(StoreError::NoDataDir)?
            .join(DEFAULT_DIR_NAME),
    };
    fs::create_dir_all(&path)?;
    Ok(path)
}

/// A JSON array persisted in a single file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Opens `<base_dir>/<file_name>`, creating it with an empty array when
    /// missing.
    pub fn open(base_dir: Option<PathBuf>, file_name: &str) -> StoreResult<Self> {
        let path = data_dir(base_dir)?.join(file_name);
        if !path.exists() {
            let mut writer = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut writer, &Vec::<serde_json::Value>::new())?;
            writer.flush()?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read<T: DeserializeOwned>(&self) -> StoreResult<Vec<T>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write<T: Serialize>(&self, items: &[T]) -> StoreResult<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, items)?;
        writer.flush()?;
        Ok(())
    }
}
