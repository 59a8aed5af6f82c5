//! JSON file store for native builds
//!
//! Writes go to `<path>.tmp` first and are renamed over the real file, so a
//! crash mid-write leaves the previous board intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ScoreStore, StoreError};
use crate::highscores::{HighScores, ScoreEntry};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl ScoreStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json file"
    }

    fn load(&self) -> Result<HighScores, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(HighScores::from_json(&text)),
            // First run
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HighScores::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, entry: ScoreEntry) -> Result<(), StoreError> {
        let mut scores = self.load()?;
        scores.add(entry);
        let json = scores.to_json()?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Wrote {} scores to {}", scores.len(), self.path.display());
        Ok(())
    }
}
