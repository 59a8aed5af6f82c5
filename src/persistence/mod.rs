//! High-score persistence
//!
//! Features:
//! - `ScoreStore` trait over whatever backing storage the host has
//! - In-memory and JSON file stores (LocalStorage lives in `platform::web`)
//! - Fallback to a secondary store when the primary is unavailable
//!
//! Nothing here ever panics or blocks gameplay; failures surface as a soft
//! `SaveStatus`.

#[cfg(not(target_arch = "wasm32"))]
pub mod file;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

use std::fmt;

use crate::highscores::{HighScores, ScoreEntry};

/// Storage failure
#[derive(Debug)]
pub enum StoreError {
    /// Backing storage does not exist in this environment
    Unavailable(&'static str),
    /// Read or write failed
    Io(std::io::Error),
    /// Contents could not be encoded
    Serialize(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(what) => write!(f, "{} is unavailable", what),
            StoreError::Io(err) => write!(f, "storage I/O failed: {}", err),
            StoreError::Serialize(err) => write!(f, "could not encode scores: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Unavailable(_) => None,
            StoreError::Io(err) => Some(err),
            StoreError::Serialize(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err)
    }
}

/// Backing storage for the leaderboard
pub trait ScoreStore {
    /// Short label for logs
    fn name(&self) -> &'static str;
    /// All stored entries, sorted and truncated
    fn load(&self) -> Result<HighScores, StoreError>;
    /// Persist one more entry
    fn save(&mut self, entry: ScoreEntry) -> Result<(), StoreError>;
}

/// Outcome of a score submission, for the game-over screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    SavedToFallback,
    /// Nothing worth saving (zero score or already saved)
    Skipped,
    Failed(String),
}

impl SaveStatus {
    pub fn message(&self) -> String {
        match self {
            SaveStatus::Saved => "Score saved.".into(),
            SaveStatus::SavedToFallback => "Score saved locally.".into(),
            SaveStatus::Skipped => "No score to save this run.".into(),
            SaveStatus::Failed(reason) => format!("Could not save score: {}", reason),
        }
    }
}

/// Process-lifetime store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    scores: HighScores,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<HighScores, StoreError> {
        Ok(self.scores.clone())
    }

    fn save(&mut self, entry: ScoreEntry) -> Result<(), StoreError> {
        self.scores.add(entry);
        Ok(())
    }
}

/// Primary store with a secondary one behind it
pub struct FallbackStore {
    primary: Box<dyn ScoreStore>,
    fallback: Box<dyn ScoreStore>,
}

impl FallbackStore {
    pub fn new(primary: Box<dyn ScoreStore>, fallback: Box<dyn ScoreStore>) -> Self {
        Self { primary, fallback }
    }

    /// Memory only, for headless runs and tests
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    /// Leaderboard from the primary store, else the fallback, else empty
    pub fn load(&self) -> HighScores {
        match self.primary.load() {
            Ok(scores) => scores,
            Err(err) => {
                log::warn!(
                    "High scores unavailable from {} ({}), reading {}",
                    self.primary.name(),
                    err,
                    self.fallback.name()
                );
                self.fallback.load().unwrap_or_else(|err| {
                    log::warn!("Fallback high scores unavailable: {}", err);
                    HighScores::new()
                })
            }
        }
    }

    /// Save an entry, falling back on failure. Zero scores are skipped.
    pub fn submit(&mut self, entry: ScoreEntry) -> SaveStatus {
        if entry.score == 0 {
            return SaveStatus::Skipped;
        }
        let (name, score) = (entry.name.clone(), entry.score);
        match self.primary.save(entry.clone()) {
            Ok(()) => {
                log::info!("High score saved: {} {}", name, score);
                SaveStatus::Saved
            }
            Err(err) => {
                log::warn!(
                    "Saving to {} failed ({}), using {}",
                    self.primary.name(),
                    err,
                    self.fallback.name()
                );
                match self.fallback.save(entry) {
                    Ok(()) => {
                        log::info!("High score saved to fallback: {} {}", name, score);
                        SaveStatus::SavedToFallback
                    }
                    Err(err) => {
                        log::warn!("Fallback save failed: {}", err);
                        SaveStatus::Failed(err.to_string())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that is never there
    struct MissingStore;

    impl ScoreStore for MissingStore {
        fn name(&self) -> &'static str {
            "missing"
        }

        fn load(&self) -> Result<HighScores, StoreError> {
            Err(StoreError::Unavailable("missing"))
        }

        fn save(&mut self, _entry: ScoreEntry) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("missing"))
        }
    }

    fn entry(score: u64) -> ScoreEntry {
        ScoreEntry {
            name: "TEST".into(),
            score,
            level: 2,
            date: "2024-01-01".into(),
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_primary_save_and_load() {
        let mut store = FallbackStore::in_memory();
        assert_eq!(store.submit(entry(300)), SaveStatus::Saved);
        assert_eq!(store.submit(entry(900)), SaveStatus::Saved);
        let scores = store.load();
        assert_eq!(scores.top_score(), Some(900));
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_zero_score_skipped() {
        let mut store = FallbackStore::in_memory();
        assert_eq!(store.submit(entry(0)), SaveStatus::Skipped);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_unavailable_primary_falls_back() {
        let mut store = FallbackStore::new(Box::new(MissingStore), Box::new(MemoryStore::new()));
        assert_eq!(store.submit(entry(450)), SaveStatus::SavedToFallback);
        assert_eq!(store.load().top_score(), Some(450));
    }

    #[test]
    fn test_both_missing_is_soft_failure() {
        let mut store = FallbackStore::new(Box::new(MissingStore), Box::new(MissingStore));
        let status = store.submit(entry(10));
        assert!(matches!(status, SaveStatus::Failed(_)));
        assert!(status.message().contains("unavailable"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_error_display_and_source() {
        let io = StoreError::from(std::io::Error::other("disk gone"));
        assert!(io.to_string().contains("disk gone"));
        assert!(std::error::Error::source(&io).is_some());
        assert!(std::error::Error::source(&StoreError::Unavailable("x")).is_none());
    }
}
