//! High score leaderboard
//!
//! Keeps up to `MAX_STORED_SCORES` entries sorted by score, with per-level
//! and overall top lists for the menu.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_STORED_SCORES;

/// Entries shown per leaderboard page
pub const DEFAULT_TOP_LIMIT: usize = 10;
/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 16;
/// Name used when nothing usable was typed
pub const DEFAULT_NAME: &str = "ANON";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
    /// 1-based level reached
    pub level: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Unix timestamp (ms) when achieved
    #[serde(default)]
    pub timestamp: f64,
}

impl ScoreEntry {
    /// Entry stamped with the current date
    pub fn new(name: &str, score: u64, level: u32) -> Self {
        let timestamp = now_ms();
        Self {
            name: sanitize_player_name(name),
            score,
            level: level.max(1),
            date: iso_date(timestamp),
            timestamp,
        }
    }
}

/// Loosely typed entry as found in storage
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredEntry {
    name: Option<String>,
    score: Option<f64>,
    level: Option<f64>,
    date: Option<String>,
    timestamp: Option<f64>,
}

impl StoredEntry {
    /// Repair what can be repaired; entries without a usable score are dropped
    fn normalize(self) -> Option<ScoreEntry> {
        let score = self.score.filter(|s| s.is_finite())?;
        let name: String = self
            .name
            .as_deref()
            .unwrap_or(DEFAULT_NAME)
            .trim()
            .chars()
            .take(MAX_NAME_LEN)
            .collect();
        let level = self
            .level
            .filter(|l| l.is_finite())
            .map(|l| l.floor().max(1.0) as u32)
            .unwrap_or(1);
        let timestamp = self.timestamp.filter(|t| t.is_finite()).unwrap_or(0.0);
        Some(ScoreEntry {
            name: if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name
            },
            score: score.floor().max(0.0) as u64,
            level,
            date: self.date.unwrap_or_else(|| iso_date(now_ms())),
            timestamp,
        })
    }
}

/// Uppercase, keep `[A-Z0-9 _-]`, trim, cap the length. Empty becomes `ANON`.
pub fn sanitize_player_name(raw: &str) -> String {
    let cleaned: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(*c, ' ' | '_' | '-'))
        .collect();
    let trimmed: String = cleaned.trim().chars().take(MAX_NAME_LEN).collect();
    let trimmed = trimmed.trim_end().to_string();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sorted, truncated leaderboard from arbitrary entries
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        // Stable: equal scores keep their stored order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_STORED_SCORES);
        Self { entries }
    }

    /// Parse a stored JSON array, repairing or dropping bad entries.
    /// Anything unreadable yields an empty board.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Vec<StoredEntry>>(text) {
            Ok(raw) => Self::from_entries(raw.into_iter().filter_map(StoredEntry::normalize).collect()),
            Err(err) => {
                log::warn!("Discarding unreadable high scores: {}", err);
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_STORED_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if didn't qualify.
    pub fn add(&mut self, entry: ScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_STORED_SCORES);
        Some(rank)
    }

    /// Best entries that reached exactly `level`
    pub fn level_top(&self, level: u32, limit: usize) -> Vec<&ScoreEntry> {
        self.entries
            .iter()
            .filter(|e| e.level == level)
            .take(limit)
            .collect()
    }

    /// Best entries across all levels
    pub fn overall_top(&self, limit: usize) -> Vec<&ScoreEntry> {
        self.entries.iter().take(limit).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// `YYYY-MM-DD` (UTC) for a Unix timestamp in ms
pub fn iso_date(timestamp_ms: f64) -> String {
    let days = (timestamp_ms / 86_400_000.0).floor() as i64;
    let (y, m, d) = civil_from_days(days);
    format!("{:04}-{:02}-{:02}", y, m, d)
}

/// Proleptic Gregorian date from days since 1970-01-01
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + if m <= 2 { 1 } else { 0 };
    (y, m, d)
}
