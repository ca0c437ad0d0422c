//! High score leaderboard system
//!
//! Tracks the top 10 rounds. The engine only hands over the final score;
//! ranking and persistence live behind [`ScoreStore`] and may fail without
//! affecting the round.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Leaderboard persistence failures
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("leaderboard data corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    /// ISO-8601 timestamp when achieved
    pub date: String,
}

/// High score leaderboard (sorted descending by score)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
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

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, name: &str, score: u32, date: &str) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry {
            name: name.to_string(),
            score,
            date: date.to_string(),
        };

        // Ties go after existing entries
        let pos = self.entries.iter().position(|e| score > e.score);
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

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, LeaderboardError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse stored JSON, re-sorting and capping in case it was edited by hand
    pub fn from_json(json: &str) -> Result<Self, LeaderboardError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }
}

/// Calendar date part of an ISO-8601 timestamp, for display
pub fn format_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Leaderboard persistence collaborator
pub trait ScoreStore {
    /// Record a finished round. Returns the rank achieved, if any.
    fn save_score(
        &mut self,
        name: &str,
        score: u32,
        timestamp: &str,
    ) -> Result<Option<usize>, LeaderboardError>;

    /// Top entries, best first
    fn load_scores(&self) -> Result<Vec<ScoreEntry>, LeaderboardError>;
}

/// In-process store (native builds and tests)
#[derive(Debug, Default)]
pub struct MemoryStore {
    scores: HighScores,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn save_score(
        &mut self,
        name: &str,
        score: u32,
        timestamp: &str,
    ) -> Result<Option<usize>, LeaderboardError> {
        Ok(self.scores.add_score(name, score, timestamp))
    }

    fn load_scores(&self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        Ok(self.scores.entries.clone())
    }
}

/// LocalStorage-backed store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "flappy_brielle_leaderboard";

    pub fn new() -> Self {
        Self {
            key: Self::STORAGE_KEY.to_string(),
        }
    }

    fn read(&self) -> Result<HighScores, LeaderboardError> {
        let storage = crate::platform::local_storage()
            .ok_or_else(|| LeaderboardError::Unavailable("no localStorage".into()))?;
        match storage.get_item(&self.key) {
            Ok(Some(json)) => HighScores::from_json(&json),
            Ok(None) => Ok(HighScores::new()),
            Err(e) => Err(LeaderboardError::Unavailable(format!("{:?}", e))),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn save_score(
        &mut self,
        name: &str,
        score: u32,
        timestamp: &str,
    ) -> Result<Option<usize>, LeaderboardError> {
        let mut scores = self.read()?;
        let rank = scores.add_score(name, score, timestamp);
        if rank.is_some() {
            let json = scores.to_json()?;
            let storage = crate::platform::local_storage()
                .ok_or_else(|| LeaderboardError::Unavailable("no localStorage".into()))?;
            storage
                .set_item(&self.key, &json)
                .map_err(|e| LeaderboardError::Write(format!("{:?}", e)))?;
            log::info!("High scores saved ({} entries)", scores.entries.len());
        }
        Ok(rank)
    }

    fn load_scores(&self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        Ok(self.read()?.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "2026-02-14T12:00:00.000Z";

    #[test]
    fn test_ranking_and_cap() {
        let mut scores = HighScores::new();
        for s in 1..=12u32 {
            scores.add_score("p", s * 10, DATE);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(120));
        assert_eq!(scores.entries.last().map(|e| e.score), Some(30));
        assert!(!scores.qualifies(30));
        assert!(scores.qualifies(31));
        assert_eq!(scores.potential_rank(125), Some(1));
        assert_eq!(scores.potential_rank(10), None);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("nobody", 0, DATE), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_ties_keep_earlier_first() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("first", 5, DATE), Some(1));
        assert_eq!(scores.add_score("second", 5, DATE), Some(2));
        assert_eq!(scores.entries[0].name, "first");
    }

    #[test]
    fn test_json_resorts() {
        let json = r#"{"entries":[
            {"name":"a","score":3,"date":"2026-02-14"},
            {"name":"b","score":9,"date":"2026-02-14"}
        ]}"#;
        let scores = HighScores::from_json(json).unwrap();
        assert_eq!(scores.entries[0].name, "b");
        let again = HighScores::from_json(&scores.to_json().unwrap()).unwrap();
        assert_eq!(again.entries, scores.entries);
    }

    #[test]
    fn test_corrupt_json() {
        assert!(matches!(
            HighScores::from_json("not json"),
            Err(LeaderboardError::Corrupt(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.save_score("Brielle", 12, DATE).unwrap(), Some(1));
        assert_eq!(store.save_score("Cupid", 30, DATE).unwrap(), Some(1));
        let loaded = store.load_scores().unwrap();
        assert_eq!(loaded[0].name, "Cupid");
        assert_eq!(loaded[1].score, 12);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(DATE), "2026-02-14");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
