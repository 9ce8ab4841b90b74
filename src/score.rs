use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Characters counted as one word
pub const CHARS_PER_WORD: f64 = 5.0;

/// Lower bound for the elapsed minutes used as a divisor
pub const MIN_ELAPSED_MINUTES: f64 = 1e-3;

/// Final result of one typing test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub wpm: u32,
    pub accuracy: u32,
    #[serde(rename = "raw")]
    pub raw_wpm: u32,
    pub correct: usize,
    pub errors: usize,
    pub total: usize,
    pub elapsed_secs: f64,
    pub finished_at: DateTime<Local>,
}

impl ScoreRecord {
    pub fn compute(
        correct: usize,
        errors: usize,
        total: usize,
        elapsed: Duration,
        finished_at: DateTime<Local>,
    ) -> Self {
        let minutes = (elapsed.as_secs_f64() / 60.0).max(MIN_ELAPSED_MINUTES);

        let wpm = ((correct as f64 / CHARS_PER_WORD) / minutes).round() as u32;
        let raw_wpm = ((total as f64 / CHARS_PER_WORD) / minutes).round() as u32;
        let accuracy = if total > 0 {
            (correct as f64 * 100.0 / total as f64).round() as u32
        } else {
            0
        };

        Self {
            wpm,
            accuracy,
            raw_wpm,
            correct,
            errors,
            total,
            elapsed_secs: elapsed.as_secs_f64(),
            finished_at,
        }
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} wpm   {}% acc   {} raw   ({} correct, {} errors, {} total) at {}",
            self.wpm,
            self.accuracy,
            self.raw_wpm,
            self.correct,
            self.errors,
            self.total,
            self.finished_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}
