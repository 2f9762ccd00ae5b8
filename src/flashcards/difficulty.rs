use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum reviews before the tier may move.
pub const MIN_REVIEWS_FOR_ADJUSTMENT: u32 = 3;
const PROMOTE_ACCURACY: f64 = 0.8;
const DEMOTE_ACCURACY: f64 = 0.5;

/// Flashcard tier. Ordered `Easy < Medium < Hard`; mastery promotes toward `Hard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Unrecognised strings fall back to `Medium`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    fn harder(self) -> Option<Self> {
        match self {
            Difficulty::Easy => Some(Difficulty::Medium),
            Difficulty::Medium => Some(Difficulty::Hard),
            Difficulty::Hard => None,
        }
    }

    fn easier(self) -> Option<Self> {
        match self {
            Difficulty::Easy => None,
            Difficulty::Medium => Some(Difficulty::Easy),
            Difficulty::Hard => Some(Difficulty::Medium),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moves one tier at a time once enough reviews exist. Accuracy in
/// `[0.5, 0.8)` leaves the tier alone.
pub fn adjust_difficulty(current: Difficulty, times_reviewed: u32, times_correct: u32) -> Difficulty {
    if times_reviewed < MIN_REVIEWS_FOR_ADJUSTMENT {
        return current;
    }

    let accuracy = times_correct as f64 / times_reviewed as f64;
    if accuracy >= PROMOTE_ACCURACY {
        current.harder().unwrap_or(current)
    } else if accuracy < DEMOTE_ACCURACY {
        current.easier().unwrap_or(current)
    } else {
        current
    }
}
