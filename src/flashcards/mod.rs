//! Leitner-style spaced repetition for flashcards: scheduling, mastery and
//! tier adaptation, all derived from the same pre-review counters.

pub mod difficulty;
pub mod mastery;
pub mod review;
pub mod scheduler;

pub use difficulty::{adjust_difficulty, Difficulty};
pub use mastery::mastery;
pub use review::{apply_review, FlashcardState, ReviewOutcome};
pub use scheduler::next_review_date;
