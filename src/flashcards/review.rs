use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::difficulty::{adjust_difficulty, Difficulty};
use super::mastery::mastery;
use super::scheduler::interval_days;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardState {
    pub times_reviewed: u32,
    pub times_correct: u32,
    pub difficulty: Difficulty,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review_date: DateTime<Utc>,
}

impl FlashcardState {
    /// A card that has never been reviewed and is due immediately.
    pub fn new(difficulty: Difficulty, now: DateTime<Utc>) -> Self {
        Self {
            times_reviewed: 0,
            times_correct: 0,
            difficulty,
            last_reviewed: None,
            next_review_date: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }

    pub fn mastery(&self) -> f64 {
        mastery(self.times_reviewed, self.times_correct, self.difficulty)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub state: FlashcardState,
    pub correct: bool,
    /// Fraction in `[0, 1]` after this review.
    pub mastery: f64,
    /// Days between this review and `state.next_review_date`.
    pub interval_days: i64,
    pub previous_difficulty: Difficulty,
}

/// Records one review.
///
/// Scheduling and the tier adjustment both read the counters as they were
/// before this review; only afterwards are the incremented counters committed.
/// Mastery reflects the committed counters under the tier the card was
/// reviewed at.
pub fn apply_review(state: &FlashcardState, correct: bool, now: DateTime<Utc>) -> ReviewOutcome {
    let prior_reviewed = state.times_reviewed;
    let prior_correct = state.times_correct;

    let interval = interval_days(state.difficulty, correct, prior_reviewed);
    let new_difficulty = adjust_difficulty(state.difficulty, prior_reviewed, prior_correct);

    let times_reviewed = prior_reviewed.saturating_add(1);
    let times_correct = if correct {
        prior_correct.saturating_add(1)
    } else {
        prior_correct
    };

    ReviewOutcome {
        mastery: mastery(times_reviewed, times_correct, state.difficulty),
        correct,
        interval_days: interval,
        previous_difficulty: state.difficulty,
        state: FlashcardState {
            times_reviewed,
            times_correct,
            difficulty: new_difficulty,
            last_reviewed: Some(now),
            next_review_date: now + Duration::days(interval),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 18, 0, 0).unwrap()
    }

    #[test]
    fn first_correct_review_schedules_one_day() {
        let card = FlashcardState::new(Difficulty::Medium, now());
        let outcome = apply_review(&card, true, now());
        assert_eq!(outcome.state.times_reviewed, 1);
        assert_eq!(outcome.state.times_correct, 1);
        assert_eq!(outcome.state.next_review_date, now() + Duration::days(1));
        assert_eq!(outcome.state.last_reviewed, Some(now()));
        assert!((outcome.mastery - 0.9).abs() < 1e-12);
    }

    #[test]
    fn scheduling_reads_pre_event_counters() {
        let card = FlashcardState {
            times_reviewed: 2,
            times_correct: 2,
            difficulty: Difficulty::Medium,
            last_reviewed: None,
            next_review_date: now(),
        };
        let outcome = apply_review(&card, true, now());
        // medium[2] = 5, not medium[3] = 10
        assert_eq!(outcome.state.next_review_date, now() + Duration::days(5));
        assert_eq!(outcome.interval_days, 5);
        // two reviews are below the adjustment sample even though the third is correct
        assert_eq!(outcome.state.difficulty, Difficulty::Medium);
        assert_eq!(outcome.state.times_reviewed, 3);
    }

    #[test]
    fn difficulty_moves_on_pre_event_accuracy() {
        let card = FlashcardState {
            times_reviewed: 3,
            times_correct: 3,
            difficulty: Difficulty::Easy,
            last_reviewed: None,
            next_review_date: now(),
        };
        let outcome = apply_review(&card, false, now());
        assert_eq!(outcome.state.difficulty, Difficulty::Medium);
        assert_eq!(outcome.previous_difficulty, Difficulty::Easy);
        assert_eq!(outcome.state.next_review_date, now() + Duration::days(1));
        assert!((outcome.mastery - 0.75).abs() < 1e-12);
    }

    #[test]
    fn counters_never_decrease() {
        let mut card = FlashcardState::new(Difficulty::Hard, now());
        for i in 0..12 {
            let before = card.clone();
            card = apply_review(&card, i % 3 != 0, now()).state;
            assert_eq!(card.times_reviewed, before.times_reviewed + 1);
            assert!(card.times_correct >= before.times_correct);
            assert!(card.times_correct <= card.times_reviewed);
        }
    }

    #[test]
    fn reported_interval_matches_scheduled_date() {
        let mut card = FlashcardState::new(Difficulty::Easy, now());
        for i in 0..8 {
            let outcome = apply_review(&card, i != 6, now());
            assert_eq!(
                outcome.state.next_review_date,
                now() + Duration::days(outcome.interval_days)
            );
            card = outcome.state;
        }
    }

    #[test]
    fn due_check() {
        let card = FlashcardState::new(Difficulty::Easy, now());
        assert!(card.is_due(now()));
        assert!(!card.is_due(now() - Duration::minutes(1)));
    }
}
