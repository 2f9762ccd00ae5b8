use chrono::{DateTime, Duration, Utc};

use super::difficulty::Difficulty;

const EASY_INTERVALS: [i64; 5] = [1, 3, 7, 14, 30];
const MEDIUM_INTERVALS: [i64; 5] = [1, 2, 5, 10, 21];
const HARD_INTERVALS: [i64; 5] = [1, 1, 3, 7, 14];

/// Leitner interval table (days) for a tier, indexed by prior review count.
pub fn interval_table(difficulty: Difficulty) -> &'static [i64] {
    match difficulty {
        Difficulty::Easy => &EASY_INTERVALS,
        Difficulty::Medium => &MEDIUM_INTERVALS,
        Difficulty::Hard => &HARD_INTERVALS,
    }
}

/// Days until the next review.
///
/// `prior_review_count` is the count before this review is recorded. Once a
/// card has been through the whole table it stays on the longest interval,
/// whether or not the answer was correct. Before that, a miss resets to the
/// shortest interval.
pub fn interval_days(difficulty: Difficulty, correct: bool, prior_review_count: u32) -> i64 {
    let table = interval_table(difficulty);
    let index = prior_review_count as usize;
    if index >= table.len() {
        table[table.len() - 1]
    } else if correct {
        table[index]
    } else {
        table[0]
    }
}

pub fn next_review_date(
    last_reviewed: DateTime<Utc>,
    difficulty: Difficulty,
    correct: bool,
    prior_review_count: u32,
) -> DateTime<Utc> {
    last_reviewed + Duration::days(interval_days(difficulty, correct, prior_review_count))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn medium_third_review_uses_index_two() {
        let next = next_review_date(base(), Difficulty::Medium, true, 2);
        assert_eq!(next - base(), Duration::days(5));
    }

    #[test]
    fn misses_reset_to_first_interval() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for prior in [0, 1, 2, 3, 4] {
                assert_eq!(interval_days(difficulty, false, prior), 1);
            }
        }
    }

    #[test]
    fn misses_past_table_end_keep_longest_interval() {
        assert_eq!(interval_days(Difficulty::Easy, false, 5), 30);
        assert_eq!(interval_days(Difficulty::Easy, false, 7), 30);
        assert_eq!(interval_days(Difficulty::Medium, false, 12), 21);
        assert_eq!(interval_days(Difficulty::Hard, false, 5), 14);
    }

    #[test]
    fn plateau_after_table_end() {
        assert_eq!(interval_days(Difficulty::Easy, true, 5), 30);
        assert_eq!(interval_days(Difficulty::Hard, true, 100), 14);
    }

    #[test]
    fn tables_grow_with_reviews() {
        let easy: Vec<i64> = (0..5).map(|i| interval_days(Difficulty::Easy, true, i)).collect();
        assert_eq!(easy, EASY_INTERVALS);
        let hard: Vec<i64> = (0..5).map(|i| interval_days(Difficulty::Hard, true, i)).collect();
        assert_eq!(hard, HARD_INTERVALS);
    }
}
