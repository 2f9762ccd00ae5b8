use super::difficulty::Difficulty;

fn multiplier(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Medium => 0.9,
        Difficulty::Hard => 0.8,
    }
}

/// 0-1 command of a card: accuracy scaled down for harder tiers.
/// Presentation layers multiply by 100 for a percentage.
pub fn mastery(times_reviewed: u32, times_correct: u32, difficulty: Difficulty) -> f64 {
    if times_reviewed == 0 {
        return 0.0;
    }
    let accuracy = times_correct as f64 / times_reviewed as f64;
    (accuracy * multiplier(difficulty)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreviewed_cards_have_no_mastery() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(mastery(0, 0, difficulty), 0.0);
        }
    }

    #[test]
    fn perfect_easy_accuracy_is_full_mastery() {
        for n in [1, 7, 250] {
            assert_eq!(mastery(n, n, Difficulty::Easy), 1.0);
        }
    }

    #[test]
    fn harder_tiers_scale_down() {
        assert!((mastery(10, 10, Difficulty::Medium) - 0.9).abs() < 1e-12);
        assert!((mastery(10, 10, Difficulty::Hard) - 0.8).abs() < 1e-12);
        assert!((mastery(4, 2, Difficulty::Hard) - 0.4).abs() < 1e-12);
        assert!((mastery(4, 2, Difficulty::parse_lenient("??")) - 0.45).abs() < 1e-12);
    }
}
