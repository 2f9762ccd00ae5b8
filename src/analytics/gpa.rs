use std::collections::BTreeMap;

use super::grade_scale::grade_to_gpa;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean GPA over all subjects, rounded to two decimals.
pub fn calculate_gpa(grades: &BTreeMap<String, String>) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let total: f64 = grades.values().map(|grade| grade_to_gpa(grade)).sum();
    round2(total / grades.len() as f64)
}

/// Weighted mean GPA. Subjects missing from `weights` count with weight 1.0.
pub fn calculate_weighted_gpa(
    grades: &BTreeMap<String, String>,
    weights: Option<&BTreeMap<String, f64>>,
) -> f64 {
    let Some(weights) = weights else {
        return calculate_gpa(grades);
    };
    if grades.is_empty() {
        return 0.0;
    }

    let (weighted, total_weight) = grades.iter().fold((0.0, 0.0), |(sum, total), (subject, grade)| {
        let weight = weights.get(subject).copied().unwrap_or(1.0);
        (sum + grade_to_gpa(grade) * weight, total + weight)
    });

    if total_weight > 0.0 {
        round2(weighted / total_weight)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grades(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(s, g)| (s.to_string(), g.to_string()))
            .collect()
    }

    #[test]
    fn empty_report_has_zero_gpa() {
        assert_eq!(calculate_gpa(&BTreeMap::new()), 0.0);
        assert_eq!(calculate_weighted_gpa(&BTreeMap::new(), Some(&BTreeMap::new())), 0.0);
    }

    #[test]
    fn gpa_is_rounded_mean() {
        let map = grades(&[("Math", "A"), ("English", "B+"), ("Art", "C-")]);
        // (4.0 + 3.3 + 1.7) / 3 = 3.0
        assert_eq!(calculate_gpa(&map), 3.0);
        let map = grades(&[("Math", "A-"), ("English", "B")]);
        assert_eq!(calculate_gpa(&map), 3.35);
    }

    #[test]
    fn weighted_gpa_defaults_missing_weights() {
        let map = grades(&[("Math", "A"), ("Art", "E")]);
        let weights: BTreeMap<String, f64> = [("Math".to_string(), 3.0)].into_iter().collect();
        assert_eq!(calculate_weighted_gpa(&map, Some(&weights)), 3.0);
        assert_eq!(calculate_weighted_gpa(&map, None), 2.0);
    }

    #[test]
    fn non_positive_total_weight_is_zero() {
        let map = grades(&[("Math", "A")]);
        let weights: BTreeMap<String, f64> = [("Math".to_string(), 0.0)].into_iter().collect();
        assert_eq!(calculate_weighted_gpa(&map, Some(&weights)), 0.0);
    }
}
