use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::grade_scale::grade_to_ordinal;

/// Weekly hours every weak subject receives, independent of how many there are.
pub const WEEKLY_HOURS_PER_WEAK_SUBJECT: f64 = 2.5;
/// Planning window used when no usable exam date is known.
pub const DEFAULT_WINDOW_DAYS: i64 = 90;
const MAX_ORDINAL: f64 = 12.0;
const MISSING_GRADE: &str = "E";

/// Days until the exam, or [`DEFAULT_WINDOW_DAYS`] when the exam is absent,
/// today, or already past.
pub fn study_window_days(exam_date: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match exam_date {
        Some(exam) => {
            let days = (exam - today).num_days();
            if days > 0 {
                days
            } else {
                DEFAULT_WINDOW_DAYS
            }
        }
        None => DEFAULT_WINDOW_DAYS,
    }
}

/// Weekly study hours per weak subject. Loads are additive across subjects
/// and not normalised against any daily budget.
pub fn hours_needed(
    weak_subjects: &[String],
    _exam_date: Option<NaiveDate>,
    _today: NaiveDate,
) -> HashMap<String, f64> {
    weak_subjects
        .iter()
        .map(|subject| (subject.clone(), WEEKLY_HOURS_PER_WEAK_SUBJECT))
        .collect()
}

/// Ranks subjects by `floor((12 - ordinal) * weight * 10)`, highest first.
/// Equal scores keep their input order. Subjects without a grade count as E.
pub fn prioritize(
    subjects: &[String],
    grades: &BTreeMap<String, String>,
    weights: Option<&BTreeMap<String, f64>>,
) -> Vec<(String, i64)> {
    let mut scored: Vec<(String, i64)> = subjects
        .iter()
        .map(|subject| {
            let grade = grades.get(subject).map(String::as_str).unwrap_or(MISSING_GRADE);
            let weight = weights.and_then(|w| w.get(subject)).copied().unwrap_or(1.0);
            let priority = (MAX_ORDINAL - grade_to_ordinal(grade)) * weight;
            (subject.clone(), (priority * 10.0).floor() as i64)
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyAllocation {
    pub subject: String,
    pub weekly_hours: f64,
    pub priority_rank: u32,
    pub priority_score: i64,
    /// Hours across the whole planning window.
    pub total_hours: f64,
}

/// Joins the priority ranking with the weekly allocation. Rank 1 is the
/// subject to study first; duplicate subjects are collapsed to their first
/// occurrence.
pub fn allocate(
    weak_subjects: &[String],
    grades: &BTreeMap<String, String>,
    weights: Option<&BTreeMap<String, f64>>,
    exam_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<StudyAllocation> {
    let mut unique: Vec<String> = Vec::with_capacity(weak_subjects.len());
    for subject in weak_subjects {
        if !unique.contains(subject) {
            unique.push(subject.clone());
        }
    }

    let window = study_window_days(exam_date, today);
    let hours = hours_needed(&unique, exam_date, today);

    prioritize(&unique, grades, weights)
        .into_iter()
        .enumerate()
        .map(|(idx, (subject, score))| {
            let weekly_hours = hours
                .get(&subject)
                .copied()
                .unwrap_or(WEEKLY_HOURS_PER_WEAK_SUBJECT);
            StudyAllocation {
                total_hours: weekly_hours * window as f64 / 7.0,
                weekly_hours,
                priority_rank: idx as u32 + 1,
                priority_score: score,
                subject,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn grades(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(s, g)| (s.to_string(), g.to_string()))
            .collect()
    }

    #[test]
    fn window_defaults_to_ninety_days() {
        let today = date(2025, 1, 1);
        assert_eq!(study_window_days(None, today), 90);
        assert_eq!(study_window_days(Some(today), today), 90);
        assert_eq!(study_window_days(Some(date(2024, 12, 1)), today), 90);
        assert_eq!(study_window_days(Some(date(2025, 1, 15)), today), 14);
    }

    #[test]
    fn every_weak_subject_gets_the_same_rate() {
        let hours = hours_needed(&owned(&["Math", "English", "Physics"]), None, date(2025, 1, 1));
        assert_eq!(hours.len(), 3);
        assert!(hours.values().all(|h| *h == 2.5));
        assert!(hours_needed(&[], None, date(2025, 1, 1)).is_empty());
    }

    #[test]
    fn lower_grades_rank_first() {
        let ranked = prioritize(&owned(&["Math", "Eng"]), &grades(&[("Math", "E"), ("Eng", "A")]), None);
        assert_eq!(ranked, vec![("Math".to_string(), 110), ("Eng".to_string(), 0)]);
    }

    #[test]
    fn ties_keep_input_order_and_weights_apply() {
        let map = grades(&[("Art", "B"), ("Music", "B"), ("Math", "B")]);
        let weights: BTreeMap<String, f64> = [("Math".to_string(), 1.5)].into_iter().collect();
        let ranked = prioritize(&owned(&["Art", "Music", "Math"]), &map, Some(&weights));
        assert_eq!(
            ranked,
            vec![
                ("Math".to_string(), 45),
                ("Art".to_string(), 30),
                ("Music".to_string(), 30),
            ]
        );
    }

    #[test]
    fn missing_grades_count_as_e() {
        let ranked = prioritize(&owned(&["Chemistry"]), &BTreeMap::new(), None);
        assert_eq!(ranked[0].1, 110);
    }

    #[test]
    fn allocation_ranks_and_totals() {
        let map = grades(&[("Math", "D"), ("English", "C")]);
        let plan = allocate(
            &owned(&["English", "Math", "English"]),
            &map,
            None,
            Some(date(2025, 1, 29)),
            date(2025, 1, 1),
        );
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].subject, "Math");
        assert_eq!(plan[0].priority_rank, 1);
        assert_eq!(plan[1].priority_rank, 2);
        assert!((plan[0].total_hours - 10.0).abs() < 1e-9);
        assert_eq!(plan[1].weekly_hours, 2.5);
    }
}
