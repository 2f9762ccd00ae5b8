use std::collections::BTreeMap;

use super::grade_scale::grade_to_ordinal;

const NEUTRAL_MATCH: f64 = 50.0;

const SUBJECT_CAREERS: &[(&str, &[&str])] = &[
    ("Mathematics", &["Engineering", "Computer Science", "Actuarial Science", "Statistics", "Economics"]),
    ("Physics", &["Engineering", "Physics", "Architecture", "Aviation", "Astronomy"]),
    ("Chemistry", &["Medicine", "Pharmacy", "Chemical Engineering", "Chemistry", "Biochemistry"]),
    ("Biology", &["Medicine", "Veterinary Medicine", "Biology", "Biotechnology", "Agriculture"]),
    ("English", &["Law", "Journalism", "Literature", "Education", "Communication"]),
    ("Kiswahili", &["Education", "Linguistics", "Journalism", "Translation", "Tourism"]),
    ("History", &["Law", "History", "Political Science", "International Relations", "Archaeology"]),
    ("Geography", &["Urban Planning", "Environmental Science", "Geology", "Tourism", "Surveying"]),
    ("Business Studies", &["Business Administration", "Accounting", "Finance", "Marketing", "Entrepreneurship"]),
    ("Computer Studies", &["Computer Science", "Software Engineering", "IT", "Cybersecurity", "Data Science"]),
    ("Agriculture", &["Agriculture", "Agribusiness", "Agricultural Engineering", "Horticulture", "Veterinary Medicine"]),
];

/// Subjects from the built-in map that feed into `career`.
pub fn related_subjects(career: &str) -> Vec<&'static str> {
    SUBJECT_CAREERS
        .iter()
        .filter(|(_, careers)| careers.contains(&career))
        .map(|(subject, _)| *subject)
        .collect()
}

fn mean_score<'a>(subjects: impl Iterator<Item = &'a str>, grades: &BTreeMap<String, String>) -> Option<f64> {
    let values: Vec<f64> = subjects
        .map(|s| grade_to_ordinal(grades.get(s).map(String::as_str).unwrap_or("E")))
        .collect();
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some(avg / 12.0 * 100.0)
}

/// 0-100 match between a learner's subjects and a career path.
///
/// With `required` subjects, any missing one scores 0. Without, the score
/// comes from the subjects the built-in map relates to the career, and is a
/// neutral 50 when none of them were taken.
pub fn career_match_score(
    subjects: &[String],
    grades: &BTreeMap<String, String>,
    career: &str,
    required: Option<&[String]>,
) -> f64 {
    match required {
        Some(required) => {
            if required.iter().any(|r| !subjects.contains(r)) {
                return 0.0;
            }
            mean_score(required.iter().map(String::as_str), grades).unwrap_or(0.0)
        }
        None => {
            let relevant: Vec<&str> = related_subjects(career)
                .into_iter()
                .filter(|s| subjects.iter().any(|taken| taken == s) && grades.contains_key(*s))
                .collect();
            mean_score(relevant.into_iter(), grades).unwrap_or(NEUTRAL_MATCH)
        }
    }
}
