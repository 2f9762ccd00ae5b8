/// Input validation shared by the report, flashcard and planning routes.
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use crate::analytics::extract::normalize_subject_name;
use crate::analytics::LetterGrade;
use crate::constants::{MAX_REPORT_YEAR, MAX_SUBJECTS_PER_REQUEST, MIN_REPORT_YEAR};

/// 1-64 characters of letters, digits, `-` or `_`.
pub fn validate_user_id(user_id: &str) -> Result<(), &'static str> {
    let len = user_id.chars().count();
    if len == 0 || len > 64 {
        return Err("user id must be between 1 and 64 characters");
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("user id may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

pub fn validate_term(term: u32) -> Result<(), &'static str> {
    if !(1..=3).contains(&term) {
        return Err("term must be 1, 2 or 3");
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<(), &'static str> {
    if !(MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&year) {
        return Err("year is out of range");
    }
    Ok(())
}

/// Subjects are free text but must survive normalization as a storage key.
pub fn validate_subject(subject: &str) -> Result<String, &'static str> {
    let normalized = normalize_subject_name(subject);
    if normalized.is_empty() {
        return Err("subject must not be empty");
    }
    if normalized.chars().count() > 80 {
        return Err("subject must be at most 80 characters");
    }
    if normalized.contains(':') {
        return Err("subject must not contain ':'");
    }
    Ok(normalized)
}

/// Normalizes subject names and canonicalizes letter grades. Every grade must
/// parse; an unrecognised one is reported with its subject. Two raw names
/// that normalize to the same subject are rejected.
pub fn validate_grades(
    grades: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, String> {
    if grades.is_empty() {
        return Err("grades must contain at least one subject".to_string());
    }
    if grades.len() > MAX_SUBJECTS_PER_REQUEST {
        return Err(format!(
            "at most {MAX_SUBJECTS_PER_REQUEST} subjects are accepted"
        ));
    }

    let mut canonical = BTreeMap::new();
    for (subject, grade) in grades {
        let name = validate_subject(subject).map_err(|e| format!("{subject}: {e}"))?;
        let letter = LetterGrade::parse(grade)
            .ok_or_else(|| format!("{subject}: '{grade}' is not a letter grade"))?;
        if canonical.contains_key(&name) {
            return Err(format!("{subject}: duplicates another entry for {name}"));
        }
        canonical.insert(name, letter.as_str().to_string());
    }
    Ok(canonical)
}

/// Report dates share the year range so their keys order correctly.
pub fn validate_report_date(report_date: DateTime<Utc>) -> Result<(), &'static str> {
    if !(MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&report_date.year()) {
        return Err("reportDate is out of range");
    }
    Ok(())
}
