use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::grade_scale::{grade_to_ordinal, LetterGrade};
use super::trend::{analyze_trend, Trend};

const TREND_ADJUSTMENT: f64 = 5.0;
const WEAKNESS_ORDINAL: f64 = 6.0;

/// 0-100 composite of the current grade and its trend direction.
pub fn strength_score(letter: &str, trend: Trend) -> f64 {
    let base = grade_to_ordinal(letter) / 12.0 * 100.0;
    let adjusted = match trend {
        Trend::Improving => base + TREND_ADJUSTMENT,
        Trend::Declining => base - TREND_ADJUSTMENT,
        Trend::Stable => base,
    };
    adjusted.clamp(0.0, 100.0)
}

/// Subjects at or above `threshold`.
pub fn classify_strong(grades: &BTreeMap<String, String>, threshold: &str) -> Vec<String> {
    let cutoff = grade_to_ordinal(threshold);
    grades
        .iter()
        .filter(|(_, grade)| grade_to_ordinal(grade) >= cutoff)
        .map(|(subject, _)| subject.clone())
        .collect()
}

/// Subjects strictly below `threshold`. Callers may use a different threshold
/// than for [`classify_strong`], leaving a middle band in neither list.
pub fn classify_weak(grades: &BTreeMap<String, String>, threshold: &str) -> Vec<String> {
    let cutoff = grade_to_ordinal(threshold);
    grades
        .iter()
        .filter(|(_, grade)| grade_to_ordinal(grade) < cutoff)
        .map(|(subject, _)| subject.clone())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformanceRecord {
    pub subject: String,
    pub current_grade: LetterGrade,
    pub grade_numeric: f64,
    pub trend: Trend,
    pub strength_score: f64,
    pub weakness_areas: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Builds the per-subject record for a freshly ingested grade.
///
/// `history` is oldest-first and already ends with `current`.
pub fn build_record(
    subject: &str,
    current: LetterGrade,
    history: &[f64],
    now: DateTime<Utc>,
) -> SubjectPerformanceRecord {
    let trend = analyze_trend(history);
    let grade_numeric = current.ordinal();
    let weakness_areas = if grade_numeric < WEAKNESS_ORDINAL {
        vec![format!("{subject} fundamentals")]
    } else {
        Vec::new()
    };

    SubjectPerformanceRecord {
        subject: subject.to_string(),
        current_grade: current,
        grade_numeric,
        trend,
        strength_score: strength_score(current.as_str(), trend),
        weakness_areas,
        last_updated: now,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreCutoffs {
    pub strong: f64,
    pub weak: f64,
}

impl Default for ScoreCutoffs {
    fn default() -> Self {
        Self {
            strong: 70.0,
            weak: 60.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub strong_subjects: Vec<SubjectPerformanceRecord>,
    pub weak_subjects: Vec<SubjectPerformanceRecord>,
    pub improving_subjects: Vec<String>,
    pub declining_subjects: Vec<String>,
}

pub fn summarize(records: &[SubjectPerformanceRecord], cutoffs: ScoreCutoffs) -> PerformanceSummary {
    let mut summary = PerformanceSummary::default();
    for record in records {
        if record.strength_score >= cutoffs.strong {
            summary.strong_subjects.push(record.clone());
        }
        if record.strength_score < cutoffs.weak {
            summary.weak_subjects.push(record.clone());
        }
        match record.trend {
            Trend::Improving => summary.improving_subjects.push(record.subject.clone()),
            Trend::Declining => summary.declining_subjects.push(record.subject.clone()),
            Trend::Stable => {}
        }
    }
    summary
}
