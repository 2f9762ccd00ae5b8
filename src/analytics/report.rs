use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::gpa::calculate_gpa;
use super::grade_scale::grade_to_ordinal;
use super::performance::{classify_strong, classify_weak};
use super::trend::Trend;

pub const DEFAULT_STRONG_THRESHOLD: &str = "B+";
pub const DEFAULT_WEAK_THRESHOLD: &str = "B";

/// Report-to-report direction per subject of `current`. Subjects absent from
/// `previous` compare against E; with no previous report everything is stable.
pub fn compare_reports(
    current: &BTreeMap<String, String>,
    previous: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, Trend> {
    current
        .iter()
        .map(|(subject, grade)| {
            let trend = match previous {
                None => Trend::Stable,
                Some(prev) => {
                    let now = grade_to_ordinal(grade);
                    let before = grade_to_ordinal(prev.get(subject).map(String::as_str).unwrap_or("E"));
                    if now > before {
                        Trend::Improving
                    } else if now < before {
                        Trend::Declining
                    } else {
                        Trend::Stable
                    }
                }
            };
            (subject.clone(), trend)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAnalysis {
    pub overall_gpa: f64,
    pub subject_count: usize,
    pub strong_subjects: Vec<String>,
    pub weak_subjects: Vec<String>,
    pub trend_analysis: BTreeMap<String, Trend>,
}

pub fn analyze_report(
    grades: &BTreeMap<String, String>,
    previous: Option<&BTreeMap<String, String>>,
    strong_threshold: &str,
    weak_threshold: &str,
) -> ReportAnalysis {
    ReportAnalysis {
        overall_gpa: calculate_gpa(grades),
        subject_count: grades.len(),
        strong_subjects: classify_strong(grades, strong_threshold),
        weak_subjects: classify_weak(grades, weak_threshold),
        trend_analysis: compare_reports(grades, previous),
    }
}

/// Rule-based recommendations used when no content generator answer is available.
pub fn fallback_recommendations(strong: &[String], weak: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    if !weak.is_empty() {
        let names: Vec<&str> = weak.iter().take(3).map(String::as_str).collect();
        out.push(format!("Focus on improving {}", names.join(", ")));
    }
    if !strong.is_empty() {
        let names: Vec<&str> = strong.iter().take(2).map(String::as_str).collect();
        out.push(format!("Maintain excellence in {}", names.join(", ")));
    }
    if out.is_empty() {
        out.push("Keep up the consistent study habits for continued success".to_string());
    }
    out
}
