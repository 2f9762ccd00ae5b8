use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::gpa::calculate_gpa;
use crate::analytics::performance::build_record;
use crate::analytics::report::{analyze_report, ReportAnalysis};
use crate::analytics::{LetterGrade, SubjectPerformanceRecord};
use crate::config::AnalyticsConfig;
use crate::store::operations::reports::AcademicReport;
use crate::store::{Store, StoreError};

/// Already-validated report input: subjects normalized, grades canonical.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: String,
    pub term: u32,
    pub year: i32,
    pub report_date: DateTime<Utc>,
    pub grades: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedReport {
    pub report: AcademicReport,
    pub analysis: ReportAnalysis,
    pub performance: Vec<SubjectPerformanceRecord>,
}

/// Stores the report and rebuilds the performance record of every subject it
/// mentions from the user's full report history.
pub fn ingest_report(
    store: &Store,
    input: NewReport,
    analytics: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Result<IngestedReport, StoreError> {
    let report = AcademicReport {
        id: Uuid::new_v4().to_string(),
        user_id: input.user_id,
        term: input.term,
        year: input.year,
        report_date: input.report_date,
        overall_gpa: calculate_gpa(&input.grades),
        grades: input.grades,
        uploaded_at: now,
    };
    store.create_report(&report)?;

    let subjects: BTreeSet<&str> = report.grades.keys().map(String::as_str).collect();
    let performance = rebuild_performance(store, &report.user_id, &subjects, now)?;

    let (_, previous) = store.get_report_with_previous(&report.user_id, &report.id)?;
    let analysis = analyze_report(
        &report.grades,
        previous.as_ref().map(|p| &p.grades),
        analytics.strong_grade_threshold.as_str(),
        analytics.weak_grade_threshold.as_str(),
    );

    tracing::info!(
        user_id = %report.user_id,
        report_id = %report.id,
        subjects = report.grades.len(),
        overall_gpa = report.overall_gpa,
        "Report ingested"
    );

    Ok(IngestedReport {
        report,
        analysis,
        performance,
    })
}

/// Oldest-first ordinal history per subject across all of a user's reports.
pub fn subject_histories(
    reports: &[AcademicReport],
) -> BTreeMap<String, Vec<(DateTime<Utc>, LetterGrade)>> {
    let mut histories: BTreeMap<String, Vec<(DateTime<Utc>, LetterGrade)>> = BTreeMap::new();
    for report in reports {
        for (subject, grade) in &report.grades {
            if let Some(letter) = LetterGrade::parse(grade) {
                histories
                    .entry(subject.clone())
                    .or_default()
                    .push((report.report_date, letter));
            }
        }
    }
    for history in histories.values_mut() {
        history.sort_by_key(|(date, _)| *date);
    }
    histories
}

// A backdated report may not be the newest one for a subject, so the current
// grade is whatever the latest report says.
fn rebuild_performance(
    store: &Store,
    user_id: &str,
    subjects: &BTreeSet<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<SubjectPerformanceRecord>, StoreError> {
    let reports = store.list_reports_chronological(user_id)?;
    let histories = subject_histories(&reports);

    let mut records = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let Some(history) = histories.get(*subject) else {
            continue;
        };
        let Some((_, current)) = history.last() else {
            continue;
        };
        let ordinals: Vec<f64> = history.iter().map(|(_, g)| g.ordinal()).collect();
        let record = build_record(subject, *current, &ordinals, now);
        store.upsert_subject_performance(user_id, &record)?;
        records.push(record);
    }
    Ok(records)
}
