use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::performance::{summarize, PerformanceSummary, ScoreCutoffs};
use crate::analytics::trend::{GradeTrendSeries, Prediction};
use crate::constants::DASHBOARD_RECENT_REPORTS;
use crate::services::reports::subject_histories;
use crate::store::operations::reports::AcademicReport;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardStats {
    pub total: usize,
    pub due: usize,
    pub average_mastery: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub overall_gpa: Option<f64>,
    #[serde(flatten)]
    pub summary: PerformanceSummary,
    pub recent_reports: Vec<AcademicReport>,
    pub flashcards: FlashcardStats,
}

pub fn dashboard(
    store: &Store,
    user_id: &str,
    cutoffs: ScoreCutoffs,
    now: DateTime<Utc>,
) -> Result<Dashboard, StoreError> {
    let records = store.list_subject_performance(user_id)?;
    let recent_reports = store.list_reports(user_id, DASHBOARD_RECENT_REPORTS)?;

    let cards = store.list_flashcards(user_id, None)?;
    let flashcards = if cards.is_empty() {
        FlashcardStats::default()
    } else {
        let total_mastery: f64 = cards.iter().map(|c| c.state.mastery()).sum();
        FlashcardStats {
            total: cards.len(),
            due: cards.iter().filter(|c| c.state.is_due(now)).count(),
            average_mastery: total_mastery / cards.len() as f64,
        }
    };

    Ok(Dashboard {
        overall_gpa: recent_reports.first().map(|r| r.overall_gpa),
        summary: summarize(&records, cutoffs),
        recent_reports,
        flashcards,
    })
}

/// One series per subject, alphabetical. `subject` filters case-insensitively.
pub fn trends(
    store: &Store,
    user_id: &str,
    subject: Option<&str>,
) -> Result<Vec<GradeTrendSeries>, StoreError> {
    let reports = store.list_reports_chronological(user_id)?;
    let series = subject_histories(&reports)
        .into_iter()
        .filter(|(name, _)| subject.map_or(true, |s| name.eq_ignore_ascii_case(s.trim())))
        .map(|(name, history)| {
            let observations = history
                .into_iter()
                .map(|(date, grade)| (date, grade.ordinal()))
                .collect();
            GradeTrendSeries::from_observations(&name, observations)
        })
        .collect();
    Ok(series)
}

pub fn predictions(store: &Store, user_id: &str) -> Result<Vec<Prediction>, StoreError> {
    Ok(trends(store, user_id, None)?
        .iter()
        .map(Prediction::from_series)
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    use super::*;
    use crate::analytics::{LetterGrade, Trend};
    use crate::config::AnalyticsConfig;
    use crate::services::reports::{ingest_report, NewReport};

    fn seed(store: &Store) {
        let cfg = AnalyticsConfig::default();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (days, maths, english) in [(0, "C", "A"), (100, "B", "B+"), (200, "A-", "B")] {
            let grades: BTreeMap<String, String> = [
                ("Mathematics".to_string(), maths.to_string()),
                ("English".to_string(), english.to_string()),
            ]
            .into_iter()
            .collect();
            let input = NewReport {
                user_id: "u1".to_string(),
                term: 1,
                year: 2024,
                report_date: base + Duration::days(days),
                grades,
            };
            ingest_report(store, input, &cfg, Utc::now()).unwrap();
        }
    }

    #[test]
    fn trends_are_oldest_first_and_filterable() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        seed(&store);

        let all = trends(&store, "u1", None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].subject, "English");
        assert_eq!(all[0].trend, Trend::Declining);

        let maths = trends(&store, "u1", Some("mathematics")).unwrap();
        assert_eq!(maths.len(), 1);
        assert_eq!(maths[0].grades, vec![6.0, 9.0, 11.0]);
        assert_eq!(maths[0].trend, Trend::Improving);
    }

    #[test]
    fn predictions_follow_trend() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        seed(&store);

        let preds = predictions(&store, "u1").unwrap();
        let maths = preds.iter().find(|p| p.subject == "Mathematics").unwrap();
        assert_eq!(maths.current_grade, LetterGrade::AMinus);
        assert_eq!(
            maths.predicted_next_grade,
            LetterGrade::from_ordinal((6.0 + 9.0 + 11.0) / 3.0 + 0.5)
        );
        assert_eq!(maths.confidence, 0.7);
    }

    #[test]
    fn dashboard_for_new_user_is_empty() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let view = dashboard(&store, "nobody", ScoreCutoffs::default(), Utc::now()).unwrap();
        assert!(view.overall_gpa.is_none());
        assert!(view.recent_reports.is_empty());
        assert_eq!(view.flashcards.total, 0);
    }
}
