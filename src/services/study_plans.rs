use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use crate::config::AnalyticsConfig;
use crate::planning::allocator::WEEKLY_HOURS_PER_WEAK_SUBJECT;
use crate::planning::schedule::plan_subjects;
use crate::planning::{allocate, study_window_days, weekly_schedule};
use crate::services::content_generator::{ContentGenerator, GeneratedPlan, StudyPlanPrompt};
use crate::store::operations::study_plans::{PlanSource, StudyPlan};
use crate::store::{Store, StoreError};

/// Already-validated plan request: subjects normalized, days parsed.
#[derive(Debug, Clone)]
pub struct NewStudyPlan {
    pub user_id: String,
    /// Empty means every subject the user has a performance record for.
    pub subjects: Vec<String>,
    pub weekly_hours: Option<f64>,
    pub exam_date: Option<NaiveDate>,
    pub active_days: Vec<Weekday>,
    pub focus_topics: BTreeMap<String, Vec<String>>,
}

pub fn fallback_plan_recommendations() -> Vec<String> {
    vec![
        "Study regularly for consistent progress".to_string(),
        "Take short breaks between study sessions".to_string(),
        "Review your notes daily".to_string(),
    ]
}

/// Builds and stores a study plan.
///
/// Weak subjects are the requested subjects whose performance record scores
/// below the weak cutoff. When none of the requested subjects has a record
/// yet, all of them are treated as weak. The generator only contributes
/// focus text, strategies and recommendations (and optionally a schedule);
/// when it is unavailable the plan is built entirely from the rules.
pub async fn generate_study_plan(
    store: &Store,
    generator: &ContentGenerator,
    input: NewStudyPlan,
    analytics: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Result<StudyPlan, StoreError> {
    let records = store.list_subject_performance(&input.user_id)?;
    let subjects = if input.subjects.is_empty() {
        records.iter().map(|r| r.subject.clone()).collect()
    } else {
        input.subjects
    };
    if subjects.is_empty() {
        return Err(StoreError::Validation(
            "no subjects to plan: name subjects or upload a report first".to_string(),
        ));
    }

    let known: Vec<_> = records
        .iter()
        .filter(|r| subjects.iter().any(|s| s.eq_ignore_ascii_case(&r.subject)))
        .collect();
    let weak_subjects: Vec<String> = if known.is_empty() {
        subjects.clone()
    } else {
        subjects
            .iter()
            .filter(|s| {
                known.iter().any(|r| {
                    r.subject.eq_ignore_ascii_case(s) && r.strength_score < analytics.weak_score_cutoff
                })
            })
            .cloned()
            .collect()
    };

    let grades = store
        .list_reports(&input.user_id, 1)?
        .into_iter()
        .next()
        .map(|r| r.grades)
        .unwrap_or_default();

    let today = now.date_naive();
    let window_days = study_window_days(input.exam_date, today);
    let allocations = allocate(&weak_subjects, &grades, None, input.exam_date, today);
    let weekly_hours = input.weekly_hours.unwrap_or_else(|| {
        let allocated: f64 = allocations.iter().map(|a| a.weekly_hours).sum();
        if allocated > 0.0 {
            allocated
        } else {
            WEEKLY_HOURS_PER_WEAK_SUBJECT * subjects.len() as f64
        }
    });

    let prompt = StudyPlanPrompt {
        subjects: &subjects,
        weak_subjects: &weak_subjects,
        weekly_hours,
        window_days,
    };
    let (generated, source) = match generator.study_plan(&prompt).await {
        Ok(plan) => (plan, PlanSource::Generator),
        Err(error) => {
            tracing::warn!(user_id = %input.user_id, error = %error, "Study plan falls back to rules");
            (GeneratedPlan::default(), PlanSource::Rules)
        }
    };

    let schedule = if generated.weekly_schedule.is_empty() {
        weekly_schedule(&subjects, &allocations, weekly_hours, &input.active_days)
    } else {
        generated.weekly_schedule
    };
    let plan_entries = plan_subjects(
        &subjects,
        &allocations,
        &schedule,
        &input.focus_topics,
        &generated.focus_areas,
        &generated.strategies,
    );
    let recommendations = if generated.recommendations.is_empty() {
        fallback_plan_recommendations()
    } else {
        generated.recommendations
    };

    let plan = StudyPlan {
        id: Uuid::new_v4().to_string(),
        user_id: input.user_id,
        subjects: plan_entries,
        weak_subjects,
        weekly_hours,
        window_days,
        start_date: today,
        end_date: today + Duration::days(window_days),
        weekly_schedule: schedule,
        recommendations,
        source,
        created_at: now,
    };
    store.create_study_plan(&plan)?;

    tracing::info!(
        user_id = %plan.user_id,
        plan_id = %plan.id,
        subjects = plan.subjects.len(),
        weak = plan.weak_subjects.len(),
        source = ?plan.source,
        "Study plan created"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;
    use crate::config::LLMConfig;
    use crate::services::reports::{ingest_report, NewReport};

    fn generator(enabled: bool) -> ContentGenerator {
        ContentGenerator::new(&LLMConfig {
            enabled,
            mock: true,
            ..LLMConfig::default()
        })
    }

    fn request(user: &str, subjects: &[&str]) -> NewStudyPlan {
        NewStudyPlan {
            user_id: user.to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            weekly_hours: None,
            exam_date: None,
            active_days: crate::planning::parse_active_days(&[]).unwrap(),
            focus_topics: BTreeMap::new(),
        }
    }

    fn seed(store: &Store, user: &str) {
        let grades: BTreeMap<String, String> = [
            ("Mathematics".to_string(), "D".to_string()),
            ("English".to_string(), "A".to_string()),
        ]
        .into_iter()
        .collect();
        let input = NewReport {
            user_id: user.to_string(),
            term: 1,
            year: 2025,
            report_date: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
            grades,
        };
        ingest_report(store, input, &AnalyticsConfig::default(), Utc::now()).unwrap();
    }

    #[tokio::test]
    async fn weak_subjects_come_from_performance_records() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        seed(&store, "u1");

        let now = Utc.with_ymd_and_hms(2025, 5, 5, 8, 0, 0).unwrap();
        let plan = generate_study_plan(
            &store,
            &generator(false),
            request("u1", &[]),
            &AnalyticsConfig::default(),
            now,
        )
        .await
        .unwrap();

        assert_eq!(plan.weak_subjects, vec!["Mathematics".to_string()]);
        assert_eq!(plan.source, PlanSource::Rules);
        assert_eq!(plan.weekly_hours, 2.5);
        assert_eq!(plan.window_days, 90);
        assert_eq!(plan.subjects[0].subject, "Mathematics");
        assert_eq!(plan.recommendations, fallback_plan_recommendations());
        assert_eq!(plan.weekly_schedule[0].sessions[0].subject, "Mathematics");

        let stored = store.get_study_plan("u1", &plan.id).unwrap();
        assert_eq!(stored, plan);
    }

    #[tokio::test]
    async fn unknown_subjects_are_all_weak_and_generator_guidance_is_used() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let plan = generate_study_plan(
            &store,
            &generator(true),
            request("u2", &["Chemistry", "Biology"]),
            &AnalyticsConfig::default(),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(plan.weak_subjects.len(), 2);
        assert_eq!(plan.source, PlanSource::Generator);
        assert_eq!(plan.weekly_hours, 5.0);
        assert_eq!(plan.recommendations, vec!["Start each week with Chemistry".to_string()]);
        assert!(plan.subjects.iter().all(|s| s.study_strategy.contains("past paper")));
    }

    #[tokio::test]
    async fn nothing_to_plan_is_a_validation_error() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let err = generate_study_plan(
            &store,
            &generator(false),
            request("u3", &[]),
            &AnalyticsConfig::default(),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
