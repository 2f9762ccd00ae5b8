use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::planning::{DaySchedule, PlanSubject};
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    Generator,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: String,
    pub user_id: String,
    pub subjects: Vec<PlanSubject>,
    pub weak_subjects: Vec<String>,
    pub weekly_hours: f64,
    pub window_days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_schedule: Vec<DaySchedule>,
    pub recommendations: Vec<String>,
    pub source: PlanSource,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn create_study_plan(&self, plan: &StudyPlan) -> Result<(), StoreError> {
        let key = keys::study_plan_key(&plan.user_id, &plan.id)?;
        self.study_plans.insert(key.as_bytes(), Self::serialize(plan)?)?;
        Ok(())
    }

    pub fn get_study_plan(&self, user_id: &str, plan_id: &str) -> Result<StudyPlan, StoreError> {
        let key = keys::study_plan_key(user_id, plan_id)?;
        match self.study_plans.get(key.as_bytes())? {
            Some(raw) => Self::deserialize(&raw),
            None => Err(StoreError::NotFound {
                entity: "study plan".to_string(),
                key: plan_id.to_string(),
            }),
        }
    }

    /// Newest plan first.
    pub fn list_study_plans(&self, user_id: &str) -> Result<Vec<StudyPlan>, StoreError> {
        let prefix = keys::study_plan_prefix(user_id)?;
        let mut plans: Vec<StudyPlan> = Vec::new();
        for item in self.study_plans.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            plans.push(Self::deserialize(&value)?);
        }
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::tempdir;

    use super::*;

    fn plan(id: &str, user: &str, created_at: DateTime<Utc>) -> StudyPlan {
        let start = created_at.date_naive();
        StudyPlan {
            id: id.to_string(),
            user_id: user.to_string(),
            subjects: Vec::new(),
            weak_subjects: vec!["Physics".to_string()],
            weekly_hours: 5.0,
            window_days: 90,
            start_date: start,
            end_date: start + Duration::days(90),
            weekly_schedule: Vec::new(),
            recommendations: Vec::new(),
            source: PlanSource::Rules,
            created_at,
        }
    }

    #[test]
    fn plans_are_scoped_per_user_and_newest_first() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let now = Utc::now();

        store.create_study_plan(&plan("p1", "u1", now - Duration::days(1))).unwrap();
        store.create_study_plan(&plan("p2", "u1", now)).unwrap();
        store.create_study_plan(&plan("p3", "u2", now)).unwrap();

        let listed = store.list_study_plans("u1").unwrap();
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);

        assert_eq!(store.get_study_plan("u1", "p1").unwrap().id, "p1");
        assert!(matches!(
            store.get_study_plan("u2", "p1"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
