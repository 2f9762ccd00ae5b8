use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicReport {
    pub id: String,
    pub user_id: String,
    pub term: u32,
    pub year: i32,
    pub report_date: DateTime<Utc>,
    /// Normalized subject name to canonical letter grade.
    pub grades: BTreeMap<String, String>,
    pub overall_gpa: f64,
    pub uploaded_at: DateTime<Utc>,
}

impl Store {
    pub fn create_report(&self, report: &AcademicReport) -> Result<(), StoreError> {
        if report.grades.is_empty() {
            return Err(StoreError::Validation(
                "report must contain at least one grade".to_string(),
            ));
        }
        let key = keys::report_key(
            &report.user_id,
            report.report_date.timestamp_millis(),
            &report.id,
        )?;
        self.reports.insert(key.as_bytes(), Self::serialize(report)?)?;
        Ok(())
    }

    /// Newest report first.
    pub fn list_reports(&self, user_id: &str, limit: usize) -> Result<Vec<AcademicReport>, StoreError> {
        let prefix = keys::report_prefix(user_id)?;
        let mut reports = Vec::new();
        for item in self.reports.scan_prefix(prefix.as_bytes()).take(limit) {
            let (_, value) = item?;
            reports.push(Self::deserialize::<AcademicReport>(&value)?);
        }
        Ok(reports)
    }

    /// Every report of the user, oldest first.
    pub fn list_reports_chronological(&self, user_id: &str) -> Result<Vec<AcademicReport>, StoreError> {
        let prefix = keys::report_prefix(user_id)?;
        let mut reports = Vec::new();
        for item in self.reports.scan_prefix(prefix.as_bytes()).rev() {
            let (_, value) = item?;
            reports.push(Self::deserialize::<AcademicReport>(&value)?);
        }
        Ok(reports)
    }

    /// The report and the one immediately preceding it in time, if any.
    pub fn get_report_with_previous(
        &self,
        user_id: &str,
        report_id: &str,
    ) -> Result<(AcademicReport, Option<AcademicReport>), StoreError> {
        let prefix = keys::report_prefix(user_id)?;
        let mut iter = self.reports.scan_prefix(prefix.as_bytes());
        while let Some(item) = iter.next() {
            let (_, value) = item?;
            let report: AcademicReport = Self::deserialize(&value)?;
            if report.id != report_id {
                continue;
            }
            let previous = match iter.next() {
                Some(next) => {
                    let (_, raw) = next?;
                    Some(Self::deserialize::<AcademicReport>(&raw)?)
                }
                None => None,
            };
            return Ok((report, previous));
        }

        Err(StoreError::NotFound {
            entity: "report".to_string(),
            key: report_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    use super::*;

    fn report(id: &str, days: i64, grade: &str) -> AcademicReport {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days);
        let mut grades = BTreeMap::new();
        grades.insert("Mathematics".to_string(), grade.to_string());
        AcademicReport {
            id: id.to_string(),
            user_id: "u1".to_string(),
            term: 1,
            year: 2024,
            report_date: date,
            grades,
            overall_gpa: 3.0,
            uploaded_at: date,
        }
    }

    #[test]
    fn reports_list_newest_first_and_chronological() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.create_report(&report("r1", 0, "C")).unwrap();
        store.create_report(&report("r3", 200, "A")).unwrap();
        store.create_report(&report("r2", 100, "B")).unwrap();

        let newest: Vec<String> = store
            .list_reports("u1", 10)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(newest, vec!["r3", "r2", "r1"]);

        let oldest: Vec<String> = store
            .list_reports_chronological("u1")
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(oldest, vec!["r1", "r2", "r3"]);

        assert_eq!(store.list_reports("u1", 1).unwrap().len(), 1);
    }

    #[test]
    fn previous_report_is_the_one_before_in_time() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.create_report(&report("r1", 0, "C")).unwrap();
        store.create_report(&report("r2", 100, "B")).unwrap();

        let (current, previous) = store.get_report_with_previous("u1", "r2").unwrap();
        assert_eq!(current.id, "r2");
        assert_eq!(previous.map(|r| r.id).as_deref(), Some("r1"));

        let (_, none) = store.get_report_with_previous("u1", "r1").unwrap();
        assert!(none.is_none());

        let err = store.get_report_with_previous("u1", "missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn empty_report_is_rejected() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let mut empty = report("r1", 0, "C");
        empty.grades.clear();
        assert!(matches!(
            store.create_report(&empty),
            Err(StoreError::Validation(_))
        ));
    }
}
