use crate::analytics::SubjectPerformanceRecord;
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    pub fn upsert_subject_performance(
        &self,
        user_id: &str,
        record: &SubjectPerformanceRecord,
    ) -> Result<(), StoreError> {
        let key = keys::performance_key(user_id, &record.subject)?;
        self.subject_performance
            .insert(key.as_bytes(), Self::serialize(record)?)?;
        Ok(())
    }

    pub fn get_subject_performance(
        &self,
        user_id: &str,
        subject: &str,
    ) -> Result<Option<SubjectPerformanceRecord>, StoreError> {
        let key = keys::performance_key(user_id, subject)?;
        match self.subject_performance.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Alphabetical by (case-folded) subject.
    pub fn list_subject_performance(
        &self,
        user_id: &str,
    ) -> Result<Vec<SubjectPerformanceRecord>, StoreError> {
        let prefix = keys::performance_prefix(user_id)?;
        let mut records = Vec::new();
        for item in self.subject_performance.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            records.push(Self::deserialize(&value)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::analytics::performance::build_record;
    use crate::analytics::LetterGrade;

    #[test]
    fn upsert_replaces_existing_subject() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let now = Utc::now();

        let first = build_record("Mathematics", LetterGrade::C, &[6.0], now);
        store.upsert_subject_performance("u1", &first).unwrap();
        let second = build_record("Mathematics", LetterGrade::A, &[6.0, 12.0], now);
        store.upsert_subject_performance("u1", &second).unwrap();

        let all = store.list_subject_performance("u1").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].current_grade, LetterGrade::A);

        let fetched = store
            .get_subject_performance("u1", "mathematics")
            .unwrap()
            .unwrap();
        assert_eq!(fetched.grade_numeric, 12.0);
        assert!(store.get_subject_performance("u2", "Mathematics").unwrap().is_none());
    }
}
