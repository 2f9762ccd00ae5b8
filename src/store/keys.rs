use crate::store::StoreError;

/// Key segments are joined with `:`, so a segment may not contain one.
fn segment<'a>(kind: &str, value: &'a str) -> Result<&'a str, StoreError> {
    if value.is_empty() || value.contains(':') {
        return Err(StoreError::Validation(format!(
            "invalid {kind}: must be non-empty and must not contain ':'"
        )));
    }
    Ok(value)
}

fn reverse_ts(timestamp_ms: i64) -> u64 {
    u64::MAX - timestamp_ms.max(0) as u64
}

/// Newest report first within a user's prefix.
pub fn report_key(user_id: &str, report_date_ms: i64, report_id: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{:020}:{}",
        segment("user id", user_id)?,
        reverse_ts(report_date_ms),
        segment("report id", report_id)?
    ))
}

pub fn report_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("user id", user_id)?))
}

/// Subjects are stored case-folded so "Mathematics" and "MATHEMATICS" upsert
/// the same record.
pub fn performance_key(user_id: &str, subject: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{}",
        segment("user id", user_id)?,
        segment("subject", subject)?.to_lowercase()
    ))
}

pub fn performance_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("user id", user_id)?))
}

pub fn flashcard_key(user_id: &str, card_id: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{}",
        segment("user id", user_id)?,
        segment("card id", card_id)?
    ))
}

pub fn flashcard_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("user id", user_id)?))
}

/// Reviews of one card, newest first.
pub fn review_key(card_id: &str, reviewed_at_ms: i64, review_id: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{:020}:{}",
        segment("card id", card_id)?,
        reverse_ts(reviewed_at_ms),
        segment("review id", review_id)?
    ))
}

pub fn review_prefix(card_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("card id", card_id)?))
}

pub fn study_plan_key(user_id: &str, plan_id: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{}",
        segment("user id", user_id)?,
        segment("plan id", plan_id)?
    ))
}

pub fn study_plan_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", segment("user id", user_id)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_key_orders_by_time_desc() {
        let newer = report_key("u1", 2_000, "r2").unwrap();
        let older = report_key("u1", 1_000, "r1").unwrap();
        assert!(newer < older);
        assert!(newer.starts_with(&report_prefix("u1").unwrap()));
    }

    #[test]
    fn performance_key_folds_case() {
        assert_eq!(
            performance_key("u1", "Mathematics").unwrap(),
            performance_key("u1", "MATHEMATICS").unwrap()
        );
    }

    #[test]
    fn separators_are_rejected() {
        assert!(matches!(flashcard_key("u:1", "c1"), Err(StoreError::Validation(_))));
        assert!(matches!(performance_key("u1", ""), Err(StoreError::Validation(_))));
    }
}
