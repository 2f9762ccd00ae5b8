use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;

use crate::flashcards::{apply_review, Difficulty, FlashcardState, ReviewOutcome};
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub topic: String,
    pub question: String,
    pub answer: String,
    #[serde(flatten)]
    pub state: FlashcardState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardReviewLog {
    pub id: String,
    pub card_id: String,
    pub user_id: String,
    pub correct: bool,
    pub difficulty_before: Difficulty,
    pub difficulty_after: Difficulty,
    pub mastery: f64,
    pub reviewed_at: DateTime<Utc>,
}

impl Store {
    pub fn create_flashcard(&self, card: &Flashcard) -> Result<(), StoreError> {
        let key = keys::flashcard_key(&card.user_id, &card.id)?;
        self.flashcards.insert(key.as_bytes(), Self::serialize(card)?)?;
        Ok(())
    }

    pub fn create_flashcards(&self, cards: &[Flashcard]) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        for card in cards {
            let key = keys::flashcard_key(&card.user_id, &card.id)?;
            batch.insert(key.as_bytes(), Self::serialize(card)?);
        }
        self.flashcards.apply_batch(batch)?;
        Ok(())
    }

    pub fn get_flashcard(&self, user_id: &str, card_id: &str) -> Result<Flashcard, StoreError> {
        let key = keys::flashcard_key(user_id, card_id)?;
        match self.flashcards.get(key.as_bytes())? {
            Some(raw) => Self::deserialize(&raw),
            None => Err(StoreError::NotFound {
                entity: "flashcard".to_string(),
                key: card_id.to_string(),
            }),
        }
    }

    /// Subject match is case-insensitive.
    pub fn list_flashcards(
        &self,
        user_id: &str,
        subject: Option<&str>,
    ) -> Result<Vec<Flashcard>, StoreError> {
        let prefix = keys::flashcard_prefix(user_id)?;
        let mut cards = Vec::new();
        for item in self.flashcards.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            let card: Flashcard = Self::deserialize(&value)?;
            if subject.map_or(true, |s| card.subject.eq_ignore_ascii_case(s)) {
                cards.push(card);
            }
        }
        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(cards)
    }

    /// Cards whose next review is at or before `now`, most overdue first.
    pub fn list_due_flashcards(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Flashcard>, StoreError> {
        let mut due: Vec<Flashcard> = self
            .list_flashcards(user_id, None)?
            .into_iter()
            .filter(|card| card.state.is_due(now))
            .collect();
        due.sort_by(|a, b| {
            a.state
                .next_review_date
                .cmp(&b.state.next_review_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        due.truncate(limit);
        Ok(due)
    }

    /// Applies one review to the stored card and appends its log entry.
    ///
    /// The card is read, updated and written back inside a single transaction
    /// over both trees, so overlapping reviews of the same card are serialized
    /// and each one is scheduled from the counters the previous one committed.
    pub fn review_flashcard(
        &self,
        user_id: &str,
        card_id: &str,
        correct: bool,
        review_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Flashcard, ReviewOutcome), StoreError> {
        let card_key = keys::flashcard_key(user_id, card_id)?;
        let review_key = keys::review_key(card_id, now.timestamp_millis(), review_id)?;

        let (card, outcome) = (&self.flashcards, &self.flashcard_reviews)
            .transaction(|(tx_cards, tx_reviews)| {
                let Some(raw) = tx_cards.get(card_key.as_bytes())? else {
                    return Err(ConflictableTransactionError::Abort(StoreError::NotFound {
                        entity: "flashcard".to_string(),
                        key: card_id.to_string(),
                    }));
                };
                let mut card: Flashcard =
                    Self::deserialize(&raw).map_err(ConflictableTransactionError::Abort)?;

                let outcome = apply_review(&card.state, correct, now);
                card.state = outcome.state.clone();

                let log = FlashcardReviewLog {
                    id: review_id.to_string(),
                    card_id: card.id.clone(),
                    user_id: card.user_id.clone(),
                    correct,
                    difficulty_before: outcome.previous_difficulty,
                    difficulty_after: outcome.state.difficulty,
                    mastery: outcome.mastery,
                    reviewed_at: now,
                };

                let card_value =
                    Self::serialize(&card).map_err(ConflictableTransactionError::Abort)?;
                let log_value =
                    Self::serialize(&log).map_err(ConflictableTransactionError::Abort)?;
                tx_cards.insert(card_key.as_bytes(), card_value)?;
                tx_reviews.insert(review_key.as_bytes(), log_value)?;
                Ok((card, outcome))
            })
            .map_err(|error: TransactionError<StoreError>| match error {
                TransactionError::Abort(store_error) => store_error,
                TransactionError::Storage(storage_error) => StoreError::Sled(storage_error),
            })?;

        Ok((card, outcome))
    }

    /// Newest review first.
    pub fn list_flashcard_reviews(
        &self,
        card_id: &str,
        limit: usize,
    ) -> Result<Vec<FlashcardReviewLog>, StoreError> {
        let prefix = keys::review_prefix(card_id)?;
        let mut logs = Vec::new();
        for item in self.flashcard_reviews.scan_prefix(prefix.as_bytes()).take(limit) {
            let (_, value) = item?;
            logs.push(Self::deserialize(&value)?);
        }
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::tempdir;

    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn card(id: &str, subject: &str, now: DateTime<Utc>) -> Flashcard {
        Flashcard {
            id: id.to_string(),
            user_id: "u1".to_string(),
            subject: subject.to_string(),
            topic: "Algebra".to_string(),
            question: "2x = 4, x = ?".to_string(),
            answer: "2".to_string(),
            state: FlashcardState::new(Difficulty::Medium, now),
            created_at: now,
        }
    }

    #[test]
    fn flashcard_serializes_state_flat() {
        let now = Utc::now();
        let json = serde_json::to_value(card("c1", "Mathematics", now)).unwrap();
        assert_eq!(json["timesReviewed"], 0);
        assert_eq!(json["difficulty"], "medium");
        assert!(json.get("state").is_none());
    }

    #[test]
    fn due_listing_excludes_future_cards() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let now = Utc::now();

        let due = card("c1", "Mathematics", now - Duration::hours(1));
        let mut later = card("c2", "Physics", now);
        later.state.next_review_date = now + Duration::days(3);
        store.create_flashcards(&[due, later]).unwrap();

        let listed = store.list_due_flashcards("u1", now, 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "c1");

        let physics = store.list_flashcards("u1", Some("physics")).unwrap();
        assert_eq!(physics.len(), 1);
    }

    #[test]
    fn review_updates_card_and_appends_log() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let now = Utc::now();
        store.create_flashcard(&card("c1", "Mathematics", now)).unwrap();

        let (updated, outcome) = store.review_flashcard("u1", "c1", true, "rv1", now).unwrap();
        assert_eq!(updated.state.times_reviewed, 1);
        assert_eq!(outcome.interval_days, 1);

        let fetched = store.get_flashcard("u1", "c1").unwrap();
        assert_eq!(fetched, updated);
        let logs = store.list_flashcard_reviews("c1", 10).unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].correct);
        assert_eq!(logs[0].mastery, outcome.mastery);
    }

    #[test]
    fn reviews_after_stale_reads_each_count_once() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let now = Utc::now();
        store.create_flashcard(&card("c1", "Mathematics", now)).unwrap();

        // both callers looked at the card before either review landed
        let first_view = store.get_flashcard("u1", "c1").unwrap();
        let second_view = store.get_flashcard("u1", "c1").unwrap();
        assert_eq!(first_view.state.times_reviewed, 0);
        assert_eq!(second_view.state.times_reviewed, 0);

        let (_, first) = store.review_flashcard("u1", "c1", true, "rv1", now).unwrap();
        let (_, second) = store
            .review_flashcard("u1", "c1", true, "rv2", now + Duration::seconds(1))
            .unwrap();

        // medium[0] then medium[1]: the second review saw the first one's counters
        assert_eq!(first.interval_days, 1);
        assert_eq!(second.interval_days, 2);

        let stored = store.get_flashcard("u1", "c1").unwrap();
        assert_eq!(stored.state.times_reviewed, 2);
        assert_eq!(stored.state.times_correct, 2);
        assert_eq!(store.list_flashcard_reviews("c1", 10).unwrap().len(), 2);
    }

    #[test]
    fn concurrent_reviews_never_lose_an_increment() {
        let dir = tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path().join("db").to_str().unwrap()).unwrap());
        let now = Utc::now();
        store.create_flashcard(&card("c1", "Mathematics", now)).unwrap();

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .review_flashcard("u1", "c1", i % 2 == 0, &format!("rv{i}"), now)
                        .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let stored = store.get_flashcard("u1", "c1").unwrap();
        assert_eq!(stored.state.times_reviewed, 8);
        assert_eq!(stored.state.times_correct, 4);
        assert_eq!(store.list_flashcard_reviews("c1", 20).unwrap().len(), 8);
    }

    #[test]
    fn review_of_missing_card_is_not_found() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        let err = store
            .review_flashcard("u1", "ghost", false, "rv1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.list_flashcard_reviews("ghost", 10).unwrap().is_empty());
    }
}
