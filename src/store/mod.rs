pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub reports: sled::Tree,
    pub subject_performance: sled::Tree,
    pub flashcards: sled::Tree,
    pub flashcard_reviews: sled::Tree,
    pub study_plans: sled::Tree,
    pub meta: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let reports = db.open_tree(trees::REPORTS)?;
        let subject_performance = db.open_tree(trees::SUBJECT_PERFORMANCE)?;
        let flashcards = db.open_tree(trees::FLASHCARDS)?;
        let flashcard_reviews = db.open_tree(trees::FLASHCARD_REVIEWS)?;
        let study_plans = db.open_tree(trees::STUDY_PLANS)?;
        let meta = db.open_tree(trees::META)?;

        Ok(Self {
            db,
            reports,
            subject_performance,
            flashcards,
            flashcard_reviews,
            study_plans,
            meta,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Cheap read against the meta tree, used by health checks.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.meta.get(b"_meta:ping")?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
