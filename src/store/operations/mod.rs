pub mod flashcards;
pub mod performance;
pub mod reports;
pub mod study_plans;
