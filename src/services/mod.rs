pub mod content_generator;
pub mod performance;
pub mod reports;
pub mod study_plans;
