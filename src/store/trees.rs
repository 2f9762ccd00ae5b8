pub const REPORTS: &str = "reports";
pub const SUBJECT_PERFORMANCE: &str = "subject_performance";
pub const FLASHCARDS: &str = "flashcards";
pub const FLASHCARD_REVIEWS: &str = "flashcard_reviews";
pub const STUDY_PLANS: &str = "study_plans";
pub const META: &str = "meta";
