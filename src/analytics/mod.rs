//! Grade conversion, trend detection and per-subject performance scoring.
//!
//! Everything here is pure: no I/O, no shared state, no error paths. Malformed
//! input degrades to documented defaults instead of failing.

pub mod career;
pub mod extract;
pub mod gpa;
pub mod grade_scale;
pub mod performance;
pub mod report;
pub mod trend;

pub use grade_scale::{grade_to_gpa, grade_to_ordinal, ordinal_to_grade, LetterGrade};
pub use performance::{strength_score, SubjectPerformanceRecord};
pub use trend::{analyze_trend, predict_next, Trend};
