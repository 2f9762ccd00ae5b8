//! Numeric skeleton for study plans: weekly hour allocation, subject priority
//! and the weekly session layout.

pub mod allocator;
pub mod schedule;
pub mod term;

pub use allocator::{allocate, hours_needed, prioritize, study_window_days, StudyAllocation};
pub use schedule::{parse_active_days, weekly_schedule, DaySchedule, PlanSubject, StudySession};
