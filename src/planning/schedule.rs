//! Weekly study skeleton: spreads ranked subjects across the active days of a
//! week and derives the per-subject plan entries from it.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::allocator::StudyAllocation;

pub const WEAK_SUBJECT_PRIORITY: u8 = 8;
pub const DEFAULT_SUBJECT_PRIORITY: u8 = 5;
const SESSION_FOCUS: &str = "Review key concepts and practice problems";

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub subject: String,
    pub duration_minutes: u32,
    pub focus: String,
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day: String,
    pub is_active: bool,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSubject {
    pub subject: String,
    pub priority: u8,
    pub weekly_minutes: u32,
    pub focus_area: String,
    pub study_strategy: String,
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses day names ("Monday", "mon", ...). An empty list means every day.
/// Duplicates collapse; the result is in week order.
pub fn parse_active_days(raw: &[String]) -> Result<Vec<Weekday>, String> {
    if raw.is_empty() {
        return Ok(WEEK.to_vec());
    }
    let mut parsed = Vec::with_capacity(raw.len());
    for name in raw {
        let day: Weekday = name
            .trim()
            .parse()
            .map_err(|_| format!("unknown day: {}", name.trim()))?;
        parsed.push(day);
    }
    Ok(WEEK.into_iter().filter(|d| parsed.contains(d)).collect())
}

/// Ranked subjects first (allocation order), then the remaining subjects in
/// input order.
fn rotation(subjects: &[String], allocations: &[StudyAllocation]) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::with_capacity(subjects.len());
    let ranked = allocations.iter().map(|a| &a.subject);
    for subject in ranked.chain(subjects.iter()) {
        if !ordered.contains(subject) {
            ordered.push(subject.clone());
        }
    }
    ordered
}

/// One session per active day. The `k`-th active day takes the `k`-th subject
/// of the rotation, wrapping around, and every active day gets an equal share
/// of `weekly_hours` (whole minutes, rounded down).
pub fn weekly_schedule(
    subjects: &[String],
    allocations: &[StudyAllocation],
    weekly_hours: f64,
    active_days: &[Weekday],
) -> Vec<DaySchedule> {
    let order = rotation(subjects, allocations);
    let active_count = WEEK.iter().filter(|d| active_days.contains(d)).count();
    let minutes_per_day = if active_count == 0 {
        0
    } else {
        (weekly_hours.max(0.0) * 60.0 / active_count as f64).floor() as u32
    };

    let mut active_index = 0;
    WEEK.iter()
        .map(|day| {
            let is_active = active_days.contains(day);
            let sessions = if is_active && !order.is_empty() {
                let subject = &order[active_index % order.len()];
                active_index += 1;
                let weak = allocations.iter().any(|a| &a.subject == subject);
                vec![StudySession {
                    subject: subject.clone(),
                    duration_minutes: minutes_per_day,
                    focus: SESSION_FOCUS.to_string(),
                    priority: if weak {
                        WEAK_SUBJECT_PRIORITY
                    } else {
                        DEFAULT_SUBJECT_PRIORITY
                    },
                }]
            } else {
                Vec::new()
            };
            DaySchedule {
                day: day_name(*day).to_string(),
                is_active,
                sessions,
            }
        })
        .collect()
}

/// Per-subject plan entries. User focus topics win over generator focus text;
/// generator strategies win over the rule text.
pub fn plan_subjects(
    subjects: &[String],
    allocations: &[StudyAllocation],
    schedule: &[DaySchedule],
    focus_topics: &BTreeMap<String, Vec<String>>,
    generated_focus: &BTreeMap<String, String>,
    generated_strategies: &BTreeMap<String, String>,
) -> Vec<PlanSubject> {
    rotation(subjects, allocations)
        .into_iter()
        .map(|subject| {
            let weekly_minutes: u32 = schedule
                .iter()
                .flat_map(|day| day.sessions.iter())
                .filter(|s| s.subject == subject)
                .map(|s| s.duration_minutes)
                .sum();
            let priority = if allocations.iter().any(|a| a.subject == subject) {
                WEAK_SUBJECT_PRIORITY
            } else {
                DEFAULT_SUBJECT_PRIORITY
            };

            let topics = focus_topics.get(&subject).filter(|t| !t.is_empty());
            let focus_area = match (topics, non_blank(generated_focus.get(&subject))) {
                (Some(topics), _) => format!("Focus on: {}", topics.join(", ")),
                (None, Some(text)) => text.to_string(),
                (None, None) => format!(
                    "Focus on core concepts, practice problems and regular review sessions for {subject}"
                ),
            };
            let study_strategy = match non_blank(generated_strategies.get(&subject)) {
                Some(text) => text.to_string(),
                None => format!(
                    "Study {subject} for {weekly_minutes} minutes a week. Break topics into \
                     manageable chunks and review previous lessons weekly using active recall."
                ),
            };

            PlanSubject {
                subject,
                priority,
                weekly_minutes,
                focus_area,
                study_strategy,
            }
        })
        .collect()
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}
