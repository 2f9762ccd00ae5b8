use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::grade_scale::LetterGrade;

const IMPROVING_SLOPE: f64 = 0.1;
const DECLINING_SLOPE: f64 = -0.1;
const RECENT_WINDOW: usize = 3;
const IMPROVING_BUMP: f64 = 0.5;
const DECLINING_DROP: f64 = 0.3;
const ORDINAL_MIN: f64 = 1.0;
const ORDINAL_MAX: f64 = 12.0;
const HEURISTIC_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }

    /// Lenient parse; anything unrecognised is `Stable`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "improving" => Trend::Improving,
            "declining" => Trend::Declining,
            _ => Trend::Stable,
        }
    }
}

/// Ordinary-least-squares slope of value against index.
/// `history` must be oldest-first.
pub fn slope(history: &[f64]) -> f64 {
    let n = history.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in history.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Classifies an oldest-first grade history. Fewer than two points is `Stable`.
pub fn analyze_trend(history: &[f64]) -> Trend {
    if history.len() < 2 {
        return Trend::Stable;
    }

    let slope = slope(history);
    if slope > IMPROVING_SLOPE {
        Trend::Improving
    } else if slope < DECLINING_SLOPE {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Predicts the next ordinal grade from an oldest-first history.
///
/// Improvement is bumped by +0.5 and decline by -0.3 on top of the mean of the
/// last three observations, clamped to the ordinal range.
pub fn predict_next(history: &[f64]) -> f64 {
    match history {
        [] => 0.0,
        [only] => *only,
        _ => {
            let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
            let recent_avg = window.iter().sum::<f64>() / window.len() as f64;
            match analyze_trend(history) {
                Trend::Improving => (recent_avg + IMPROVING_BUMP).min(ORDINAL_MAX),
                Trend::Declining => (recent_avg - DECLINING_DROP).max(ORDINAL_MIN),
                Trend::Stable => recent_avg,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeTrendSeries {
    pub subject: String,
    pub grades: Vec<f64>,
    pub dates: Vec<DateTime<Utc>>,
    pub trend: Trend,
    pub predicted_next: f64,
}

impl GradeTrendSeries {
    /// Builds a series from dated observations in any order; they are sorted
    /// oldest-first before the trend is computed.
    pub fn from_observations(subject: &str, mut observations: Vec<(DateTime<Utc>, f64)>) -> Self {
        observations.sort_by_key(|(date, _)| *date);
        let (dates, grades): (Vec<_>, Vec<_>) = observations.into_iter().unzip();
        let trend = analyze_trend(&grades);
        let predicted_next = predict_next(&grades);
        Self {
            subject: subject.to_string(),
            grades,
            dates,
            trend,
            predicted_next,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub subject: String,
    pub current_grade: LetterGrade,
    pub predicted_next_grade: LetterGrade,
    pub confidence: f64,
    pub factors: Vec<String>,
}

impl Prediction {
    pub fn from_series(series: &GradeTrendSeries) -> Self {
        let current = series.grades.last().copied().unwrap_or(0.0);
        let factors = match series.trend {
            Trend::Improving => vec![format!(
                "{} grades have been rising across recent reports",
                series.subject
            )],
            Trend::Declining => vec![format!(
                "{} grades have been falling across recent reports",
                series.subject
            )],
            Trend::Stable if series.grades.len() < 2 => {
                vec!["Not enough reports to detect a trend".to_string()]
            }
            Trend::Stable => vec![format!("{} grades are holding steady", series.subject)],
        };

        Self {
            subject: series.subject.clone(),
            current_grade: LetterGrade::from_ordinal(current),
            predicted_next_grade: LetterGrade::from_ordinal(series.predicted_next),
            confidence: HEURISTIC_CONFIDENCE,
            factors,
        }
    }
}
