//! Letter grades and the two numeric scales they map onto.
//!
//! The ordinal scale (E=1 .. A=12) drives trend math; the GPA scale (0.0-4.0)
//! drives report-level averaging. Every lookup is total: unknown grade strings
//! resolve to 0.0 on both scales.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LetterGrade {
    E,
    DMinus,
    D,
    DPlus,
    CMinus,
    C,
    CPlus,
    BMinus,
    B,
    BPlus,
    AMinus,
    A,
}

/// Descending order, paired with the inclusive lower bound used by
/// [`LetterGrade::from_ordinal`].
const BUCKETS: [(f64, LetterGrade); 11] = [
    (11.5, LetterGrade::A),
    (10.5, LetterGrade::AMinus),
    (9.5, LetterGrade::BPlus),
    (8.5, LetterGrade::B),
    (7.5, LetterGrade::BMinus),
    (6.5, LetterGrade::CPlus),
    (5.5, LetterGrade::C),
    (4.5, LetterGrade::CMinus),
    (3.5, LetterGrade::DPlus),
    (2.5, LetterGrade::D),
    (1.5, LetterGrade::DMinus),
];

impl LetterGrade {
    pub const ALL: [LetterGrade; 12] = [
        LetterGrade::A,
        LetterGrade::AMinus,
        LetterGrade::BPlus,
        LetterGrade::B,
        LetterGrade::BMinus,
        LetterGrade::CPlus,
        LetterGrade::C,
        LetterGrade::CMinus,
        LetterGrade::DPlus,
        LetterGrade::D,
        LetterGrade::DMinus,
        LetterGrade::E,
    ];

    /// Case-insensitive, whitespace-tolerant parse. Returns `None` for
    /// anything outside the twelve canonical grades.
    pub fn parse(raw: &str) -> Option<Self> {
        let canonical = raw.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|grade| grade.as_str() == canonical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::E => "E",
        }
    }

    pub fn ordinal(self) -> f64 {
        match self {
            LetterGrade::A => 12.0,
            LetterGrade::AMinus => 11.0,
            LetterGrade::BPlus => 10.0,
            LetterGrade::B => 9.0,
            LetterGrade::BMinus => 8.0,
            LetterGrade::CPlus => 7.0,
            LetterGrade::C => 6.0,
            LetterGrade::CMinus => 5.0,
            LetterGrade::DPlus => 4.0,
            LetterGrade::D => 3.0,
            LetterGrade::DMinus => 2.0,
            LetterGrade::E => 1.0,
        }
    }

    pub fn gpa(self) -> f64 {
        match self {
            LetterGrade::A => 4.0,
            LetterGrade::AMinus => 3.7,
            LetterGrade::BPlus => 3.3,
            LetterGrade::B => 3.0,
            LetterGrade::BMinus => 2.7,
            LetterGrade::CPlus => 2.3,
            LetterGrade::C => 2.0,
            LetterGrade::CMinus => 1.7,
            LetterGrade::DPlus => 1.3,
            LetterGrade::D => 1.0,
            LetterGrade::DMinus => 0.7,
            LetterGrade::E => 0.0,
        }
    }

    /// Buckets an ordinal value back into the nearest letter grade.
    /// Anything below 1.5 (including NaN) lands on `E`.
    pub fn from_ordinal(value: f64) -> Self {
        BUCKETS
            .iter()
            .find(|(lower, _)| value >= *lower)
            .map(|(_, grade)| *grade)
            .unwrap_or(LetterGrade::E)
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LetterGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LetterGrade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LetterGrade::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown letter grade: {raw}")))
    }
}

pub fn grade_to_ordinal(letter: &str) -> f64 {
    LetterGrade::parse(letter).map(LetterGrade::ordinal).unwrap_or(0.0)
}

pub fn grade_to_gpa(letter: &str) -> f64 {
    LetterGrade::parse(letter).map(LetterGrade::gpa).unwrap_or(0.0)
}

pub fn ordinal_to_grade(value: f64) -> String {
    LetterGrade::from_ordinal(value).as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_grade_round_trips_through_ordinal() {
        for grade in LetterGrade::ALL {
            assert_eq!(LetterGrade::from_ordinal(grade.ordinal()), grade);
            assert_eq!(ordinal_to_grade(grade_to_ordinal(grade.as_str())), grade.as_str());
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(LetterGrade::parse(" b+ "), Some(LetterGrade::BPlus));
        assert_eq!(LetterGrade::parse("a-"), Some(LetterGrade::AMinus));
        assert_eq!(LetterGrade::parse("F"), None);
        assert_eq!(LetterGrade::parse(""), None);
    }

    #[test]
    fn unknown_grades_fail_soft_to_zero() {
        assert_eq!(grade_to_ordinal("Z"), 0.0);
        assert_eq!(grade_to_gpa("A++"), 0.0);
        assert_eq!(grade_to_gpa("e"), 0.0);
        assert_eq!(grade_to_ordinal("e"), 1.0);
    }

    #[test]
    fn bucket_boundaries_are_inclusive() {
        assert_eq!(LetterGrade::from_ordinal(11.5), LetterGrade::A);
        assert_eq!(LetterGrade::from_ordinal(11.49), LetterGrade::AMinus);
        assert_eq!(LetterGrade::from_ordinal(1.5), LetterGrade::DMinus);
        assert_eq!(LetterGrade::from_ordinal(1.49), LetterGrade::E);
        assert_eq!(LetterGrade::from_ordinal(-3.0), LetterGrade::E);
        assert_eq!(LetterGrade::from_ordinal(f64::NAN), LetterGrade::E);
        assert_eq!(LetterGrade::from_ordinal(40.0), LetterGrade::A);
    }

    #[test]
    fn gpa_table_matches_scale() {
        assert_eq!(grade_to_gpa("A"), 4.0);
        assert_eq!(grade_to_gpa("B-"), 2.7);
        assert_eq!(grade_to_gpa("D-"), 0.7);
    }

    #[test]
    fn serde_uses_canonical_strings() {
        let json = serde_json::to_string(&LetterGrade::CPlus).unwrap();
        assert_eq!(json, "\"C+\"");
        let back: LetterGrade = serde_json::from_str("\"c+\"").unwrap();
        assert_eq!(back, LetterGrade::CPlus);
        assert!(serde_json::from_str::<LetterGrade>("\"Q\"").is_err());
    }
}
