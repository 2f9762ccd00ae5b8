//! Subject-name normalization and grade extraction from OCR'd report text.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::grade_scale::LetterGrade;

const MIN_SUBJECT_LEN: usize = 3;

const SUBJECT_ALIASES: &[(&str, &str)] = &[
    ("Math", "Mathematics"),
    ("Maths", "Mathematics"),
    ("Eng", "English"),
    ("Kisw", "Kiswahili"),
    ("Kiswahi", "Kiswahili"),
    ("Swahili", "Kiswahili"),
    ("Bio", "Biology"),
    ("Chem", "Chemistry"),
    ("Phy", "Physics"),
    ("Hist", "History"),
    ("History And Gov", "History"),
    ("History And Government", "History"),
    ("Geo", "Geography"),
    ("Comp", "Computer Studies"),
    ("Computer", "Computer Studies"),
    ("Ict", "Computer Studies"),
    ("Agric", "Agriculture"),
    ("Bus", "Business Studies"),
    ("Business", "Business Studies"),
    ("Cre", "CRE"),
    ("C.R.E", "CRE"),
    ("C.R.E.", "CRE"),
    ("Christian Religious Education", "CRE"),
    ("Home Sci", "Home Science"),
];

const KNOWN_SUBJECTS: &[&str] = &[
    "mathematics", "math", "maths", "english", "eng", "kiswahili", "kisw", "swahili",
    "biology", "bio", "chemistry", "chem", "physics", "phy", "history", "hist",
    "geography", "geo", "cre", "c.r.e", "christian religious education", "business",
    "bus", "computer", "comp", "ict", "agriculture", "agric", "home science", "music",
    "art", "french", "german", "arabic",
];

fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Canonical subject name: title-cased, whitespace collapsed, `&` spelled
/// out, and common abbreviations expanded.
pub fn normalize_subject_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let titled = title_case(&collapsed).replace('&', "and");

    SUBJECT_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(&titled))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(titled)
}

static PIPE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|+").expect("valid pattern"));

/// `SUBJECT | 74 | 62 | 68 | B | 9 | 4`
static PIPE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([A-Z][A-Z .&]+?)\s*\|\s*\d+\s*\|\s*\d+\s*\|\s*\d+\s*\|\s*([A-E][+-]?)\s*\|")
        .expect("valid pattern")
});

/// `ENGLISH    74    62    68    B    9    4`
static SPACED_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([A-Z][A-Z .&]+?)\s{2,}\d+\s+\d+\s+\d+\s+([A-E][+-]?)\s+\d+")
        .expect("valid pattern")
});

/// `Mathematics: A`, `English - B+`, then `Biology    A-`
static SIMPLE_ROWS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)^([A-Z][A-Z .&]+?)\s*[:-]\s*([A-E][+-]?)\s*[,|]?$").expect("valid pattern"),
        Regex::new(r"(?i)^([A-Z][A-Z .&]{2,}?)\s+([A-E][+-]?)$").expect("valid pattern"),
    ]
});

fn looks_like_subject(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    if KNOWN_SUBJECTS.iter().any(|known| lower.contains(known)) {
        return true;
    }
    let first_upper = text.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    first_upper && text.chars().any(|c| c.is_ascii_lowercase())
}

fn captured_row(re: &Regex, line: &str) -> Option<(String, LetterGrade)> {
    let caps = re.captures(line)?;
    let subject = caps.get(1)?.as_str().trim();
    if subject.len() < MIN_SUBJECT_LEN {
        return None;
    }
    let grade = LetterGrade::parse(caps.get(2)?.as_str())?;
    Some((subject.to_string(), grade))
}

fn parse_table_row(line: &str) -> Option<(String, LetterGrade)> {
    if line.contains('|') {
        let collapsed = PIPE_RUN.replace_all(line, "|");
        captured_row(&PIPE_ROW, &collapsed)
    } else {
        captured_row(&SPACED_ROW, line)
    }
}

fn parse_simple_row(line: &str) -> Option<(String, LetterGrade)> {
    SIMPLE_ROWS
        .iter()
        .find_map(|re| captured_row(re, line))
        .filter(|(subject, _)| looks_like_subject(subject))
}

/// Pulls `{subject: grade}` pairs out of OCR'd report text. Table rows take
/// precedence over free-form `subject: grade` lines.
pub fn extract_grades_from_text(text: &str) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();
    let mut simple = BTreeMap::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((subject, grade)) = parse_table_row(line) {
            table.insert(normalize_subject_name(&subject), grade.to_string());
        } else if let Some((subject, grade)) = parse_simple_row(line) {
            simple
                .entry(normalize_subject_name(&subject))
                .or_insert_with(|| grade.to_string());
        }
    }

    for (subject, grade) in simple {
        table.entry(subject).or_insert(grade);
    }
    table
}
