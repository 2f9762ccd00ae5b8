use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::analytics::grade_scale::LetterGrade;
use crate::analytics::performance::ScoreCutoffs;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub analytics: AnalyticsConfig,
    pub llm: LLMConfig,
}

/// Thresholds used when classifying subjects. Trend slopes and the spacing
/// tables are fixed and deliberately not configurable.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub strong_grade_threshold: LetterGrade,
    pub weak_grade_threshold: LetterGrade,
    pub strong_score_cutoff: f64,
    pub weak_score_cutoff: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            strong_grade_threshold: LetterGrade::BPlus,
            weak_grade_threshold: LetterGrade::B,
            strong_score_cutoff: 70.0,
            weak_score_cutoff: 60.0,
        }
    }
}

impl AnalyticsConfig {
    pub fn score_cutoffs(&self) -> ScoreCutoffs {
        ScoreCutoffs {
            strong: self.strong_score_cutoff,
            weak: self.weak_score_cutoff,
        }
    }
}

#[derive(Clone)]
pub struct LLMConfig {
    pub enabled: bool,
    pub mock: bool,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mock: true,
            api_url: String::new(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LLMConfig")
            .field("enabled", &self.enabled)
            .field("mock", &self.mock)
            .field("api_url", &self.api_url)
            .field("api_key", &"***REDACTED***")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = AnalyticsConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/smartpath.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            analytics: AnalyticsConfig {
                strong_grade_threshold: env_or_grade(
                    "STRONG_GRADE_THRESHOLD",
                    defaults.strong_grade_threshold,
                ),
                weak_grade_threshold: env_or_grade("WEAK_GRADE_THRESHOLD", defaults.weak_grade_threshold),
                strong_score_cutoff: env_or_parse("STRONG_SCORE_CUTOFF", defaults.strong_score_cutoff),
                weak_score_cutoff: env_or_parse("WEAK_SCORE_CUTOFF", defaults.weak_score_cutoff),
            },
            llm: LLMConfig {
                enabled: env_or_bool("LLM_ENABLED", false),
                mock: env_or_bool("LLM_MOCK", true),
                api_url: env_or("LLM_API_URL", ""),
                api_key: env_or("LLM_API_KEY", ""),
                model: env_or("LLM_MODEL", "gpt-4o-mini"),
                timeout_secs: env_or_parse("LLM_TIMEOUT_SECS", 30_u64),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

pub fn env_or_grade(key: &str, default: LetterGrade) -> LetterGrade {
    match env::var(key) {
        Ok(raw) => LetterGrade::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(key, value = %raw, "Unknown letter grade in env var, using default");
            default
        }),
        Err(_) => default,
    }
}
