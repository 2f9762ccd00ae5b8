use std::time::Duration;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analytics::report::ReportAnalysis;
use crate::config::LLMConfig;
use crate::flashcards::Difficulty;
use crate::planning::DaySchedule;

/// Narrow client for the text-generation collaborator. It is asked for
/// flashcards, report recommendations, study-plan guidance and answer grading;
/// every caller has a rule-based answer to fall back on.
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    config: LLMConfig,
    client: reqwest::Client,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCard {
    pub topic: String,
    pub question: String,
    pub answer: String,
}

/// Verdict on a free-text flashcard answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvaluation {
    pub correct: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

pub struct StudyPlanPrompt<'a> {
    pub subjects: &'a [String],
    pub weak_subjects: &'a [String],
    pub weekly_hours: f64,
    pub window_days: i64,
}

/// Guidance for a study plan. Every field is optional in the reply; missing
/// parts are filled from the rule-based skeleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    #[serde(default)]
    pub weekly_schedule: Vec<DaySchedule>,
    #[serde(default)]
    pub focus_areas: BTreeMap<String, String>,
    #[serde(default)]
    pub strategies: BTreeMap<String, String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("content generator is disabled")]
    Disabled,
    #[error("content generator request timed out")]
    Timeout,
    #[error("content generator network error: {0}")]
    Network(String),
    #[error("content generator api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
    #[error("content generator returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ContentGenerator {
    pub fn new(config: &LLMConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config: config.clone(),
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn is_mock(&self) -> bool {
        self.config.mock
    }

    pub async fn generate_flashcards(
        &self,
        subject: &str,
        topic: Option<&str>,
        count: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<GeneratedCard>, GeneratorError> {
        if !self.config.enabled {
            return Err(GeneratorError::Disabled);
        }
        if self.config.mock {
            return Ok(mock_flashcards(subject, topic, count, difficulty));
        }

        let focus = topic.unwrap_or("core concepts");
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "You write concise study flashcards for secondary school students. \
                          Reply with a JSON array of objects with keys topic, question, answer."
                    .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Write {count} {} difficulty flashcards for {subject}, focusing on {focus}.",
                    difficulty.as_str()
                ),
            },
        ];

        let reply = self.chat(&messages).await?;
        let mut cards: Vec<GeneratedCard> = serde_json::from_str(strip_code_fence(&reply))
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        cards.retain(|card| !card.question.trim().is_empty() && !card.answer.trim().is_empty());
        cards.truncate(count as usize);
        if cards.is_empty() {
            return Err(GeneratorError::InvalidResponse(
                "no usable flashcards in reply".to_string(),
            ));
        }
        Ok(cards)
    }

    pub async fn recommendations(
        &self,
        analysis: &ReportAnalysis,
    ) -> Result<Vec<String>, GeneratorError> {
        if !self.config.enabled {
            return Err(GeneratorError::Disabled);
        }
        if self.config.mock {
            return Ok(mock_recommendations(analysis));
        }

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "You are an academic advisor. Reply with one short recommendation per line."
                    .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Overall GPA {:.2}. Strong subjects: {}. Weak subjects: {}.",
                    analysis.overall_gpa,
                    list_or_none(&analysis.strong_subjects),
                    list_or_none(&analysis.weak_subjects)
                ),
            },
        ];

        let reply = self.chat(&messages).await?;
        let lines: Vec<String> = reply
            .lines()
            .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            return Err(GeneratorError::InvalidResponse("empty recommendation list".to_string()));
        }
        Ok(lines)
    }

    pub async fn evaluate_answer(
        &self,
        subject: &str,
        question: &str,
        expected: &str,
        given: &str,
    ) -> Result<AnswerEvaluation, GeneratorError> {
        if !self.config.enabled {
            return Err(GeneratorError::Disabled);
        }
        if self.config.mock {
            return Ok(mock_evaluation(expected, given));
        }

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "You grade short student answers. Reply with a JSON object with keys \
                          correct (bool), score (0 to 1), feedback (string), suggestions (array of strings)."
                    .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Subject: {subject}\nQuestion: {question}\nExpected answer: {expected}\nStudent answer: {given}"
                ),
            },
        ];

        let reply = self.chat(&messages).await?;
        let mut evaluation: AnswerEvaluation = serde_json::from_str(strip_code_fence(&reply))
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        evaluation.score = evaluation.score.clamp(0.0, 1.0);
        Ok(evaluation)
    }

    pub async fn study_plan(
        &self,
        prompt: &StudyPlanPrompt<'_>,
    ) -> Result<GeneratedPlan, GeneratorError> {
        if !self.config.enabled {
            return Err(GeneratorError::Disabled);
        }
        if self.config.mock {
            return Ok(mock_plan(prompt));
        }

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "You plan weekly study time for secondary school students. Reply with a \
                          JSON object with keys focusAreas and strategies (objects keyed by subject) \
                          and recommendations (array of strings). Optionally include weeklySchedule, \
                          an array of {day, isActive, sessions: [{subject, durationMinutes, focus, priority}]}."
                    .to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Subjects: {}. Weak subjects: {}. {:.1} hours a week for {} days.",
                    list_or_none(prompt.subjects),
                    list_or_none(prompt.weak_subjects),
                    prompt.weekly_hours,
                    prompt.window_days
                ),
            },
        ];

        let reply = self.chat(&messages).await?;
        serde_json::from_str(strip_code_fence(&reply))
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, GeneratorError> {
        if self.config.api_url.is_empty() {
            return Err(GeneratorError::Network("LLM_API_URL is not configured".to_string()));
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&ChatRequest {
                model: &self.config.model,
                messages,
                temperature: 0.4,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Content generator returned an error status");
            return Err(GeneratorError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await.map_err(map_transport_error)?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GeneratorError::InvalidResponse("no choices in reply".to_string()))
    }
}

fn map_transport_error(error: reqwest::Error) -> GeneratorError {
    if error.is_timeout() {
        GeneratorError::Timeout
    } else if error.is_decode() {
        GeneratorError::InvalidResponse(error.to_string())
    } else {
        GeneratorError::Network(error.to_string())
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn mock_flashcards(
    subject: &str,
    topic: Option<&str>,
    count: u32,
    difficulty: Difficulty,
) -> Vec<GeneratedCard> {
    let topic = topic.unwrap_or("Key Concepts");
    (1..=count)
        .map(|n| GeneratedCard {
            topic: topic.to_string(),
            question: format!(
                "{subject} ({topic}, {}): question {n}",
                difficulty.as_str()
            ),
            answer: format!("{subject} ({topic}): answer {n}"),
        })
        .collect()
}

fn mock_recommendations(analysis: &ReportAnalysis) -> Vec<String> {
    let mut out: Vec<String> = analysis
        .weak_subjects
        .iter()
        .map(|subject| format!("Schedule short daily practice sessions for {subject}"))
        .collect();
    out.extend(
        analysis
            .strong_subjects
            .iter()
            .map(|subject| format!("Use {subject} past papers to stay sharp")),
    );
    if out.is_empty() {
        out.push("Keep up the consistent study habits for continued success".to_string());
    }
    out
}

/// Case-insensitive comparison after collapsing whitespace. Used when the
/// generator is unavailable.
pub fn match_answer(expected: &str, given: &str) -> AnswerEvaluation {
    let correct = normalize_answer(expected) == normalize_answer(given);
    AnswerEvaluation {
        correct,
        score: if correct { 1.0 } else { 0.0 },
        feedback: if correct {
            "Correct.".to_string()
        } else {
            format!("Expected: {}", expected.trim())
        },
        suggestions: Vec::new(),
    }
}

fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn mock_evaluation(expected: &str, given: &str) -> AnswerEvaluation {
    let mut evaluation = match_answer(expected, given);
    if !evaluation.correct {
        evaluation.suggestions = vec!["Revisit this card before the next review".to_string()];
    }
    evaluation
}

fn mock_plan(prompt: &StudyPlanPrompt<'_>) -> GeneratedPlan {
    let strategies = prompt
        .weak_subjects
        .iter()
        .map(|subject| {
            (
                subject.clone(),
                format!("Work through one {subject} past paper section each session"),
            )
        })
        .collect();
    let recommendations = match prompt.weak_subjects.first() {
        Some(first) => vec![format!("Start each week with {first}")],
        None => vec!["Keep a steady weekly rhythm across all subjects".to_string()],
    };
    GeneratedPlan {
        strategies,
        recommendations,
        ..GeneratedPlan::default()
    }
}
