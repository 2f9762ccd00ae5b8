use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_GENERATED_CARDS, MAX_GENERATED_CARDS, MAX_LIST_LIMIT, MIN_GENERATED_CARDS,
};
use crate::extractors::JsonBody;
use crate::flashcards::{Difficulty, FlashcardState, ReviewOutcome};
use crate::response::{created, ok, AppError};
use crate::routes::require_user_id;
use crate::services::content_generator::{match_answer, AnswerEvaluation};
use crate::state::AppState;
use crate::store::operations::flashcards::Flashcard;
use crate::validation::validate_subject;

const MAX_CARDS_PER_REQUEST: usize = 50;
const MAX_CARD_TEXT_LEN: usize = 2_000;
const DEFAULT_DUE_LIMIT: usize = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id/flashcards",
            post(create_flashcards).get(list_flashcards),
        )
        .route("/users/:user_id/flashcards/generate", post(generate_flashcards))
        .route("/users/:user_id/flashcards/due", get(due_flashcards))
        .route(
            "/users/:user_id/flashcards/:card_id/review",
            post(review_flashcard),
        )
        .route(
            "/users/:user_id/flashcards/:card_id/answer",
            post(answer_flashcard),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewCardRequest {
    subject: String,
    topic: Option<String>,
    question: String,
    answer: String,
    difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateCardsRequest {
    cards: Vec<NewCardRequest>,
}

fn subject_or_400(subject: &str) -> Result<String, AppError> {
    validate_subject(subject).map_err(|msg| AppError::bad_request("INVALID_SUBJECT", msg))
}

fn text_or_400(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_CARD_TEXT_LEN {
        return Err(AppError::bad_request(
            "INVALID_FLASHCARD",
            &format!("{field} must be between 1 and {MAX_CARD_TEXT_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

async fn create_flashcards(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateCardsRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    if req.cards.is_empty() || req.cards.len() > MAX_CARDS_PER_REQUEST {
        return Err(AppError::bad_request(
            "INVALID_FLASHCARD",
            &format!("cards must contain between 1 and {MAX_CARDS_PER_REQUEST} entries"),
        ));
    }

    let now = Utc::now();
    let mut cards = Vec::with_capacity(req.cards.len());
    for card in req.cards {
        let difficulty = card
            .difficulty
            .as_deref()
            .map(Difficulty::parse_lenient)
            .unwrap_or_default();
        cards.push(Flashcard {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            subject: subject_or_400(&card.subject)?,
            topic: card
                .topic
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "General".to_string()),
            question: text_or_400("question", &card.question)?,
            answer: text_or_400("answer", &card.answer)?,
            state: FlashcardState::new(difficulty, now),
            created_at: now,
        });
    }

    state.store().create_flashcards(&cards)?;
    tracing::info!(user_id = %user_id, count = cards.len(), "Flashcards created");
    Ok(created(cards))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    subject: String,
    topic: Option<String>,
    count: Option<u32>,
    difficulty: Option<String>,
}

async fn generate_flashcards(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let subject = subject_or_400(&req.subject)?;
    let count = req
        .count
        .unwrap_or(DEFAULT_GENERATED_CARDS)
        .clamp(MIN_GENERATED_CARDS, MAX_GENERATED_CARDS);
    let difficulty = req
        .difficulty
        .as_deref()
        .map(Difficulty::parse_lenient)
        .unwrap_or_default();
    let topic = req.topic.as_deref().map(str::trim).filter(|t| !t.is_empty());

    let generated = state
        .generator()
        .generate_flashcards(&subject, topic, count, difficulty)
        .await?;

    let now = Utc::now();
    let cards: Vec<Flashcard> = generated
        .into_iter()
        .map(|g| Flashcard {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            subject: subject.clone(),
            topic: g.topic,
            question: g.question,
            answer: g.answer,
            state: FlashcardState::new(difficulty, now),
            created_at: now,
        })
        .collect();

    state.store().create_flashcards(&cards)?;
    tracing::info!(user_id = %user_id, subject = %subject, count = cards.len(), "Flashcards generated");
    Ok(created(cards))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    subject: Option<String>,
}

async fn list_flashcards(
    Path(user_id): Path<String>,
    Query(q): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let subject = match q.subject.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(subject_or_400(raw)?),
        None => None,
    };
    let cards = state.store().list_flashcards(&user_id, subject.as_deref())?;
    Ok(ok(cards))
}

#[derive(Debug, Deserialize)]
struct DueQuery {
    limit: Option<usize>,
}

async fn due_flashcards(
    Path(user_id): Path<String>,
    Query(q): Query<DueQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let limit = q.limit.unwrap_or(DEFAULT_DUE_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let due = state
        .store()
        .list_due_flashcards(&user_id, Utc::now(), limit)?;
    Ok(ok(due))
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    correct: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewResponse {
    card: Flashcard,
    correct: bool,
    mastery: f64,
    interval_days: i64,
    previous_difficulty: Difficulty,
    next_review_date: DateTime<Utc>,
}

impl ReviewResponse {
    fn new(card: Flashcard, outcome: ReviewOutcome) -> Self {
        Self {
            next_review_date: outcome.state.next_review_date,
            card,
            correct: outcome.correct,
            mastery: outcome.mastery,
            interval_days: outcome.interval_days,
            previous_difficulty: outcome.previous_difficulty,
        }
    }
}

fn record_review(
    state: &AppState,
    user_id: &str,
    card_id: &str,
    correct: bool,
) -> Result<ReviewResponse, AppError> {
    let review_id = Uuid::new_v4().to_string();
    let (card, outcome) =
        state
            .store()
            .review_flashcard(user_id, card_id, correct, &review_id, Utc::now())?;

    if outcome.previous_difficulty != outcome.state.difficulty {
        tracing::info!(
            card_id = %card.id,
            from = %outcome.previous_difficulty,
            to = %outcome.state.difficulty,
            "Flashcard difficulty adjusted"
        );
    }
    Ok(ReviewResponse::new(card, outcome))
}

async fn review_flashcard(
    Path((user_id, card_id)): Path<(String, String)>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let review = record_review(&state, &user_id, &card_id, req.correct)?;
    Ok(ok(review))
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerResponse {
    evaluation: AnswerEvaluation,
    evaluation_source: &'static str,
    #[serde(flatten)]
    review: ReviewResponse,
}

/// Grades a free-text answer, then records it as a review.
async fn answer_flashcard(
    Path((user_id, card_id)): Path<(String, String)>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let given = text_or_400("answer", &req.answer)
        .map_err(|_| AppError::bad_request("INVALID_ANSWER", "answer must not be empty or too long"))?;
    let card = state.store().get_flashcard(&user_id, &card_id)?;

    let (evaluation, evaluation_source) = match state
        .generator()
        .evaluate_answer(&card.subject, &card.question, &card.answer, &given)
        .await
    {
        Ok(evaluation) => (evaluation, "generator"),
        Err(error) => {
            tracing::warn!(card_id = %card.id, error = %error, "Answer grading falls back to exact match");
            (match_answer(&card.answer, &given), "rules")
        }
    };

    let review = record_review(&state, &user_id, &card_id, evaluation.correct)?;
    Ok(ok(AnswerResponse {
        evaluation,
        evaluation_source,
        review,
    }))
}
