use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::{
    db::{queries::questions::get_quiz_candidates, DbConn, Question},
    server::app::AppState,
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{ApiError, ApiResponse};

/// Category id the front end uses for "ALL".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Deserialize)]
struct QuizBody {
    previous_questions: Option<Vec<i64>>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Debug, PartialEq, Eq)]
struct QuizRequest {
    previous: Vec<i64>,
    category: Option<i64>,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
}

impl TryFrom<QuizBody> for QuizRequest {
    type Error = ApiError;

    fn try_from(body: QuizBody) -> Result<Self, Self::Error> {
        let previous = body
            .previous_questions
            .ok_or_else(|| ApiError::bad_request("missing field `previous_questions`"))?;
        let category = body
            .quiz_category
            .map(|c| c.id)
            .filter(|id| *id != ALL_CATEGORIES);
        Ok(QuizRequest { previous, category })
    }
}

fn pick_random(candidates: &[Question]) -> Option<Question> {
    candidates.choose(&mut rand::thread_rng()).cloned()
}

async fn next_question(
    mut conn: DbConn,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<Json<QuizResponse>> {
    let Json(body) = body?;
    let request = QuizRequest::try_from(body)?;

    let candidates = get_quiz_candidates(&mut conn, &request.previous, request.category)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    let remaining = candidates.len();
    let question = pick_random(&candidates);

    match &question {
        Some(q) => {
            QUIZ_QUESTIONS_SERVED
                .with_label_values(&[q.category.to_string().as_str()])
                .inc();
            tracing::debug!("Quiz picked question {} out of {remaining}", q.id);
        }
        None => tracing::debug!("Quiz exhausted after {} questions", request.previous.len()),
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
