use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        DbConn, NewQuestion,
    },
    server::{app::AppState, pagination::PageQuery},
    telemetry::QUESTIONS_CHANGED,
};

use super::{category_map, ApiError, ApiResponse, QuestionsBody};

// difficulty and category come from <select> values, so they may be numeric strings
#[derive(Deserialize)]
struct NewQuestionBody {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!(
            "missing or empty field `{field}`"
        ))),
    }
}

fn required_number(value: Option<i64>, field: &str) -> Result<i64, ApiError> {
    match value {
        Some(v) if v != 0 => Ok(v),
        _ => Err(ApiError::bad_request(format!(
            "missing or zero field `{field}`"
        ))),
    }
}

impl TryFrom<NewQuestionBody> for NewQuestion {
    type Error = ApiError;

    fn try_from(body: NewQuestionBody) -> Result<Self, Self::Error> {
        Ok(NewQuestion {
            question: required_text(body.question, "question")?,
            answer: required_text(body.answer, "answer")?,
            difficulty: required_number(body.difficulty, "difficulty")?,
            category: required_number(body.category, "category")?,
        })
    }
}

async fn get_questions(
    mut conn: DbConn,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsBody>> {
    let page = query
        .map(|Query(q)| q)
        .unwrap_or_default()
        .page()
        .ok_or(ApiError::NotFound)?;

    let questions = questions::get_questions_page(&mut conn, None, page.limit, page.offset).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    let total_questions = questions::count_questions(&mut conn, None).await?;
    let categories = get_all_categories(&mut conn).await?;

    Ok(Json(QuestionsBody {
        success: true,
        questions,
        total_questions,
        categories: Some(category_map(categories)),
        current_category: None,
    }))
}

async fn create_question(
    mut conn: DbConn,
    body: Result<Json<NewQuestionBody>, JsonRejection>,
) -> ApiResponse<(StatusCode, Json<Created>)> {
    let Json(body) = body?;
    let question = NewQuestion::try_from(body)?;

    let id = questions::create_question(&mut conn, &question)
        .await
        .map_err(ApiError::Unprocessable)?;
    QUESTIONS_CHANGED.with_label_values(&["created"]).inc();
    tracing::info!("Created question {id} in category {}", question.category);

    Ok((
        StatusCode::CREATED,
        Json(Created {
            success: true,
            created: id,
        }),
    ))
}

async fn delete_question(
    mut conn: DbConn,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Deleted>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    questions::get_question_by_id(&mut conn, id).await?;

    questions::delete_question(&mut conn, id)
        .await
        .map_err(ApiError::Unprocessable)?;
    QUESTIONS_CHANGED.with_label_values(&["deleted"]).inc();
    tracing::info!("Deleted question {id}");

    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

async fn search_questions(
    mut conn: DbConn,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<Json<QuestionsBody>> {
    let Json(body) = body?;
    let term = match body.search_term {
        Some(term) if !term.is_empty() => term,
        _ => return Err(ApiError::bad_request("missing or empty field `searchTerm`")),
    };

    let questions = questions::search_questions(&mut conn, &term)
        .await
        .map_err(ApiError::Unprocessable)?;
    tracing::debug!("Search for {term:?} matched {} questions", questions.len());

    Ok(Json(QuestionsBody {
        success: true,
        total_questions: questions.len() as i64,
        questions,
        categories: None,
        current_category: None,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/search", post(search_questions))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
