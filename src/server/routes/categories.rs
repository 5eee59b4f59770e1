use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::{count_questions, get_questions_page},
        },
        DbConn,
    },
    server::{app::AppState, pagination::PageQuery},
};

use super::{category_map, ApiError, ApiResponse, QuestionsBody};

#[derive(Serialize)]
struct CategoriesBody {
    categories: BTreeMap<i64, String>,
}

async fn get_categories(mut conn: DbConn) -> ApiResponse<Json<CategoriesBody>> {
    let categories = get_all_categories(&mut conn).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesBody {
        categories: category_map(categories),
    }))
}

async fn category_questions(
    mut conn: DbConn,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsBody>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let page = query
        .map(|Query(q)| q)
        .unwrap_or_default()
        .page()
        .ok_or(ApiError::NotFound)?;

    let questions = get_questions_page(&mut conn, Some(id), page.limit, page.offset).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    let total_questions = count_questions(&mut conn, Some(id)).await?;
    let category = get_category(&mut conn, id).await?;

    Ok(Json(QuestionsBody {
        success: true,
        questions,
        total_questions,
        categories: None,
        current_category: Some(category.kind),
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
