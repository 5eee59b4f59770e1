mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;

use serde::Serialize;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use super::error::{ApiError, ApiResponse};
use crate::db::{Category, Question};

/// Shared shape of every response that carries a list of questions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<BTreeMap<i64, String>>,
    current_category: Option<String>,
}

fn category_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}
