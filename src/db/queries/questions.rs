use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: i64,
}

/// Validated input for a question that does not have an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: i64,
}

pub async fn get_all_questions(conn: &mut SqliteConnection) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(conn)
    .await
}

/// Counts questions, optionally only those of a single category.
pub async fn count_questions(
    conn: &mut SqliteConnection,
    category: Option<i64>,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
SELECT COUNT(*)
FROM questions
WHERE ?1 IS NULL OR questions.category = ?1
        "#,
    )
    .bind(category)
    .fetch_one(conn)
    .await
}

pub async fn get_questions_page(
    conn: &mut SqliteConnection,
    category: Option<i64>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE ?1 IS NULL OR questions.category = ?1
ORDER BY id
LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(category)
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await
}

pub async fn get_question_by_id(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await
}

pub async fn create_question(
    conn: &mut SqliteConnection,
    question: &NewQuestion,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, difficulty, category) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.difficulty)
    .bind(question.category)
    .execute(conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns the number of deleted rows.
pub async fn delete_question(conn: &mut SqliteConnection, id: i64) -> sqlx::Result<u64> {
    let deleted = sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(conn)
    .await?
    .rows_affected();
    Ok(deleted)
}

/// Case-insensitive substring search over the question text.
///
/// SQLite `LIKE` folds ASCII case only, so non-ASCII letters must match exactly.
pub async fn search_questions(
    conn: &mut SqliteConnection,
    term: &str,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE questions.question LIKE ?1 ESCAPE '\'
ORDER BY id
        "#,
    )
    .bind(like_pattern(term))
    .fetch_all(conn)
    .await
}

/// Questions not in `previous`, restricted to `category` when one is given.
///
/// The previous ids travel as a single JSON array parameter, so the length of a
/// quiz history never runs into SQLite's bind-parameter limit.
pub async fn get_quiz_candidates(
    conn: &mut SqliteConnection,
    previous: &[i64],
    category: Option<i64>,
) -> sqlx::Result<Vec<Question>> {
    let previous: BTreeSet<i64> = previous.iter().copied().collect();
    let previous = serde_json::to_string(&previous).map_err(|e| sqlx::Error::Encode(e.into()))?;

    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, difficulty, category
FROM questions
WHERE questions.id NOT IN (SELECT value FROM json_each(?1))
  AND (?2 IS NULL OR questions.category = ?2)
ORDER BY id
        "#,
    )
    .bind(previous)
    .bind(category)
    .fetch_all(conn)
    .await
}

/// Writes questions with their ids preserved, replacing rows that already exist.
pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: Vec<Question>,
) -> sqlx::Result<()> {
    for question in questions {
        sqlx::query(
            r#"
INSERT OR REPLACE INTO questions (id, question, answer, difficulty, category)
VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.difficulty)
        .bind(question.category)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{migrated_pool, seeded_pool};

    fn new_question(question: &str, category: i64) -> NewQuestion {
        NewQuestion {
            question: question.to_owned(),
            answer: "answer".to_owned(),
            difficulty: 1,
            category,
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("title"), "%title%");
        assert_eq!(like_pattern("100%"), r"%100\%%");
        assert_eq!(like_pattern(r"a_b\c"), r"%a\_b\\c%");
    }

    #[tokio::test]
    async fn pages_are_contiguous_slices_ordered_by_id() {
        let (_dir, pool) = seeded_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let all = get_all_questions(&mut conn).await.unwrap();
        let first = get_questions_page(&mut conn, None, 10, 0).await.unwrap();
        let second = get_questions_page(&mut conn, None, 10, 10).await.unwrap();
        let third = get_questions_page(&mut conn, None, 10, 20).await.unwrap();

        assert_eq!(first, all[..10]);
        assert_eq!(second, all[10..]);
        assert!(third.is_empty());
    }

    #[tokio::test]
    async fn category_filter_applies_to_count_and_page() {
        let (_dir, pool) = seeded_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        assert_eq!(count_questions(&mut conn, None).await.unwrap(), 19);
        assert_eq!(count_questions(&mut conn, Some(4)).await.unwrap(), 4);
        assert_eq!(count_questions(&mut conn, Some(99)).await.unwrap(), 0);

        let history = get_questions_page(&mut conn, Some(4), 10, 0).await.unwrap();
        assert_eq!(history.len(), 4);
        assert!(history.iter().all(|q| q.category == 4));
    }

    #[tokio::test]
    async fn created_question_can_be_fetched_and_deleted() {
        let (_dir, pool) = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let id = create_question(&mut conn, &new_question("Is it?", 1))
            .await
            .unwrap();
        let stored = get_question_by_id(&mut conn, id).await.unwrap();
        assert_eq!(stored.question, "Is it?");

        assert_eq!(delete_question(&mut conn, id).await.unwrap(), 1);
        assert_eq!(delete_question(&mut conn, id).await.unwrap(), 0);
        assert!(matches!(
            get_question_by_id(&mut conn, id).await,
            Err(sqlx::Error::RowNotFound)
        ));
    }

    #[tokio::test]
    async fn questions_may_reference_unknown_categories() {
        let (_dir, pool) = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let id = create_question(&mut conn, &new_question("Orphan?", 1000))
            .await
            .unwrap();

        assert_eq!(get_question_by_id(&mut conn, id).await.unwrap().category, 1000);
    }

    #[tokio::test]
    async fn search_ignores_ascii_case() {
        let (_dir, pool) = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        create_question(&mut conn, &new_question("Is Shrodingers cat dead or alive", 1))
            .await
            .unwrap();

        let found = search_questions(&mut conn, "shrodingers").await.unwrap();

        assert_eq!(found.len(), 1);
        assert!(search_questions(&mut conn, "SHRODINGERS CAT")
            .await
            .unwrap()
            .first()
            .is_some());
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let (_dir, pool) = seeded_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        assert!(search_questions(&mut conn, "%").await.unwrap().is_empty());
        assert!(search_questions(&mut conn, "_").await.unwrap().is_empty());
        // "title" also matches "entitled"
        assert_eq!(search_questions(&mut conn, "title").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn quiz_candidates_exclude_previous_questions() {
        let (_dir, pool) = seeded_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let all = get_quiz_candidates(&mut conn, &[], None).await.unwrap();
        assert_eq!(all.len(), 19);

        let rest = get_quiz_candidates(&mut conn, &[2, 4, 5], None).await.unwrap();
        assert_eq!(rest.len(), 16);
        assert!(rest.iter().all(|q| ![2, 4, 5].contains(&q.id)));
    }

    #[tokio::test]
    async fn quiz_candidates_respect_category() {
        let (_dir, pool) = seeded_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let sports = get_quiz_candidates(&mut conn, &[10], Some(6)).await.unwrap();
        assert_eq!(sports.iter().map(|q| q.id).collect::<Vec<_>>(), vec![11]);

        let exhausted = get_quiz_candidates(&mut conn, &[10, 11], Some(6))
            .await
            .unwrap();
        assert!(exhausted.is_empty());
    }

    #[tokio::test]
    async fn quiz_candidates_accept_long_and_repeated_histories() {
        let (_dir, pool) = seeded_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let unknown: Vec<i64> = (100_000..140_000).collect();
        let all = get_quiz_candidates(&mut conn, &unknown, None).await.unwrap();
        assert_eq!(all.len(), 19);

        let mut repeated: Vec<i64> = std::iter::repeat(10).take(50_000).collect();
        repeated.extend(unknown);
        let sports = get_quiz_candidates(&mut conn, &repeated, Some(6))
            .await
            .unwrap();
        assert_eq!(sports.iter().map(|q| q.id).collect::<Vec<_>>(), vec![11]);
    }
}
