use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{db_error_kind, DbErrorKind, Error, Result};
use crate::models::question::{AnswerOption, Question};
use crate::models::testing::Testing;
use crate::models::variant::{Variant, VariantRef, VariantRow};

const VARIANT_JOIN: &str = r#"
    SELECT
        v.id AS variant_id,
        v.name,
        q.id AS question_id,
        q.question,
        q.answer AS correct_answer,
        a.answer AS option_text
    FROM variants v
        LEFT JOIN questions q ON q.variant_id = v.id
        LEFT JOIN questions_and_answers qa ON qa.question_id = q.id
        LEFT JOIN answers a ON a.id = qa.answer_id
"#;

#[derive(Clone)]
pub struct VariantService {
    pool: PgPool,
}

impl VariantService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Both the name collision and the 16-char bound are enforced by
    /// storage; the service maps the structured failure instead of
    /// pre-validating.
    pub async fn add(&self, name: &str) -> Result<()> {
        tracing::info!(name, "variant add received");

        sqlx::query("INSERT INTO variants (name) VALUES ($1)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|err| match db_error_kind(&err) {
                DbErrorKind::UniqueViolation => Error::VariantAlreadyExists,
                DbErrorKind::ValueTooLong => Error::VariantTooLong,
                _ => {
                    tracing::error!(error = ?err, "variant add failed");
                    Error::from(err)
                }
            })?;

        tracing::info!(name, "variant add success");

        Ok(())
    }

    /// Deletes the variant (questions and links cascade) and sweeps
    /// answers no question references any more. A miss on the variant
    /// rolls back before the sweep, leaving the answers table untouched.
    pub async fn remove(&self, name: &str) -> Result<()> {
        tracing::info!(name, "variant remove received");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM variants WHERE name = $1")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::VariantNotFound);
        }

        sqlx::query(
            r#"
            DELETE FROM answers
            WHERE id NOT IN (SELECT DISTINCT answer_id FROM questions_and_answers)
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(name, "variant remove success");

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Variant>> {
        let rows = sqlx::query_as::<_, VariantRow>(&format!(
            "{VARIANT_JOIN} ORDER BY v.id, q.id, a.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let variants = group_variant_rows(rows);
        if variants.is_empty() {
            return Err(Error::NoVariantsYet);
        }

        Ok(variants)
    }

    pub async fn get(&self, name: &str) -> Result<Variant> {
        let rows = sqlx::query_as::<_, VariantRow>(&format!(
            "{VARIANT_JOIN} WHERE v.name = $1 ORDER BY v.id, q.id, a.id"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        // A variant with zero questions still yields one row; no rows at
        // all means the variant itself is missing.
        group_variant_rows(rows)
            .into_iter()
            .next()
            .ok_or(Error::VariantNotFound)
    }

    /// Light existence lookup used as the gate on variant-scoped routes.
    pub async fn find_by_name(&self, name: &str) -> Result<VariantRef> {
        sqlx::query_as::<_, VariantRef>("SELECT id, name FROM variants WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match db_error_kind(&err) {
                DbErrorKind::NotFound => Error::VariantNotFound,
                _ => {
                    tracing::error!(error = ?err, "variant lookup failed");
                    Error::from(err)
                }
            })
    }

    /// Explicit lifecycle check: a finished session is a conflict, an
    /// unfinished one makes the start a clean no-op, and only a genuinely
    /// fresh pair inserts a row.
    pub async fn start(&self, variant_id: i64, user_id: i64) -> Result<()> {
        tracing::info!(variant_id, user_id, "variant start received");

        let existing = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(
            "SELECT id, finish_at FROM testing WHERE user_id = $1 AND variant_id = $2",
        )
        .bind(user_id)
        .bind(variant_id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some((_, Some(_))) => return Err(Error::VariantCompleted),
            Some((id, None)) => {
                tracing::info!(variant_id, user_id, test_id = id, "variant already started");
                return Ok(());
            }
            None => {}
        }

        sqlx::query("INSERT INTO testing (user_id, variant_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(variant_id)
            .execute(&self.pool)
            .await
            .map_err(|err| match db_error_kind(&err) {
                DbErrorKind::ForeignKeyViolation => Error::VariantNotFound,
                // Concurrent start of the same pair; the other insert won.
                DbErrorKind::UniqueViolation => Error::VariantCompleted,
                _ => {
                    tracing::error!(error = ?err, "variant start failed");
                    Error::from(err)
                }
            })?;

        tracing::info!(variant_id, user_id, "variant start success");

        Ok(())
    }

    /// Stamps the finish time and returns the session with its tally. A
    /// zero counter is reported as-is.
    pub async fn results(&self, variant_id: i64, user_id: i64) -> Result<Testing> {
        tracing::info!(variant_id, user_id, "variant results received");

        let testing = sqlx::query_as::<_, Testing>(
            r#"
            UPDATE testing SET finish_at = now()
            WHERE user_id = $1 AND variant_id = $2
            RETURNING id, user_id, variant_id, correct_answers, start_at, finish_at
            "#,
        )
        .bind(user_id)
        .bind(variant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::NotFound => Error::TestNotFound,
            _ => {
                tracing::error!(error = ?err, "variant results failed");
                Error::from(err)
            }
        })?;

        tracing::info!(
            variant_id,
            user_id,
            correct_answers = testing.correct_answers,
            "variant results success"
        );

        Ok(testing)
    }
}

/// Folds the flattened join (ordered by variant id, question id) into
/// nested variants. Each question appears once per answer option, so
/// consecutive rows are deduplicated by id.
fn group_variant_rows(rows: Vec<VariantRow>) -> Vec<Variant> {
    let mut variants: Vec<Variant> = Vec::new();

    for row in rows {
        if variants.last().map(|v| v.id) != Some(row.variant_id) {
            variants.push(Variant {
                id: row.variant_id,
                name: row.name.clone(),
                questions: Vec::new(),
            });
        }
        let variant = variants.last_mut().expect("just pushed");

        let Some(question_id) = row.question_id else {
            continue;
        };

        if variant.questions.last().map(|q| q.id) != Some(question_id) {
            variant.questions.push(Question {
                id: question_id,
                question: row.question.unwrap_or_default(),
                answer: row.correct_answer.unwrap_or_default(),
                answers: Vec::new(),
            });
        }

        if let Some(option) = row.option_text {
            let question = variant.questions.last_mut().expect("just pushed");
            question.answers.push(AnswerOption { answer: option });
        }
    }

    variants
}
