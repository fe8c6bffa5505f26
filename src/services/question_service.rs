use sqlx::PgPool;

use crate::dto::question_dto::CreateQuestionRequest;
use crate::error::{db_error_kind, DbErrorKind, Error, Result};
use crate::models::question::{AnswerOption, Question, QuestionRow};
use crate::models::testing::Testing;

const QUESTION_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, variant_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE variant_id = $1")
            .bind(variant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts the question, its three options, and the link rows in one
    /// transaction. The limit check happens first, so a sixth question
    /// never reaches storage.
    pub async fn add(&self, variant_id: i64, payload: &CreateQuestionRequest) -> Result<()> {
        tracing::info!(variant_id, question = %payload.question, "question add received");

        if self.count(variant_id).await? >= QUESTION_LIMIT {
            return Err(Error::QuestionLimitExceeded);
        }

        let mut tx = self.pool.begin().await?;

        let question_id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (variant_id, question, answer) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(variant_id)
        .bind(&payload.question)
        .bind(&payload.answer)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::UniqueViolation => Error::QuestionAlreadyExists,
            DbErrorKind::ForeignKeyViolation => Error::VariantNotFound,
            _ => {
                tracing::error!(error = ?err, "question insert failed");
                Error::from(err)
            }
        })?;

        for option in &payload.answers {
            let answer_id: i64 =
                sqlx::query_scalar("INSERT INTO answers (answer) VALUES ($1) RETURNING id")
                    .bind(&option.answer)
                    .fetch_one(&mut *tx)
                    .await?;

            sqlx::query(
                "INSERT INTO questions_and_answers (question_id, answer_id) VALUES ($1, $2)",
            )
            .bind(question_id)
            .bind(answer_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(variant_id, question_id, "question add success");

        Ok(())
    }

    /// Transactionally unlinks the question, sweeps answers no longer
    /// referenced by any link, and deletes the question row. A miss on
    /// the final delete rolls the whole transaction back.
    pub async fn remove(&self, variant_id: i64, question: &str) -> Result<()> {
        tracing::info!(variant_id, question, "question remove received");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM questions_and_answers
            WHERE question_id IN (SELECT id FROM questions WHERE variant_id = $1 AND question = $2)
            "#,
        )
        .bind(variant_id)
        .bind(question)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM answers
            WHERE id NOT IN (SELECT DISTINCT answer_id FROM questions_and_answers)
            "#,
        )
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM questions WHERE variant_id = $1 AND question = $2")
            .bind(variant_id)
            .bind(question)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::QuestionNotFound);
        }

        tx.commit().await?;

        tracing::info!(variant_id, question, "question remove success");

        Ok(())
    }

    pub async fn get(&self, variant_id: i64, question_id: i64) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, question, answer FROM questions WHERE id = $1 AND variant_id = $2",
        )
        .bind(question_id)
        .bind(variant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::NotFound => Error::QuestionNotFound,
            _ => {
                tracing::error!(error = ?err, "question get failed");
                Error::from(err)
            }
        })?;

        let options = sqlx::query_scalar::<_, String>(
            r#"
            SELECT a.answer
            FROM questions_and_answers qa
                JOIN answers a ON a.id = qa.answer_id
            WHERE qa.question_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Question {
            id: row.id,
            question: row.question,
            answer: row.answer,
            answers: options
                .into_iter()
                .map(|answer| AnswerOption { answer })
                .collect(),
        })
    }

    /// Records the submission once in the audit log and, when the text
    /// exactly matches the canonical answer, bumps the counter with an
    /// atomic conditional UPDATE inside the same transaction. No
    /// in-process lock; lost updates are impossible even across
    /// horizontally-scaled instances.
    pub async fn accept(
        &self,
        variant_id: i64,
        question_id: i64,
        user_id: i64,
        answer: &str,
    ) -> Result<()> {
        tracing::info!(variant_id, question_id, user_id, "question accept received");

        let test = sqlx::query_as::<_, Testing>(
            r#"
            SELECT id, user_id, variant_id, correct_answers, start_at, finish_at
            FROM testing
            WHERE user_id = $1 AND variant_id = $2 AND finish_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(variant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::NotFound => Error::TestNotFound,
            _ => {
                tracing::error!(error = ?err, "testing lookup failed");
                Error::from(err)
            }
        })?;

        let question = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, question, answer FROM questions WHERE id = $1 AND variant_id = $2",
        )
        .bind(question_id)
        .bind(variant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match db_error_kind(&err) {
            DbErrorKind::NotFound => Error::QuestionNotFound,
            _ => {
                tracing::error!(error = ?err, "question lookup failed");
                Error::from(err)
            }
        })?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO user_answers (test_id, question_id, answer) VALUES ($1, $2, $3)")
            .bind(test.id)
            .bind(question.id)
            .bind(answer)
            .execute(&mut *tx)
            .await?;

        let correct = question.answer == answer;
        if correct {
            sqlx::query(
                r#"
                UPDATE testing SET correct_answers = correct_answers + 1
                WHERE id = $1 AND finish_at IS NULL
                "#,
            )
            .bind(test.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(variant_id, question_id, user_id, correct, "question accept success");

        Ok(())
    }
}
