use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::Question;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub name: String,
    pub questions: Vec<Question>,
}

/// Bare variant row, used as the existence gate on variant-scoped routes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VariantRef {
    pub id: i64,
    pub name: String,
}

/// One row of the flattened variants/questions/answers join. Question and
/// option columns are nullable since a variant may hold no questions.
#[derive(Debug, Clone, FromRow)]
pub struct VariantRow {
    pub variant_id: i64,
    pub name: String,
    pub question_id: Option<i64>,
    pub question: Option<String>,
    pub correct_answer: Option<String>,
    pub option_text: Option<String>,
}
