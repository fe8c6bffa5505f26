use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user's single attempt at one variant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Testing {
    pub id: i64,
    pub user_id: i64,
    pub variant_id: i64,
    pub correct_answers: i32,
    pub start_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_at: Option<DateTime<Utc>>,
}
