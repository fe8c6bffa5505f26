use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub uuid: Uuid,
    pub login: String,
    pub authorized: bool,
    pub authorized_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quit_at: Option<DateTime<Utc>>,
}
