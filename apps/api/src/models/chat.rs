use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatRecord {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub response: String,
    pub capability: String,
    pub timestamp: DateTime<Utc>,
}
