use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comments: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Feedback report row joined with student details.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedbackDetail {
    pub student_name: String,
    pub srn: String,
    pub rating: i64,
    pub comments: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
