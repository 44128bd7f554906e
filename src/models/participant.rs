use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub event_id: i64,
    pub user_id: i64,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
}

/// Participant listing row joined with student details.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParticipantDetail {
    pub user_id: i64,
    pub name: String,
    pub srn: String,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationCount {
    pub event_id: i64,
    pub event_name: String,
    pub registered: i64,
}
