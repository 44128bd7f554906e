use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue_id: Option<i64>,
    pub organizer_id: i64,
    pub status: String,
    pub max_participants: i64,
}

/// Partial update for an event. Absent fields keep their current value;
/// the merged row is re-validated before a single UPDATE is issued.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub venue_id: Option<i64>,
    pub max_participants: Option<i64>,
}

/// Listing row joined with venue and organizer names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue_name: Option<String>,
    pub host_name: String,
}
