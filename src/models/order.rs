use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One order row is one purchased ticket unit. Rows are created by the
/// purchase coordinator, deleted by cancellation, and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub ordered_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PaymentStatus {
    Pending,
    Completed,
}
