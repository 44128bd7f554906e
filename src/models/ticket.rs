use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub event_id: i64,
    pub ticket_type: String,
    pub price: f64,
    pub quantity: i64,
}

/// Partial update for a ticket type. Only present fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketPatch {
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}
