use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub maintenance_status: String,
    pub is_available: bool,
}

/// Interval during which a resource is offline for maintenance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceWindow {
    pub id: i64,
    pub resource_id: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResourceBooking {
    pub id: i64,
    pub event_id: i64,
    pub resource_id: i64,
    pub quantity_booked: i64,
    pub booking_start: DateTime<Utc>,
    pub booking_end: DateTime<Utc>,
}
