//! Resource allocation. Booking is a capacity-interval accumulation problem:
//! any number of bookings may coexist in a slot as long as their combined
//! draw stays within the resource's total quantity. Maintenance windows take
//! the resource out of play entirely for their interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::engine::error::EngineError;
use crate::engine::interval::{self, Span};
use crate::models::Resource;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub event_id: i64,
    pub resource_id: i64,
    pub quantity: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    pub booking_id: i64,
    /// Units still free in the requested slot after this booking.
    pub remaining: i64,
}

pub async fn book_resource(
    store: &Store,
    req: &BookingRequest,
) -> Result<BookingOutcome, EngineError> {
    if req.end <= req.start {
        return Err(EngineError::Validation(
            "booking end time must be after the start time".to_string(),
        ));
    }
    if req.quantity <= 0 {
        return Err(EngineError::Validation(
            "you must book at least 1 unit".to_string(),
        ));
    }

    let mut uow = store.begin().await?;
    match run_booking(uow.conn(), req).await {
        Ok(outcome) => {
            uow.commit().await?;
            tracing::info!(
                resource_id = req.resource_id,
                event_id = req.event_id,
                quantity = req.quantity,
                remaining = outcome.remaining,
                "resource booked"
            );
            Ok(outcome)
        }
        Err(err) => {
            uow.rollback().await?;
            Err(err)
        }
    }
}

async fn run_booking(
    conn: &mut SqliteConnection,
    req: &BookingRequest,
) -> Result<BookingOutcome, EngineError> {
    let resource = fetch_resource(conn, req.resource_id).await?;

    if req.quantity > resource.quantity {
        return Err(EngineError::Capacity {
            remaining: resource.quantity,
        });
    }

    let windows = maintenance_windows(conn, req.resource_id).await?;
    if let Some(window) = interval::find_conflict(&windows, req.start, req.end, None) {
        return Err(EngineError::Conflict {
            id: window.id,
            label: window.label.clone(),
        });
    }

    // Aggregate concurrent draw over every booking that touches the slot,
    // not just the nearest one.
    let bookings = sqlx::query_as::<_, (i64, DateTime<Utc>, DateTime<Utc>)>(
        "SELECT quantity_booked, booking_start, booking_end \
         FROM event_resources WHERE resource_id = ?",
    )
    .bind(req.resource_id)
    .fetch_all(&mut *conn)
    .await?;

    let overlap_sum: i64 = bookings
        .iter()
        .filter(|(_, start, end)| interval::overlaps(*start, *end, req.start, req.end))
        .map(|(quantity, _, _)| quantity)
        .sum();

    let remaining = resource.quantity - overlap_sum;
    if req.quantity > remaining {
        return Err(EngineError::Capacity { remaining });
    }

    let booking_id = sqlx::query(
        "INSERT INTO event_resources \
         (event_id, resource_id, quantity_booked, booking_start, booking_end) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(req.event_id)
    .bind(req.resource_id)
    .bind(req.quantity)
    .bind(req.start)
    .bind(req.end)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(BookingOutcome {
        booking_id,
        remaining: remaining - req.quantity,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceRequest {
    pub resource_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
}

/// Schedules a maintenance window, refusing while any booking overlaps it,
/// and flips the resource to `Under Maintenance` in the same unit of work.
pub async fn schedule_maintenance(
    store: &Store,
    req: &MaintenanceRequest,
) -> Result<i64, EngineError> {
    if req.end <= req.start {
        return Err(EngineError::Validation(
            "maintenance end time must be after the start time".to_string(),
        ));
    }

    let mut uow = store.begin().await?;
    match run_maintenance(uow.conn(), req).await {
        Ok(id) => {
            uow.commit().await?;
            tracing::info!(resource_id = req.resource_id, window_id = id, "maintenance scheduled");
            Ok(id)
        }
        Err(err) => {
            uow.rollback().await?;
            Err(err)
        }
    }
}

async fn run_maintenance(
    conn: &mut SqliteConnection,
    req: &MaintenanceRequest,
) -> Result<i64, EngineError> {
    fetch_resource(conn, req.resource_id).await?;

    let booked = sqlx::query_as::<_, (i64, String, DateTime<Utc>, DateTime<Utc>)>(
        "SELECT er.id, e.name, er.booking_start, er.booking_end \
         FROM event_resources er JOIN events e ON er.event_id = e.id \
         WHERE er.resource_id = ?",
    )
    .bind(req.resource_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|(id, label, start, end)| Span {
        id,
        label,
        start,
        end,
    })
    .collect::<Vec<_>>();

    if let Some(booking) = interval::find_conflict(&booked, req.start, req.end, None) {
        return Err(EngineError::Conflict {
            id: booking.id,
            label: booking.label.clone(),
        });
    }

    let window_id = sqlx::query(
        "INSERT INTO resource_maintenance (resource_id, starts_at, ends_at, description) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(req.resource_id)
    .bind(req.start)
    .bind(req.end)
    .bind(&req.description)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    sqlx::query(
        "UPDATE resources SET is_available = 0, maintenance_status = 'Under Maintenance' \
         WHERE id = ?",
    )
    .bind(req.resource_id)
    .execute(&mut *conn)
    .await?;

    Ok(window_id)
}

async fn fetch_resource(
    conn: &mut SqliteConnection,
    resource_id: i64,
) -> Result<Resource, EngineError> {
    sqlx::query_as::<_, Resource>(
        "SELECT id, name, kind, quantity, description, maintenance_status, is_available \
         FROM resources WHERE id = ?",
    )
    .bind(resource_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(EngineError::NotFound("resource"))
}

async fn maintenance_windows(
    conn: &mut SqliteConnection,
    resource_id: i64,
) -> Result<Vec<Span>, EngineError> {
    let rows = sqlx::query_as::<_, (i64, String, DateTime<Utc>, DateTime<Utc>)>(
        "SELECT id, description, starts_at, ends_at FROM resource_maintenance \
         WHERE resource_id = ?",
    )
    .bind(resource_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, label, start, end)| Span {
            id,
            label,
            start,
            end,
        })
        .collect())
}
