//! Event scheduling. Creation and every update that could move an event into
//! another event's slot re-validate the venue capacity and time-conflict
//! invariants inside one unit of work.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqliteConnection;

use crate::engine::error::EngineError;
use crate::engine::interval::{self, Span};
use crate::models::{Event, EventPatch, Venue};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue_id: Option<i64>,
    pub organizer_id: i64,
    pub max_participants: i64,
}

pub async fn create_event(store: &Store, event: &NewEvent) -> Result<i64, EngineError> {
    if event.ends_at <= event.starts_at {
        return Err(EngineError::Validation(
            "event end time must be after the start time".to_string(),
        ));
    }
    if event.max_participants < 0 {
        return Err(EngineError::Validation(
            "max participants cannot be negative".to_string(),
        ));
    }

    let mut uow = store.begin().await?;
    match run_create(uow.conn(), event).await {
        Ok(id) => {
            uow.commit().await?;
            tracing::info!(event_id = id, name = %event.name, "event scheduled");
            Ok(id)
        }
        Err(err) => {
            uow.rollback().await?;
            Err(err)
        }
    }
}

async fn run_create(conn: &mut SqliteConnection, event: &NewEvent) -> Result<i64, EngineError> {
    if let Some(venue_id) = event.venue_id {
        check_venue(
            conn,
            venue_id,
            event.max_participants,
            event.starts_at,
            event.ends_at,
            None,
        )
        .await?;
    }

    let id = sqlx::query(
        "INSERT INTO events \
         (name, description, starts_at, ends_at, venue_id, organizer_id, status, max_participants) \
         VALUES (?, ?, ?, ?, ?, ?, 'Scheduled', ?)",
    )
    .bind(&event.name)
    .bind(&event.description)
    .bind(event.starts_at)
    .bind(event.ends_at)
    .bind(event.venue_id)
    .bind(event.organizer_id)
    .bind(event.max_participants)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Applies a typed patch. The merged row is validated as a whole, so moving
/// the time, the venue or the participant limit each re-run the checks that
/// could break invariants.
pub async fn update_event(
    store: &Store,
    event_id: i64,
    patch: &EventPatch,
) -> Result<(), EngineError> {
    let mut uow = store.begin().await?;
    match run_update(uow.conn(), event_id, patch).await {
        Ok(()) => {
            uow.commit().await?;
            tracing::info!(event_id, "event updated");
            Ok(())
        }
        Err(err) => {
            uow.rollback().await?;
            Err(err)
        }
    }
}

async fn run_update(
    conn: &mut SqliteConnection,
    event_id: i64,
    patch: &EventPatch,
) -> Result<(), EngineError> {
    let current = sqlx::query_as::<_, Event>(
        "SELECT id, name, description, starts_at, ends_at, venue_id, organizer_id, status, \
         max_participants FROM events WHERE id = ?",
    )
    .bind(event_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(EngineError::NotFound("event"))?;

    let name = patch.name.clone().unwrap_or(current.name);
    let description = patch.description.clone().or(current.description);
    let starts_at = patch.starts_at.unwrap_or(current.starts_at);
    let ends_at = patch.ends_at.unwrap_or(current.ends_at);
    let venue_id = patch.venue_id.or(current.venue_id);
    let max_participants = patch.max_participants.unwrap_or(current.max_participants);

    if ends_at <= starts_at {
        return Err(EngineError::Validation(
            "event end time must be after the start time".to_string(),
        ));
    }
    if max_participants < 0 {
        return Err(EngineError::Validation(
            "max participants cannot be negative".to_string(),
        ));
    }

    if let Some(venue_id) = venue_id {
        check_venue(
            conn,
            venue_id,
            max_participants,
            starts_at,
            ends_at,
            Some(event_id),
        )
        .await?;
    }

    sqlx::query(
        "UPDATE events SET name = ?, description = ?, starts_at = ?, ends_at = ?, \
         venue_id = ?, max_participants = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(&description)
    .bind(starts_at)
    .bind(ends_at)
    .bind(venue_id)
    .bind(max_participants)
    .bind(event_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Invariants 1 and 2: the venue must exist and be available, the participant
/// limit must fit its capacity, and no other event may hold an overlapping
/// slot there.
async fn check_venue(
    conn: &mut SqliteConnection,
    venue_id: i64,
    max_participants: i64,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    exclude_event: Option<i64>,
) -> Result<(), EngineError> {
    let venue = sqlx::query_as::<_, Venue>(
        "SELECT id, name, building, capacity, is_available FROM venues WHERE id = ?",
    )
    .bind(venue_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(EngineError::NotFound("venue"))?;

    if !venue.is_available {
        return Err(EngineError::Validation(format!(
            "venue '{}' is not available",
            venue.name
        )));
    }
    if max_participants > venue.capacity {
        return Err(EngineError::Capacity {
            remaining: venue.capacity,
        });
    }

    let booked = venue_schedule(conn, venue_id).await?;
    if let Some(hit) = interval::find_conflict(&booked, starts_at, ends_at, exclude_event) {
        return Err(EngineError::Conflict {
            id: hit.id,
            label: hit.label.clone(),
        });
    }

    Ok(())
}

async fn venue_schedule(
    conn: &mut SqliteConnection,
    venue_id: i64,
) -> Result<Vec<Span>, EngineError> {
    let rows = sqlx::query_as::<_, (i64, String, DateTime<Utc>, DateTime<Utc>)>(
        "SELECT id, name, starts_at, ends_at FROM events WHERE venue_id = ?",
    )
    .bind(venue_id)
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
