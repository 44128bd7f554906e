//! Directory and reporting queries around the engine: single-row inserts and
//! read-only listings with no multi-statement invariants of their own.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::engine::error::EngineError;
use crate::models::{
    EventSummary, FeedbackDetail, Host, ParticipantDetail, RegistrationCount, Resource, Student,
    Ticket, TicketPatch, Venue,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub srn: String,
    pub name: String,
    pub semester: i64,
    pub section: String,
}

pub async fn create_student(pool: &SqlitePool, student: &NewStudent) -> Result<i64, EngineError> {
    if !(1..=8).contains(&student.semester) {
        return Err(EngineError::Validation(
            "semester must be between 1 and 8".to_string(),
        ));
    }
    let id = sqlx::query("INSERT INTO students (srn, name, semester, section) VALUES (?, ?, ?, ?)")
        .bind(&student.srn)
        .bind(&student.name)
        .bind(student.semester)
        .bind(&student.section)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(id)
}

pub async fn list_students(pool: &SqlitePool) -> Result<Vec<Student>, EngineError> {
    let students = sqlx::query_as::<_, Student>(
        "SELECT id, srn, name, semester, section FROM students ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(students)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHost {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub department: Option<String>,
}

pub async fn create_host(pool: &SqlitePool, host: &NewHost) -> Result<i64, EngineError> {
    let id = sqlx::query(
        "INSERT INTO hosts (name, email, phone, role, department) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&host.name)
    .bind(&host.email)
    .bind(&host.phone)
    .bind(&host.role)
    .bind(&host.department)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn list_hosts(pool: &SqlitePool) -> Result<Vec<Host>, EngineError> {
    let hosts = sqlx::query_as::<_, Host>(
        "SELECT id, name, email, phone, role, department FROM hosts ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(hosts)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVenue {
    pub name: String,
    pub building: String,
    pub capacity: i64,
}

pub async fn create_venue(pool: &SqlitePool, venue: &NewVenue) -> Result<i64, EngineError> {
    if venue.capacity < 0 {
        return Err(EngineError::Validation(
            "capacity cannot be negative".to_string(),
        ));
    }
    let id = sqlx::query(
        "INSERT INTO venues (name, building, capacity, is_available) VALUES (?, ?, ?, 1)",
    )
    .bind(&venue.name)
    .bind(&venue.building)
    .bind(venue.capacity)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn list_venues(pool: &SqlitePool, available_only: bool) -> Result<Vec<Venue>, EngineError> {
    let sql = if available_only {
        "SELECT id, name, building, capacity, is_available FROM venues \
         WHERE is_available = 1 ORDER BY capacity DESC"
    } else {
        "SELECT id, name, building, capacity, is_available FROM venues ORDER BY name"
    };
    let venues = sqlx::query_as::<_, Venue>(sql).fetch_all(pool).await?;
    Ok(venues)
}

pub async fn set_venue_availability(
    pool: &SqlitePool,
    venue_id: i64,
    available: bool,
) -> Result<(), EngineError> {
    let result = sqlx::query("UPDATE venues SET is_available = ? WHERE id = ?")
        .bind(available)
        .bind(venue_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(EngineError::NotFound("venue"));
    }
    Ok(())
}

/// Events whose end lies in the future, soonest first.
pub async fn upcoming_events(pool: &SqlitePool) -> Result<Vec<EventSummary>, EngineError> {
    let now = Utc::now();
    let mut events = event_summaries(pool).await?;
    events.retain(|event| event.ends_at > now);
    events.sort_by_key(|event| event.starts_at);
    Ok(events)
}

/// Events already over, most recent first.
pub async fn completed_events(pool: &SqlitePool) -> Result<Vec<EventSummary>, EngineError> {
    let now = Utc::now();
    let mut events = event_summaries(pool).await?;
    events.retain(|event| event.ends_at <= now);
    events.sort_by_key(|event| std::cmp::Reverse(event.ends_at));
    Ok(events)
}

async fn event_summaries(pool: &SqlitePool) -> Result<Vec<EventSummary>, EngineError> {
    let events = sqlx::query_as::<_, EventSummary>(
        "SELECT e.id, e.name, e.starts_at, e.ends_at, v.name AS venue_name, h.name AS host_name \
         FROM events e \
         LEFT JOIN venues v ON e.venue_id = v.id \
         JOIN hosts h ON e.organizer_id = h.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// Upcoming events a student is registered for.
pub async fn registrations_for(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<EventSummary>, EngineError> {
    let now = Utc::now();
    let mut events = sqlx::query_as::<_, EventSummary>(
        "SELECT e.id, e.name, e.starts_at, e.ends_at, v.name AS venue_name, h.name AS host_name \
         FROM event_participants p \
         JOIN events e ON p.event_id = e.id \
         LEFT JOIN venues v ON e.venue_id = v.id \
         JOIN hosts h ON e.organizer_id = h.id \
         WHERE p.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    events.retain(|event| event.ends_at > now);
    events.sort_by_key(|event| event.starts_at);
    Ok(events)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub ticket_type: String,
    pub price: f64,
    pub quantity: i64,
}

pub async fn create_ticket(
    pool: &SqlitePool,
    event_id: i64,
    ticket: &NewTicket,
) -> Result<i64, EngineError> {
    if ticket.price < 0.0 {
        return Err(EngineError::Validation(
            "price cannot be negative".to_string(),
        ));
    }
    if ticket.quantity < 0 {
        return Err(EngineError::Validation(
            "quantity cannot be negative".to_string(),
        ));
    }
    let id = sqlx::query(
        "INSERT INTO tickets (event_id, ticket_type, price, quantity) VALUES (?, ?, ?, ?)",
    )
    .bind(event_id)
    .bind(&ticket.ticket_type)
    .bind(ticket.price)
    .bind(ticket.quantity)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn update_ticket(
    pool: &SqlitePool,
    ticket_id: i64,
    patch: &TicketPatch,
) -> Result<(), EngineError> {
    if patch.price.is_none() && patch.quantity.is_none() {
        return Err(EngineError::Validation("no changes specified".to_string()));
    }
    if patch.price.is_some_and(|price| price < 0.0) {
        return Err(EngineError::Validation(
            "price cannot be negative".to_string(),
        ));
    }
    if patch.quantity.is_some_and(|quantity| quantity < 0) {
        return Err(EngineError::Validation(
            "quantity cannot be negative".to_string(),
        ));
    }

    // Only present fields change; absent binds fall through to the current
    // column value.
    let result = sqlx::query(
        "UPDATE tickets SET price = COALESCE(?, price), quantity = COALESCE(?, quantity) \
         WHERE id = ?",
    )
    .bind(patch.price)
    .bind(patch.quantity)
    .bind(ticket_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(EngineError::NotFound("ticket"));
    }
    Ok(())
}

pub async fn tickets_for_event(
    pool: &SqlitePool,
    event_id: i64,
    in_stock_only: bool,
) -> Result<Vec<Ticket>, EngineError> {
    let sql = if in_stock_only {
        "SELECT id, event_id, ticket_type, price, quantity FROM tickets \
         WHERE event_id = ? AND quantity > 0"
    } else {
        "SELECT id, event_id, ticket_type, price, quantity FROM tickets WHERE event_id = ?"
    };
    let tickets = sqlx::query_as::<_, Ticket>(sql)
        .bind(event_id)
        .fetch_all(pool)
        .await?;
    Ok(tickets)
}

pub async fn participants_for_event(
    pool: &SqlitePool,
    event_id: i64,
) -> Result<Vec<ParticipantDetail>, EngineError> {
    let participants = sqlx::query_as::<_, ParticipantDetail>(
        "SELECT s.id AS user_id, s.name, s.srn, p.registered_at, p.attended \
         FROM event_participants p \
         JOIN students s ON p.user_id = s.id \
         WHERE p.event_id = ? ORDER BY s.name",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(participants)
}

pub async fn registration_counts(pool: &SqlitePool) -> Result<Vec<RegistrationCount>, EngineError> {
    let counts = sqlx::query_as::<_, RegistrationCount>(
        "SELECT e.id AS event_id, e.name AS event_name, COUNT(p.user_id) AS registered \
         FROM event_participants p \
         JOIN events e ON p.event_id = e.id \
         GROUP BY p.event_id, e.name \
         ORDER BY registered DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(counts)
}

pub async fn feedback_for_event(
    pool: &SqlitePool,
    event_id: i64,
) -> Result<Vec<FeedbackDetail>, EngineError> {
    let feedback = sqlx::query_as::<_, FeedbackDetail>(
        "SELECT s.name AS student_name, s.srn, f.rating, f.comments, f.submitted_at \
         FROM event_feedback f \
         JOIN students s ON f.user_id = s.id \
         WHERE f.event_id = ?",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(feedback)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewResource {
    pub name: String,
    pub kind: String,
    pub quantity: i64,
    pub description: Option<String>,
}

pub async fn create_resource(pool: &SqlitePool, resource: &NewResource) -> Result<i64, EngineError> {
    if resource.quantity < 0 {
        return Err(EngineError::Validation(
            "quantity cannot be negative".to_string(),
        ));
    }
    let id = sqlx::query(
        "INSERT INTO resources (name, kind, quantity, description, is_available, maintenance_status) \
         VALUES (?, ?, ?, ?, 1, 'Available')",
    )
    .bind(&resource.name)
    .bind(&resource.kind)
    .bind(resource.quantity)
    .bind(&resource.description)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn list_resources(pool: &SqlitePool) -> Result<Vec<Resource>, EngineError> {
    let resources = sqlx::query_as::<_, Resource>(
        "SELECT id, name, kind, quantity, description, maintenance_status, is_available \
         FROM resources ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(resources)
}

/// Manual status update; the availability flag tracks whether the status text
/// reads `Available`.
pub async fn set_resource_status(
    pool: &SqlitePool,
    resource_id: i64,
    status: &str,
) -> Result<(), EngineError> {
    let is_available = status.eq_ignore_ascii_case("available");
    let result =
        sqlx::query("UPDATE resources SET maintenance_status = ?, is_available = ? WHERE id = ?")
            .bind(status)
            .bind(is_available)
            .bind(resource_id)
            .execute(pool)
            .await?;
    if result.rows_affected() == 0 {
        return Err(EngineError::NotFound("resource"));
    }
    Ok(())
}
