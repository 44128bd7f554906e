//! Attendance and feedback eligibility. Per (event, user) the states are
//! NotRegistered -> Registered -> Attended -> FeedbackSubmitted; feedback
//! submission is terminal.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqliteConnection;

use crate::engine::error::EngineError;
use crate::store::Store;

/// Host-only. Idempotent once the student is registered; `NotRegistered`
/// when no participant row exists.
pub async fn mark_attendance(
    store: &Store,
    event_id: i64,
    user_id: i64,
) -> Result<(), EngineError> {
    let result =
        sqlx::query("UPDATE event_participants SET attended = 1 WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(store.pool())
            .await?;

    if result.rows_affected() == 0 {
        return Err(EngineError::NotRegistered);
    }
    tracing::info!(event_id, user_id, "attendance marked");
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub event_id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comments: Option<String>,
}

pub async fn submit_feedback(store: &Store, req: &FeedbackRequest) -> Result<i64, EngineError> {
    if !(1..=5).contains(&req.rating) {
        return Err(EngineError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let mut uow = store.begin().await?;
    match run(uow.conn(), req).await {
        Ok(id) => {
            uow.commit().await?;
            tracing::info!(event_id = req.event_id, user_id = req.user_id, "feedback submitted");
            Ok(id)
        }
        Err(err) => {
            uow.rollback().await?;
            Err(err)
        }
    }
}

async fn run(conn: &mut SqliteConnection, req: &FeedbackRequest) -> Result<i64, EngineError> {
    // Preconditions checked in order: registered, attended, not yet submitted.
    let attended = sqlx::query_scalar::<_, bool>(
        "SELECT attended FROM event_participants WHERE event_id = ? AND user_id = ?",
    )
    .bind(req.event_id)
    .bind(req.user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(EngineError::NotRegistered)?;

    if !attended {
        return Err(EngineError::NotEligible);
    }

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM event_feedback WHERE event_id = ? AND user_id = ?",
    )
    .bind(req.event_id)
    .bind(req.user_id)
    .fetch_one(&mut *conn)
    .await?;
    if existing > 0 {
        return Err(EngineError::AlreadySubmitted);
    }

    let id = sqlx::query(
        "INSERT INTO event_feedback (event_id, user_id, rating, comments, submitted_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(req.event_id)
    .bind(req.user_id)
    .bind(req.rating)
    .bind(&req.comments)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}
