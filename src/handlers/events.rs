use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::engine::{attendance, cancel, schedule, FeedbackRequest, NewEvent};
use crate::models::EventPatch;
use crate::store::catalog;
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Deserialize)]
pub struct EventListQuery {
    pub window: Option<String>,
}

pub async fn create_event(
    State(store): State<Store>,
    Json(body): Json<NewEvent>,
) -> Result<Response, AppError> {
    let id = schedule::create_event(&store, &body).await?;
    Ok(created(id, "Event scheduled").into_response())
}

pub async fn update_event(
    State(store): State<Store>,
    Path(event_id): Path<i64>,
    Json(patch): Json<EventPatch>,
) -> Result<Response, AppError> {
    schedule::update_event(&store, event_id, &patch).await?;
    Ok(empty_success("Event updated").into_response())
}

pub async fn list_events(
    State(store): State<Store>,
    Query(query): Query<EventListQuery>,
) -> Result<Response, AppError> {
    let events = match query.window.as_deref() {
        Some("completed") => catalog::completed_events(store.pool()).await?,
        _ => catalog::upcoming_events(store.pool()).await?,
    };
    Ok(success(events, "Events listed").into_response())
}

pub async fn list_participants(
    State(store): State<Store>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let participants = catalog::participants_for_event(store.pool(), event_id).await?;
    Ok(success(participants, "Participants listed").into_response())
}

pub async fn registration_counts(State(store): State<Store>) -> Result<Response, AppError> {
    let counts = catalog::registration_counts(store.pool()).await?;
    Ok(success(counts, "Registration counts listed").into_response())
}

pub async fn mark_attendance(
    State(store): State<Store>,
    Path((event_id, user_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    attendance::mark_attendance(&store, event_id, user_id).await?;
    Ok(empty_success("Attendance marked").into_response())
}

pub async fn cancel_registration(
    State(store): State<Store>,
    Path((event_id, user_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let outcome = cancel::cancel_registration(&store, event_id, user_id).await?;
    Ok(success(outcome, "Registration cancelled").into_response())
}

#[derive(Deserialize)]
pub struct FeedbackBody {
    pub user_id: i64,
    pub rating: i64,
    pub comments: Option<String>,
}

pub async fn submit_feedback(
    State(store): State<Store>,
    Path(event_id): Path<i64>,
    Json(body): Json<FeedbackBody>,
) -> Result<Response, AppError> {
    let req = FeedbackRequest {
        event_id,
        user_id: body.user_id,
        rating: body.rating,
        comments: body.comments,
    };
    let id = attendance::submit_feedback(&store, &req).await?;
    Ok(created(id, "Feedback submitted").into_response())
}

pub async fn event_feedback(
    State(store): State<Store>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let feedback = catalog::feedback_for_event(store.pool(), event_id).await?;
    Ok(success(feedback, "Feedback listed").into_response())
}
