use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::engine::{resources, BookingRequest, MaintenanceRequest};
use crate::store::catalog::{self, NewResource};
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_resource(
    State(store): State<Store>,
    Json(body): Json<NewResource>,
) -> Result<Response, AppError> {
    let id = catalog::create_resource(store.pool(), &body).await?;
    Ok(created(id, "Resource added").into_response())
}

pub async fn list_resources(State(store): State<Store>) -> Result<Response, AppError> {
    let resources = catalog::list_resources(store.pool()).await?;
    Ok(success(resources, "Resources listed").into_response())
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

pub async fn set_resource_status(
    State(store): State<Store>,
    Path(resource_id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Result<Response, AppError> {
    catalog::set_resource_status(store.pool(), resource_id, &body.status).await?;
    Ok(empty_success("Resource status updated").into_response())
}

#[derive(Deserialize)]
pub struct MaintenanceBody {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
}

pub async fn schedule_maintenance(
    State(store): State<Store>,
    Path(resource_id): Path<i64>,
    Json(body): Json<MaintenanceBody>,
) -> Result<Response, AppError> {
    let req = MaintenanceRequest {
        resource_id,
        start: body.start,
        end: body.end,
        description: body.description,
    };
    let id = resources::schedule_maintenance(&store, &req).await?;
    Ok(created(id, "Maintenance scheduled").into_response())
}

#[derive(Deserialize)]
pub struct BookingBody {
    pub event_id: i64,
    pub quantity: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub async fn book_resource(
    State(store): State<Store>,
    Path(resource_id): Path<i64>,
    Json(body): Json<BookingBody>,
) -> Result<Response, AppError> {
    let req = BookingRequest {
        event_id: body.event_id,
        resource_id,
        quantity: body.quantity,
        start: body.start,
        end: body.end,
    };
    let outcome = resources::book_resource(&store, &req).await?;
    Ok(created(outcome, "Resource booked").into_response())
}
