use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::store::catalog::{self, NewVenue};
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Deserialize)]
pub struct VenueListQuery {
    #[serde(default)]
    pub available: bool,
}

pub async fn create_venue(
    State(store): State<Store>,
    Json(body): Json<NewVenue>,
) -> Result<Response, AppError> {
    let id = catalog::create_venue(store.pool(), &body).await?;
    Ok(created(id, "Venue added").into_response())
}

pub async fn list_venues(
    State(store): State<Store>,
    Query(query): Query<VenueListQuery>,
) -> Result<Response, AppError> {
    let venues = catalog::list_venues(store.pool(), query.available).await?;
    Ok(success(venues, "Venues listed").into_response())
}

#[derive(Deserialize)]
pub struct AvailabilityBody {
    pub available: bool,
}

pub async fn set_venue_availability(
    State(store): State<Store>,
    Path(venue_id): Path<i64>,
    Json(body): Json<AvailabilityBody>,
) -> Result<Response, AppError> {
    catalog::set_venue_availability(store.pool(), venue_id, body.available).await?;
    Ok(empty_success("Venue availability updated").into_response())
}
