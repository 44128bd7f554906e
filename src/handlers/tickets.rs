use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::models::TicketPatch;
use crate::store::catalog::{self, NewTicket};
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_ticket(
    State(store): State<Store>,
    Path(event_id): Path<i64>,
    Json(body): Json<NewTicket>,
) -> Result<Response, AppError> {
    let id = catalog::create_ticket(store.pool(), event_id, &body).await?;
    Ok(created(id, "Ticket type added").into_response())
}

pub async fn update_ticket(
    State(store): State<Store>,
    Path(ticket_id): Path<i64>,
    Json(patch): Json<TicketPatch>,
) -> Result<Response, AppError> {
    catalog::update_ticket(store.pool(), ticket_id, &patch).await?;
    Ok(empty_success("Ticket updated").into_response())
}

#[derive(Deserialize)]
pub struct TicketListQuery {
    #[serde(default)]
    pub in_stock: bool,
}

pub async fn list_event_tickets(
    State(store): State<Store>,
    Path(event_id): Path<i64>,
    Query(query): Query<TicketListQuery>,
) -> Result<Response, AppError> {
    let tickets = catalog::tickets_for_event(store.pool(), event_id, query.in_stock).await?;
    Ok(success(tickets, "Tickets listed").into_response())
}
