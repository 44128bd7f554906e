use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::engine::{orders, PurchaseRequest};
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::created;

pub async fn purchase(
    State(store): State<Store>,
    Json(body): Json<PurchaseRequest>,
) -> Result<Response, AppError> {
    let outcome = orders::purchase(&store, &body).await?;
    Ok(created(outcome, "Tickets booked").into_response())
}
