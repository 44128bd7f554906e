use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::store::catalog::{self, NewHost, NewStudent};
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn create_student(
    State(store): State<Store>,
    Json(body): Json<NewStudent>,
) -> Result<Response, AppError> {
    let id = catalog::create_student(store.pool(), &body).await?;
    Ok(created(id, "Student added").into_response())
}

pub async fn list_students(State(store): State<Store>) -> Result<Response, AppError> {
    let students = catalog::list_students(store.pool()).await?;
    Ok(success(students, "Students listed").into_response())
}

pub async fn create_host(
    State(store): State<Store>,
    Json(body): Json<NewHost>,
) -> Result<Response, AppError> {
    let id = catalog::create_host(store.pool(), &body).await?;
    Ok(created(id, "Host added").into_response())
}

pub async fn list_hosts(State(store): State<Store>) -> Result<Response, AppError> {
    let hosts = catalog::list_hosts(store.pool()).await?;
    Ok(success(hosts, "Hosts listed").into_response())
}

pub async fn my_registrations(
    State(store): State<Store>,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let events = catalog::registrations_for(store.pool(), user_id).await?;
    Ok(success(events, "Upcoming registrations listed").into_response())
}
