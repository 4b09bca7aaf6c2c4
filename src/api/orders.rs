use axum::extract::State;
use axum::Json;
use sea_orm::prelude::Uuid;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{fail, success, Admin, ApiError, ApiJson, ApiPath, AppState, Success};
use crate::entity::{order, order_item};
use crate::error::Error;
use crate::orders::OrderInput;

#[derive(Debug, Deserialize)]
pub(super) struct StatusRequest {
    status: Option<String>,
}

pub(super) async fn place(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<OrderInput>,
) -> Result<Json<Value>, ApiError> {
    let id = state
        .orders
        .place_order(input)
        .await
        .map_err(fail("Failed to create order"))?;
    Ok(Json(json!({ "id": id })))
}

pub(super) async fn list_all(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<Vec<order::Model>>, ApiError> {
    let orders = state
        .orders
        .list_all(admin)
        .await
        .map_err(fail("Failed to fetch orders"))?;
    Ok(Json(orders))
}

pub(super) async fn items(
    State(state): State<AppState>,
    Admin(admin): Admin,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<order_item::Model>>, ApiError> {
    let items = state
        .orders
        .get_items(admin, id)
        .await
        .map_err(fail("Failed to fetch order items"))?;
    Ok(Json(items))
}

pub(super) async fn update_status(
    State(state): State<AppState>,
    Admin(admin): Admin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<StatusRequest>,
) -> Result<Json<Success>, ApiError> {
    let status = body
        .status
        .ok_or_else(|| Error::validation("Invalid status"))?;

    state
        .orders
        .update_status(admin, id, &status)
        .await
        .map_err(fail("Failed to update order status"))?;
    Ok(success())
}
