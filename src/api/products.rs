use axum::extract::State;
use axum::Json;
use sea_orm::prelude::Uuid;
use serde_json::{json, Value};

use super::{fail, success, Admin, ApiError, ApiJson, ApiPath, AppState, Success};
use crate::catalog::ProductInput;
use crate::entity::product;

pub(super) async fn list_public(
    State(state): State<AppState>,
) -> Result<Json<Vec<product::Model>>, ApiError> {
    let products = state
        .catalog
        .list_public()
        .await
        .map_err(fail("Failed to fetch products"))?;
    Ok(Json(products))
}

pub(super) async fn list_all(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<Vec<product::Model>>, ApiError> {
    let products = state
        .catalog
        .list_all(admin)
        .await
        .map_err(fail("Failed to fetch products"))?;
    Ok(Json(products))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Admin(admin): Admin,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Value>, ApiError> {
    let id = state
        .catalog
        .create(admin, input)
        .await
        .map_err(fail("Failed to create product"))?;
    Ok(Json(json!({ "id": id })))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Admin(admin): Admin,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Success>, ApiError> {
    state
        .catalog
        .update(admin, id, input)
        .await
        .map_err(fail("Failed to update product"))?;
    Ok(success())
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Admin(admin): Admin,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Success>, ApiError> {
    state
        .catalog
        .delete(admin, id)
        .await
        .map_err(fail("Failed to delete product"))?;
    Ok(success())
}
