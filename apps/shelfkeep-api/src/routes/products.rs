//! Product catalogue endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use shelfkeep_core::catalog::ProductInput;
use shelfkeep_core::{Action, CoreError, Product};
use shelfkeep_db::UpsertOutcome;

use crate::error::ApiError;
use crate::principal::Caller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: &'static str,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /products`: 201 for a new product, 200 for a restock.
async fn create_product(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    caller.authorize(Action::ManageProducts)?;
    let Json(input) = payload?;

    let outcome = state
        .db
        .products()
        .create_or_restock(&caller.tenant_id, Some(caller.user_id.as_str()), &input)
        .await?;

    let (status, message, product) = match outcome {
        UpsertOutcome::Created(product) => {
            (StatusCode::CREATED, "Product added successfully", product)
        }
        UpsertOutcome::Restocked(product) => {
            (StatusCode::OK, "Product restocked successfully", product)
        }
    };

    Ok((status, Json(ProductResponse { message, product })))
}

async fn list_products(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Product>>, ApiError> {
    caller.authorize(Action::ViewProducts)?;

    let products = state.db.products().list(&caller.tenant_id).await?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    caller.authorize(Action::ViewProducts)?;

    let product = state
        .db
        .products()
        .get_by_id(&caller.tenant_id, &id)
        .await?
        .ok_or(CoreError::ProductNotFound(id))?;

    Ok(Json(product))
}

async fn update_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ProductResponse>, ApiError> {
    caller.authorize(Action::ManageProducts)?;
    let Json(input) = payload?;

    let product = state
        .db
        .products()
        .update(&caller.tenant_id, &id, &input)
        .await?;

    Ok(Json(ProductResponse {
        message: "Product updated",
        product,
    }))
}

async fn delete_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.authorize(Action::ManageProducts)?;

    state.db.products().delete(&caller.tenant_id, &id).await?;

    Ok(Json(MessageResponse {
        message: "Product deleted",
    }))
}
