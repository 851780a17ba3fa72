//! Sales endpoints.
//!
//! Recording and deleting go through the [`LedgerService`] so the stock
//! change and the sale row commit together.
//!
//! [`LedgerService`]: shelfkeep_db::LedgerService

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use shelfkeep_core::summary::SalesSummary;
use shelfkeep_core::{Action, Product, Sale, StockUnit};

use crate::error::ApiError;
use crate::principal::Caller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_all_sales).post(record_sale))
        .route("/sales/today", get(list_todays_sales))
        .route("/sales/mine", get(list_my_sales))
        .route("/sales/summary", get(sales_summary))
        .route("/sales/{id}", delete(delete_sale))
}

/// Body of `POST /sales`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleRequest {
    pub product_id: String,
    pub quantity: f64,
    pub sale_unit: StockUnit,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleResponse {
    pub message: &'static str,
    pub sale: Sale,
    pub updated_product: Product,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSaleResponse {
    pub message: &'static str,
    /// `null` when the product was already deleted.
    pub updated_product: Option<Product>,
}

async fn record_sale(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<RecordSaleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordSaleResponse>), ApiError> {
    caller.authorize(Action::RecordSale)?;
    let Json(request) = payload?;

    let recorded = state
        .ledger
        .apply_sale(
            &caller.tenant_id,
            &caller.user_id,
            &request.product_id,
            request.quantity,
            request.sale_unit,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordSaleResponse {
            message: "Sale recorded successfully",
            sale: recorded.sale,
            updated_product: recorded.product,
        }),
    ))
}

async fn list_all_sales(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Sale>>, ApiError> {
    caller.authorize(Action::ViewAllSales)?;

    Ok(Json(state.db.sales().list_all(&caller.tenant_id).await?))
}

async fn list_todays_sales(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Sale>>, ApiError> {
    caller.authorize(Action::ViewTodaysSales)?;

    let sales = state
        .db
        .sales()
        .list_today(&caller.tenant_id, Utc::now(), None)
        .await?;
    Ok(Json(sales))
}

async fn list_my_sales(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Sale>>, ApiError> {
    caller.authorize(Action::ViewOwnSales)?;

    let sales = state
        .db
        .sales()
        .list_by_seller(&caller.tenant_id, &caller.user_id)
        .await?;
    Ok(Json(sales))
}

/// Admins see the whole tenant; storekeepers see their own sales.
async fn sales_summary(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<SalesSummary>, ApiError> {
    caller.authorize(Action::ViewSummary)?;

    let seller = (!caller.is_admin()).then_some(caller.user_id.as_str());
    let summary = state
        .db
        .sales()
        .summary(&caller.tenant_id, Utc::now(), seller)
        .await?;
    Ok(Json(summary))
}

async fn delete_sale(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<DeleteSaleResponse>, ApiError> {
    caller.authorize(Action::DeleteSale)?;

    let reversed = state.ledger.reverse_sale(&caller.tenant_id, &id).await?;

    Ok(Json(DeleteSaleResponse {
        message: "Sale deleted successfully",
        updated_product: reversed.updated_product,
    }))
}
