use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use shipdesk_core::input::{parse_amount, parse_weight, NumericInput};
use shipdesk_core::CoreResult;
use shipdesk_order::dispatch::quote;
use shipdesk_order::{
    DispatchDraft, DispatchParams, DispatchRequest, ShippingCompany, ShippingQuote, ShippingStatus,
};
use tracing::debug;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::orders::OrderResponse;
use crate::state::AppState;

/// Body of the dispatch and quote endpoints. Values are taken as typed by
/// the operator; anything left out falls back to the carrier's defaults.
#[derive(Debug, Default, Deserialize)]
pub struct DispatchBody {
    #[serde(default)]
    pub shipping_company: ShippingCompany,
    pub weight: Option<NumericInput>,
    pub profit: Option<NumericInput>,
    /// Counter fee for manual-fee carriers
    pub manual_fee: Option<NumericInput>,
}

impl DispatchBody {
    fn params(&self) -> CoreResult<DispatchParams> {
        // manual-fee parcels are booked at 1 kg whatever the form says
        let uses_weight = self.shipping_company.carrier().map_or(false, |c| c.uses_weight());
        let weight = match &self.weight {
            Some(input) if uses_weight => Some(parse_weight(input)?),
            _ => None,
        };

        Ok(DispatchParams {
            weight,
            profit: self
                .profit
                .as_ref()
                .map(|v| parse_amount("shipping_profit", v))
                .transpose()?,
            manual_fee: self
                .manual_fee
                .as_ref()
                .map(|v| parse_amount("shipping_fee", v))
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub shipping_status: ShippingStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders/{id}/shipping/quote", post(quote_shipping))
        .route("/v1/orders/{id}/dispatch", post(dispatch_order))
        .route("/v1/orders/{id}/shipping-status", put(set_shipping_status))
}

/// POST /v1/orders/{id}/shipping/quote
///
/// Nothing is persisted. Without a carrier only the product balance is shown.
pub async fn quote_shipping(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    AppJson(body): AppJson<DispatchBody>,
) -> Result<Json<ShippingQuote>, AppError> {
    let params = body.params()?;
    let order = state.manager.get_order(&order_id).await?;
    let pricer = state.manager.pricer();

    let preview = if body.shipping_company.is_assigned() {
        let request = DispatchRequest::resolve(body.shipping_company, &params, order.weight, pricer)?;
        quote(&order, &request, pricer)
    } else {
        DispatchDraft::for_order(&order, pricer).preview(&order, pricer)
    };

    debug!("Quoted order {}: remaining {}", order.id, preview.remaining);
    Ok(Json(preview))
}

/// POST /v1/orders/{id}/dispatch
pub async fn dispatch_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    AppJson(body): AppJson<DispatchBody>,
) -> Result<Json<OrderResponse>, AppError> {
    let params = body.params()?;
    let order = state
        .manager
        .dispatch(&order_id, body.shipping_company, params)
        .await?;
    Ok(Json(order.into()))
}

/// PUT /v1/orders/{id}/shipping-status
pub async fn set_shipping_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    AppJson(body): AppJson<StatusBody>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.manager.set_status(&order_id, body.shipping_status).await?;
    Ok(Json(order.into()))
}
