use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shipdesk_core::input::{parse_amount, parse_amount_or, NumericInput};
use shipdesk_core::CoreResult;
use shipdesk_order::{
    InvoiceTotals, NewOrder, Order, OrderFilter, OrderStatus, OrderUpdate, PaymentMethod,
};

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub whatsapp_phone: Option<String>,
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub order_details: String,
    #[serde(default)]
    pub sales_username: String,
    pub total_amount: NumericInput,
    pub paid: Option<NumericInput>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub wallet_number: Option<String>,
    pub shipping_notes: Option<String>,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> CoreResult<NewOrder> {
        Ok(NewOrder {
            total_amount: parse_amount("total_amount", &self.total_amount)?,
            paid: parse_amount_or("paid", self.paid.as_ref(), Decimal::ZERO)?,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            whatsapp_phone: self.whatsapp_phone,
            city: self.city,
            address: self.address,
            order_details: self.order_details,
            sales_username: self.sales_username,
            payment_method: self.payment_method,
            wallet_number: self.wallet_number,
            shipping_notes: self.shipping_notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub order_details: Option<String>,
    pub status: Option<OrderStatus>,
    pub total_amount: Option<NumericInput>,
    pub paid: Option<NumericInput>,
    pub payment_method: Option<PaymentMethod>,
    pub wallet_number: Option<String>,
    pub shipping_notes: Option<String>,
}

impl UpdateOrderRequest {
    fn into_update(self) -> CoreResult<OrderUpdate> {
        Ok(OrderUpdate {
            total_amount: self.total_amount.map(|v| parse_amount("total_amount", &v)).transpose()?,
            paid: self.paid.map(|v| parse_amount("paid", &v)).transpose()?,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            whatsapp_phone: self.whatsapp_phone,
            city: self.city,
            address: self.address,
            order_details: self.order_details,
            status: self.status,
            payment_method: self.payment_method,
            wallet_number: self.wallet_number,
            shipping_notes: self.shipping_notes,
        })
    }
}

/// An order plus the figures derived from it at read time.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub product_balance: Decimal,
    pub shipping_total: Decimal,
    pub remaining: Decimal,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            product_balance: order.product_balance(),
            shipping_total: order.shipping_total(),
            remaining: order.remaining(),
            order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub count: usize,
    pub orders: Vec<OrderResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders).post(create_order))
        .route(
            "/v1/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/v1/orders/{id}/invoice", get(get_invoice))
}

/// GET /v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<OrderListResponse>, AppError> {
    let orders: Vec<OrderResponse> = state
        .manager
        .list_orders(&filter)
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();

    Ok(Json(OrderListResponse {
        count: orders.len(),
        orders,
    }))
}

/// POST /v1/orders
pub async fn create_order(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let order = state.manager.create_order(req.into_new_order()?).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.manager.get_order(&order_id).await?;
    Ok(Json(order.into()))
}

/// PUT /v1/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    AppJson(req): AppJson<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.manager.update_order(&order_id, req.into_update()?).await?;
    Ok(Json(order.into()))
}

/// DELETE /v1/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.manager.delete_order(&order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/orders/{id}/invoice
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<InvoiceTotals>, AppError> {
    let order = state.manager.get_order(&order_id).await?;
    Ok(Json(InvoiceTotals::for_order(&order)))
}
