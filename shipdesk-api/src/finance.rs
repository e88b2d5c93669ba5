use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use shipdesk_order::{FinanceSummary, OrderFilter};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/finance/summary", get(get_finance_summary))
}

/// GET /v1/finance/summary
pub async fn get_finance_summary(
    State(state): State<AppState>,
) -> Result<Json<FinanceSummary>, AppError> {
    let orders = state.manager.list_orders(&OrderFilter::default()).await?;
    let summary = FinanceSummary::from_orders(&orders, Utc::now().date_naive());

    tracing::debug!(
        "Finance summary over {} orders: collected {}, outstanding {}",
        summary.order_count,
        summary.total_collected,
        summary.total_outstanding
    );
    Ok(Json(summary))
}
