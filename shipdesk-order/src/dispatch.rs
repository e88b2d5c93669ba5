use rust_decimal::Decimal;
use serde::Serialize;
use shipdesk_catalog::{Carrier, FeeBreakdown, ShippingPricer};
use shipdesk_core::input::{ensure_amount, ensure_weight};
use shipdesk_core::{CoreError, CoreResult};

use crate::manager::OrderError;
use crate::models::{Order, ShippingCompany, ShippingStatus};

/// Operator-supplied dispatch values. Missing entries take the carrier's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchParams {
    pub weight: Option<Decimal>,
    pub profit: Option<Decimal>,
    /// Net carrier fee; only read for manual-fee carriers
    pub manual_fee: Option<Decimal>,
}

/// A carrier assignment ready to be applied to an order.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchRequest {
    WeightTiered { weight: Decimal, profit: Decimal },
    ManualFee { fee: Decimal, profit: Decimal },
}

impl DispatchRequest {
    /// Resolves the selected company and params into a request.
    /// Fails with [`CoreError::MissingCarrier`] when no carrier is selected.
    pub fn resolve(
        company: ShippingCompany,
        params: &DispatchParams,
        current_weight: Decimal,
        pricer: &ShippingPricer,
    ) -> CoreResult<Self> {
        let carrier = company.carrier().ok_or(CoreError::MissingCarrier)?;
        let profit = params.profit.unwrap_or_else(|| pricer.default_profit(carrier));

        let request = match carrier {
            Carrier::Jt => DispatchRequest::WeightTiered {
                weight: params.weight.unwrap_or(current_weight),
                profit,
            },
            Carrier::Posta => DispatchRequest::ManualFee {
                fee: params.manual_fee.unwrap_or(pricer.config().manual_fee_default),
                profit,
            },
        };

        request.validate()?;
        Ok(request)
    }

    pub fn carrier(&self) -> Carrier {
        match self {
            DispatchRequest::WeightTiered { .. } => Carrier::Jt,
            DispatchRequest::ManualFee { .. } => Carrier::Posta,
        }
    }

    pub fn profit(&self) -> Decimal {
        match self {
            DispatchRequest::WeightTiered { profit, .. } | DispatchRequest::ManualFee { profit, .. } => *profit,
        }
    }

    /// Weight recorded on the order; manual-fee parcels are booked at 1 kg.
    pub fn weight(&self) -> Decimal {
        match self {
            DispatchRequest::WeightTiered { weight, .. } => *weight,
            DispatchRequest::ManualFee { .. } => Decimal::ONE,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        ensure_amount("shipping_profit", self.profit())?;
        match self {
            DispatchRequest::WeightTiered { weight, .. } => {
                ensure_weight(*weight)?;
            }
            DispatchRequest::ManualFee { fee, .. } => {
                ensure_amount("shipping_fee", *fee)?;
            }
        }
        Ok(())
    }

    pub fn fee(&self, order: &Order, pricer: &ShippingPricer) -> FeeBreakdown {
        match self {
            DispatchRequest::WeightTiered { weight, .. } => {
                pricer.weight_tiered_fee(&order.city, *weight, order.total_amount)
            }
            DispatchRequest::ManualFee { fee, .. } => FeeBreakdown::manual(Carrier::Posta, *fee),
        }
    }
}

/// What a dispatch would cost the customer, without persisting anything.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingQuote {
    pub order_id: String,
    pub shipping_company: ShippingCompany,
    /// `None` while the fee is not known yet
    pub fee: Option<FeeBreakdown>,
    pub shipping_profit: Decimal,
    pub product_balance: Decimal,
    pub remaining: Decimal,
}

pub fn quote(order: &Order, request: &DispatchRequest, pricer: &ShippingPricer) -> ShippingQuote {
    let fee = request.fee(order, pricer);
    ShippingQuote {
        order_id: order.id.clone(),
        shipping_company: request.carrier().into(),
        remaining: order.product_balance() + fee.total + request.profit(),
        fee: Some(fee),
        shipping_profit: request.profit(),
        product_balance: order.product_balance(),
    }
}

/// Fixes carrier, weight, fee and profit on the order and moves it to
/// `processing`. All checks run before the first field is touched.
pub fn apply_dispatch(
    order: &mut Order,
    request: &DispatchRequest,
    pricer: &ShippingPricer,
) -> Result<FeeBreakdown, OrderError> {
    if order.is_dispatched() {
        return Err(OrderError::AlreadyDispatched(order.id.clone()));
    }
    request.validate()?;

    let fee = request.fee(order, pricer);

    order.shipping_company = request.carrier().into();
    order.weight = request.weight();
    order.shipping_profit = request.profit();
    order.shipping_fee = fee.total;
    order.update_shipping_status(ShippingStatus::Processing);

    Ok(fee)
}
