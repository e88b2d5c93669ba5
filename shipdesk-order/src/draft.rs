//! Pending edit state for an order waiting in the shipping queue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shipdesk_catalog::{Carrier, ShippingPricer};
use shipdesk_core::input::{ensure_amount, ensure_weight};
use shipdesk_core::{CoreError, CoreResult};

use crate::dispatch::{quote, DispatchRequest, ShippingQuote};
use crate::models::{Order, ShippingCompany};

/// What the operator has typed for one order before confirming dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchDraft {
    pub order_id: String,
    pub weight: Decimal,
    pub profit: Decimal,
    pub company: ShippingCompany,
}

/// Result of confirming a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchStep {
    Ready(DispatchRequest),
    /// Manual-fee carriers need the counter fee entered first
    NeedsManualFee(ManualFeeConfirmation),
}

impl DispatchDraft {
    pub fn for_order(order: &Order, pricer: &ShippingPricer) -> Self {
        let weight = if order.weight >= Decimal::ONE { order.weight } else { Decimal::ONE };
        let profit = if order.shipping_profit > Decimal::ZERO {
            order.shipping_profit
        } else {
            pricer.default_profit(Carrier::Jt)
        };

        Self {
            order_id: order.id.clone(),
            weight,
            profit,
            company: ShippingCompany::None,
        }
    }

    /// Switching carrier always resets profit to that carrier's default,
    /// even if the operator had typed a margin for the previous one.
    pub fn select_company(&mut self, company: ShippingCompany, pricer: &ShippingPricer) {
        self.company = company;
        if let Some(carrier) = company.carrier() {
            self.profit = pricer.default_profit(carrier);
        }
    }

    /// Ignored while a manual-fee carrier is selected.
    pub fn set_weight(&mut self, weight: Decimal) -> CoreResult<()> {
        if self.company.carrier().is_some_and(|c| !c.uses_weight()) {
            return Ok(());
        }
        self.weight = ensure_weight(weight)?;
        Ok(())
    }

    pub fn set_profit(&mut self, profit: Decimal) -> CoreResult<()> {
        self.profit = ensure_amount("shipping_profit", profit)?;
        Ok(())
    }

    /// Live figure shown next to the draft. Only the weight-tiered carrier
    /// has a fee before confirmation; otherwise just the product balance.
    pub fn preview(&self, order: &Order, pricer: &ShippingPricer) -> ShippingQuote {
        match self.company {
            ShippingCompany::Jt => {
                let request = DispatchRequest::WeightTiered { weight: self.weight, profit: self.profit };
                quote(order, &request, pricer)
            }
            _ => ShippingQuote {
                order_id: order.id.clone(),
                shipping_company: self.company,
                fee: None,
                shipping_profit: self.profit,
                product_balance: order.product_balance(),
                remaining: order.product_balance(),
            },
        }
    }

    pub fn confirm(&self, pricer: &ShippingPricer) -> CoreResult<DispatchStep> {
        match self.company.carrier() {
            None => Err(CoreError::MissingCarrier),
            Some(Carrier::Jt) => {
                let request = DispatchRequest::WeightTiered { weight: self.weight, profit: self.profit };
                request.validate()?;
                Ok(DispatchStep::Ready(request))
            }
            Some(Carrier::Posta) => Ok(DispatchStep::NeedsManualFee(ManualFeeConfirmation::new(
                &self.order_id,
                pricer,
            ))),
        }
    }
}

/// Second step for manual-fee carriers: net fee and margin, both editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualFeeConfirmation {
    pub order_id: String,
    pub fee: Decimal,
    pub profit: Decimal,
}

impl ManualFeeConfirmation {
    pub fn new(order_id: &str, pricer: &ShippingPricer) -> Self {
        Self {
            order_id: order_id.to_string(),
            fee: pricer.config().manual_fee_default,
            profit: pricer.default_profit(Carrier::Posta),
        }
    }

    pub fn set_fee(&mut self, fee: Decimal) -> CoreResult<()> {
        self.fee = ensure_amount("shipping_fee", fee)?;
        Ok(())
    }

    pub fn set_profit(&mut self, profit: Decimal) -> CoreResult<()> {
        self.profit = ensure_amount("shipping_profit", profit)?;
        Ok(())
    }

    pub fn preview(&self, order: &Order, pricer: &ShippingPricer) -> ShippingQuote {
        quote(order, &self.to_request(), pricer)
    }

    pub fn to_request(&self) -> DispatchRequest {
        DispatchRequest::ManualFee { fee: self.fee, profit: self.profit }
    }
}
