use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Order;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityCount {
    pub city: String,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPerformance {
    pub sales_username: String,
    /// Sum of `paid` over the rep's orders
    pub revenue: Decimal,
    pub orders: usize,
}

/// Cash position across a set of orders.
#[derive(Debug, Clone, Serialize)]
pub struct FinanceSummary {
    pub report_date: String,
    pub order_count: usize,
    pub dispatched_count: usize,
    pub orders_today: usize,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
    pub shipping_fees: Decimal,
    pub shipping_profit: Decimal,
    /// In order of first appearance
    pub by_city: Vec<CityCount>,
    /// Highest revenue first
    pub by_sales: Vec<SalesPerformance>,
}

impl FinanceSummary {
    pub fn from_orders(orders: &[Order], today: NaiveDate) -> Self {
        let mut summary = Self {
            report_date: Utc::now().to_rfc3339(),
            order_count: orders.len(),
            dispatched_count: 0,
            orders_today: 0,
            total_collected: Decimal::ZERO,
            total_outstanding: Decimal::ZERO,
            shipping_fees: Decimal::ZERO,
            shipping_profit: Decimal::ZERO,
            by_city: Vec::new(),
            by_sales: Vec::new(),
        };

        let mut city_index: HashMap<&str, usize> = HashMap::new();
        let mut sales_index: HashMap<&str, usize> = HashMap::new();

        for order in orders {
            summary.total_collected += order.paid;
            summary.total_outstanding += order.remaining();

            if order.is_dispatched() {
                summary.dispatched_count += 1;
                summary.shipping_fees += order.shipping_fee;
                summary.shipping_profit += order.shipping_profit;
            }
            if order.created_at.date_naive() == today {
                summary.orders_today += 1;
            }

            let city = order.city.trim();
            let idx = *city_index.entry(city).or_insert_with(|| {
                summary.by_city.push(CityCount { city: city.to_string(), orders: 0 });
                summary.by_city.len() - 1
            });
            summary.by_city[idx].orders += 1;

            let rep = order.sales_username.as_str();
            let idx = *sales_index.entry(rep).or_insert_with(|| {
                summary.by_sales.push(SalesPerformance {
                    sales_username: rep.to_string(),
                    revenue: Decimal::ZERO,
                    orders: 0,
                });
                summary.by_sales.len() - 1
            });
            summary.by_sales[idx].revenue += order.paid;
            summary.by_sales[idx].orders += 1;
        }

        // stable, so equal revenue keeps first-appearance order
        summary.by_sales.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        summary
    }
}

/// Figures printed on the customer invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub order_id: String,
    pub product_total: Decimal,
    pub shipping_fee: Decimal,
    pub shipping_profit: Decimal,
    /// Fee plus margin, what the customer sees as shipping
    pub shipping_total: Decimal,
    pub grand_total: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
}

impl InvoiceTotals {
    pub fn for_order(order: &Order) -> Self {
        let shipping_total = order.shipping_total();
        Self {
            order_id: order.id.clone(),
            product_total: order.total_amount,
            shipping_fee: if order.is_dispatched() { order.shipping_fee } else { Decimal::ZERO },
            shipping_profit: if order.is_dispatched() { order.shipping_profit } else { Decimal::ZERO },
            shipping_total,
            grand_total: order.total_amount + shipping_total,
            paid: order.paid,
            remaining: order.remaining(),
        }
    }
}
