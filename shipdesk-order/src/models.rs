use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shipdesk_catalog::Carrier;
use shipdesk_shared::Masked;

/// Where the parcel is, as tracked by the shipping team
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Returned,
}

impl ShippingStatus {
    pub const ALL: [ShippingStatus; 5] = [
        ShippingStatus::Pending,
        ShippingStatus::Processing,
        ShippingStatus::Shipped,
        ShippingStatus::Delivered,
        ShippingStatus::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingStatus::Pending => "pending",
            ShippingStatus::Processing => "processing",
            ShippingStatus::Shipped => "shipped",
            ShippingStatus::Delivered => "delivered",
            ShippingStatus::Returned => "returned",
        }
    }
}

/// Sales-side order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

/// Carrier assignment on the order record. `None` means not dispatched yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingCompany {
    #[default]
    None,
    Jt,
    Posta,
}

impl ShippingCompany {
    pub fn carrier(&self) -> Option<Carrier> {
        match self {
            ShippingCompany::None => None,
            ShippingCompany::Jt => Some(Carrier::Jt),
            ShippingCompany::Posta => Some(Carrier::Posta),
        }
    }

    pub fn code(&self) -> &'static str {
        match self.carrier() {
            Some(carrier) => carrier.code(),
            None => "NONE",
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.carrier().is_some()
    }
}

impl From<Carrier> for ShippingCompany {
    fn from(carrier: Carrier) -> Self {
        match carrier {
            Carrier::Jt => ShippingCompany::Jt,
            Carrier::Posta => ShippingCompany::Posta,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    VodafoneCash,
    Instapay,
    /// Cash on delivery
    Cash,
    BankTransfer,
}

/// A customer order and its shipping/financial state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: Masked<String>,
    pub whatsapp_phone: Option<Masked<String>>,
    /// Governorate, used as the zone key
    pub city: String,
    pub address: String,
    pub order_details: String,
    pub status: OrderStatus,
    pub sales_username: String,
    pub total_amount: Decimal,
    pub paid: Decimal,
    pub payment_method: PaymentMethod,
    pub wallet_number: Option<String>,
    /// Kilograms
    pub weight: Decimal,
    pub shipping_status: ShippingStatus,
    pub shipping_fee: Decimal,
    pub shipping_profit: Decimal,
    pub shipping_company: ShippingCompany,
    pub shipping_notes: Option<String>,
    /// Bumped by the store on every write
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: String, new: NewOrder, default_profit: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_name: new.customer_name,
            customer_phone: Masked(new.customer_phone),
            whatsapp_phone: new.whatsapp_phone.map(Masked),
            city: new.city,
            address: new.address,
            order_details: new.order_details,
            status: OrderStatus::Pending,
            sales_username: new.sales_username,
            total_amount: new.total_amount,
            paid: new.paid,
            payment_method: new.payment_method,
            wallet_number: new.wallet_number,
            weight: Decimal::ONE,
            shipping_status: ShippingStatus::Pending,
            shipping_fee: Decimal::ZERO,
            shipping_profit: default_profit,
            shipping_company: ShippingCompany::None,
            shipping_notes: new.shipping_notes,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_dispatched(&self) -> bool {
        self.shipping_company.is_assigned()
    }

    /// Unpaid product cost. Negative when the customer overpaid.
    pub fn product_balance(&self) -> Decimal {
        self.total_amount - self.paid
    }

    /// Carrier cost plus margin, only once a carrier has been assigned.
    pub fn shipping_total(&self) -> Decimal {
        if self.is_dispatched() {
            self.shipping_fee + self.shipping_profit
        } else {
            Decimal::ZERO
        }
    }

    /// What the customer still owes. Always derived from the current
    /// amounts, so edits to `total_amount`/`paid` after dispatch are
    /// reflected without a separate recalculation step.
    pub fn remaining(&self) -> Decimal {
        self.product_balance() + self.shipping_total()
    }

    /// Update shipping status
    pub fn update_shipping_status(&mut self, status: ShippingStatus) {
        self.shipping_status = status;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Validated input for a new order
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub whatsapp_phone: Option<String>,
    pub city: String,
    pub address: String,
    pub order_details: String,
    pub sales_username: String,
    pub total_amount: Decimal,
    pub paid: Decimal,
    pub payment_method: PaymentMethod,
    pub wallet_number: Option<String>,
    pub shipping_notes: Option<String>,
}

/// Partial edit of an existing order. Shipping fields are owned by
/// dispatch and the status operation, so they are not editable here.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub order_details: Option<String>,
    pub status: Option<OrderStatus>,
    pub total_amount: Option<Decimal>,
    pub paid: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub wallet_number: Option<String>,
    pub shipping_notes: Option<String>,
}

impl OrderUpdate {
    pub fn apply(self, order: &mut Order) {
        if let Some(v) = self.customer_name { order.customer_name = v; }
        if let Some(v) = self.customer_phone { order.customer_phone = Masked(v); }
        if let Some(v) = self.whatsapp_phone { order.whatsapp_phone = Some(Masked(v)); }
        if let Some(v) = self.city { order.city = v; }
        if let Some(v) = self.address { order.address = v; }
        if let Some(v) = self.order_details { order.order_details = v; }
        if let Some(v) = self.status { order.status = v; }
        if let Some(v) = self.total_amount { order.total_amount = v; }
        if let Some(v) = self.paid { order.paid = v; }
        if let Some(v) = self.payment_method { order.payment_method = v; }
        if let Some(v) = self.wallet_number { order.wallet_number = Some(v); }
        if let Some(v) = self.shipping_notes { order.shipping_notes = Some(v); }
        order.touch();
    }
}
