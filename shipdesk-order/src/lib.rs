pub mod models;
pub mod repository;
pub mod dispatch;
pub mod draft;
pub mod manager;
pub mod finance;
pub mod filter;

pub use models::{NewOrder, Order, OrderStatus, OrderUpdate, PaymentMethod, ShippingCompany, ShippingStatus};
pub use repository::{InMemoryOrderRepository, OrderRepository, StoreError};
pub use dispatch::{DispatchParams, DispatchRequest, ShippingQuote};
pub use draft::{DispatchDraft, DispatchStep, ManualFeeConfirmation};
pub use manager::{OrderError, OrderManager};
pub use finance::{FinanceSummary, InvoiceTotals};
pub use filter::{OrderFilter, ShippingQueue};
