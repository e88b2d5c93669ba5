pub mod ids;
pub mod input;

use rust_decimal::Decimal;

pub use input::NumericInput;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {field} must be a number, got '{value}'")]
    InvalidNumber { field: String, value: String },
    #[error("Validation failed: {field} cannot be negative")]
    Negative { field: String },
    #[error("Validation failed: {field} must be at least {minimum}")]
    BelowMinimum { field: String, minimum: Decimal },
    #[error("Validation failed: {field} must be at most {maximum}")]
    TooLarge { field: String, maximum: Decimal },
    #[error("Validation failed: {0} is required")]
    MissingField(String),
    #[error("Validation failed: choose a shipping company (JT or POSTA) before dispatching")]
    MissingCarrier,
}

pub type CoreResult<T> = Result<T, CoreError>;
