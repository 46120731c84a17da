use thiserror::Error;

pub type Res<T> = std::result::Result<T, KpiError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KpiError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Unknown subscription status: {0}")]
    UnknownStatus(String),

    #[error("Unknown invoice status: {0}")]
    UnknownInvoiceStatus(String),

    #[error("Unknown recurring interval: {0}")]
    UnknownInterval(String),
}
