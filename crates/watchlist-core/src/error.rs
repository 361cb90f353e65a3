use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),
}
