use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Storage error: {0}")]
    StorageError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Square API error ({status}): {message}")]
    ProviderError { status: u16, message: String },
    #[error("customer creation failed")]
    CustomerCreationFailed,
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BillingError {
    fn from(err: rocksdb::Error) -> Self {
        BillingError::StorageError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BillingError>;
