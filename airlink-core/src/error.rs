use airlink_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("attach request rejected by broker: {0}")]
    Rejected(String),

    #[error("scan trigger rejected by broker: {0}")]
    ScanRejected(String),

    #[error("config store error: {0}")]
    ConfigStore(String),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(#[from] ModelError),

    #[error("attach timeout must be greater than zero")]
    InvalidTimeout,
}

pub type Result<T> = std::result::Result<T, NetError>;
