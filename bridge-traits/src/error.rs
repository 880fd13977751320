use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Operation rejected by platform: {0}")]
    Rejected(String),

    #[error("Unknown audio node: {0}")]
    UnknownNode(u32),

    #[error("Unknown media stream: {0}")]
    UnknownStream(u32),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
