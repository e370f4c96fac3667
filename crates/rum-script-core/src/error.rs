use thiserror::Error;

/// Core errors for the RUM script uploader.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("RUM error: {0}")]
    Rum(#[from] aws_sdk_rum::Error),

    #[error("S3 error: {0}")]
    S3(#[from] aws_sdk_s3::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
