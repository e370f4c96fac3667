use rum_script_core::{ConfigError, CoreError};

/// Errors from delivering a response to CloudFormation.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP transport error.
    #[error("callback HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The pre-signed URL answered with a non-success status.
    #[error("callback rejected with status {0}")]
    Status(reqwest::StatusCode),
    /// The response document could not be encoded.
    #[error("callback encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl NotifyError {
    /// A 4xx from the pre-signed URL (expired or mismatched signature) will
    /// not change on retry.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Status(status) if status.is_client_error())
    }
}

/// Errors from the uploader.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Error from RUM or S3 operations.
    #[error("uploader core error: {0}")]
    Core(#[from] CoreError),
    /// CloudFormation never received a response.
    #[error("uploader notify error: {0}")]
    Notify(#[from] NotifyError),
    /// Invalid Lambda environment.
    #[error("uploader config error: {0}")]
    Config(#[from] ConfigError),
}
