use std::future::Future;

use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use crate::error::CoreError;
use crate::model::BucketName;

const SCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Object storage for the rendered script.
///
/// Both operations are idempotent: putting overwrites, deleting a missing
/// object succeeds.
pub trait ScriptStore {
    fn put_script(
        &self,
        bucket: &BucketName,
        key: &str,
        body: String,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_script(
        &self,
        bucket: &BucketName,
        key: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// `ScriptStore` backed by S3.
#[derive(Clone)]
pub struct S3ScriptStore {
    client: Client,
}

impl S3ScriptStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    /// Wrap an already configured client, e.g. one using path-style addressing.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl ScriptStore for S3ScriptStore {
    async fn put_script(&self, bucket: &BucketName, key: &str, body: String) -> Result<(), CoreError> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket.as_ref())
            .key(key)
            .content_type(SCRIPT_CONTENT_TYPE)
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        debug!(bucket = %bucket, key, size, "put script object");
        Ok(())
    }

    async fn delete_script(&self, bucket: &BucketName, key: &str) -> Result<(), CoreError> {
        self.client
            .delete_object()
            .bucket(bucket.as_ref())
            .key(key)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        debug!(bucket = %bucket, key, "deleted script object");
        Ok(())
    }
}
