use std::fmt::Display;

use chrono::Utc;
use rum_script_core::{
    CustomResourceEvent, CustomResourceResponse, MonitorSource, RequestType, ResourceProperties,
    ResponseData, ResponseStatus, ScriptStore, UploaderConfig, render_script,
};
use tracing::{error, info, warn};

use crate::errors::HandlerError;
use crate::notifier::Notifier;

/// Serves the custom resource that keeps the RUM script in the website bucket.
pub struct ScriptUploader<M, S, N> {
    monitors: M,
    store: S,
    notifier: N,
    config: UploaderConfig,
}

impl<M, S, N> ScriptUploader<M, S, N>
where
    M: MonitorSource + Sync,
    S: ScriptStore + Sync,
    N: Notifier + Sync,
{
    pub fn new(monitors: M, store: S, notifier: N, config: UploaderConfig) -> Self {
        Self {
            monitors,
            store,
            notifier,
            config,
        }
    }

    /// Handle one lifecycle request and report the outcome to CloudFormation.
    ///
    /// 1. Validate the resource properties
    /// 2. Create/Update: render the script from the app monitor and put it
    /// 3. Delete: remove the script
    /// 4. Send SUCCESS or FAILED to the event's `ResponseURL`
    ///
    /// Only a failed callback is returned as an error; everything else is
    /// reported to CloudFormation as `FAILED`.
    pub async fn handle(&self, event: &CustomResourceEvent) -> Result<ResponseStatus, HandlerError> {
        info!(
            request_type = %event.request_type,
            request_id = %event.request_id,
            properties = %event.resource_properties,
            "received RUM script request"
        );

        let response = match event.properties() {
            Err(e) => {
                warn!(error = %e, "rejecting request with invalid resource properties");
                self.failure(event, &e)
            }
            Ok(props) => match self.apply(event.request_type, &props).await {
                Ok(data) => {
                    info!(
                        request_type = %event.request_type,
                        app_monitor = %props.app_monitor_name,
                        bucket = %props.s3_bucket_name,
                        "processed RUM script request"
                    );
                    CustomResourceResponse::success(event, data)
                }
                Err(e) => {
                    error!(
                        request_type = %event.request_type,
                        error = %e,
                        "failed to process RUM script request"
                    );
                    self.failure(event, &e)
                }
            },
        };

        self.notifier.notify(&event.response_url, &response).await?;
        Ok(response.status)
    }

    async fn apply(
        &self,
        request_type: RequestType,
        props: &ResourceProperties,
    ) -> Result<Option<ResponseData>, HandlerError> {
        match request_type {
            RequestType::Create | RequestType::Update => self.upsert(props).await.map(Some),
            RequestType::Delete => self.destroy(props).await.map(|()| None),
        }
    }

    async fn upsert(&self, props: &ResourceProperties) -> Result<ResponseData, HandlerError> {
        let script = match self.monitors.fetch(&props.app_monitor_name).await? {
            Some(monitor) => render_script(&monitor, &self.config.script)?,
            None => {
                warn!(
                    app_monitor = %props.app_monitor_name,
                    "app monitor lookup returned nothing, uploading empty script"
                );
                String::new()
            }
        };
        info!(size = script.len(), "built RUM script");

        let key = &self.config.script_key;
        self.store
            .put_script(&props.s3_bucket_name, key, script)
            .await?;
        info!(bucket = %props.s3_bucket_name, key = %key, "RUM script uploaded");

        Ok(ResponseData {
            script_key: key.clone(),
            script_url: format!("s3://{}/{key}", props.s3_bucket_name),
            uploaded_at: Some(Utc::now().to_rfc3339()),
        })
    }

    async fn destroy(&self, props: &ResourceProperties) -> Result<(), HandlerError> {
        let key = &self.config.script_key;
        self.store.delete_script(&props.s3_bucket_name, key).await?;
        info!(bucket = %props.s3_bucket_name, key = %key, "RUM script deleted");
        Ok(())
    }

    fn failure(&self, event: &CustomResourceEvent, err: &impl Display) -> CustomResourceResponse {
        CustomResourceResponse::failure(event, err.to_string(), self.config.log_stream.as_deref())
    }
}
