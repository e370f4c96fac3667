use aws_config::BehaviorVersion;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use rum_script_core::{
    CustomResourceEvent, ResponseStatus, RumMonitorSource, S3ScriptStore, UploaderConfig,
};
use tracing_subscriber::EnvFilter;

mod errors;
mod handler;
mod notifier;

use crate::handler::ScriptUploader;
use crate::notifier::CallbackNotifier;

type Uploader = ScriptUploader<RumMonitorSource, S3ScriptStore, CallbackNotifier>;

async fn function_handler(
    uploader: &Uploader,
    event: LambdaEvent<CustomResourceEvent>,
) -> Result<ResponseStatus, Error> {
    Ok(uploader.handle(&event.payload).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    let config = UploaderConfig::from_env().map_err(errors::HandlerError::from)?;
    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let notifier = CallbackNotifier::new(config.response_timeout)?;

    let uploader = ScriptUploader::new(
        RumMonitorSource::new(&sdk_config),
        S3ScriptStore::new(&sdk_config),
        notifier,
        config,
    );

    run(service_fn(|event| function_handler(&uploader, event))).await
}
