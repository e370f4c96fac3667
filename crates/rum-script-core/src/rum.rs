use std::future::Future;

use aws_config::SdkConfig;
use aws_sdk_rum::Client;
use tracing::debug;

use crate::error::CoreError;
use crate::model::AppMonitorName;
use crate::template::AppMonitorSnapshot;

/// Looks up app monitors by name.
pub trait MonitorSource {
    /// Fetch the app monitor, or `None` when the service returned no monitor.
    fn fetch(
        &self,
        name: &AppMonitorName,
    ) -> impl Future<Output = Result<Option<AppMonitorSnapshot>, CoreError>> + Send;
}

/// `MonitorSource` backed by the CloudWatch RUM API.
#[derive(Clone)]
pub struct RumMonitorSource {
    client: Client,
}

impl RumMonitorSource {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

impl MonitorSource for RumMonitorSource {
    async fn fetch(&self, name: &AppMonitorName) -> Result<Option<AppMonitorSnapshot>, CoreError> {
        let output = self
            .client
            .get_app_monitor()
            .name(name.as_ref())
            .send()
            .await
            .map_err(aws_sdk_rum::Error::from)?;

        debug!(app_monitor = %name, found = output.app_monitor.is_some(), "fetched app monitor");

        Ok(output.app_monitor.map(AppMonitorSnapshot::from))
    }
}
