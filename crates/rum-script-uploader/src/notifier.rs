use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use rum_script_core::CustomResourceResponse;
use tracing::{info, warn};

use crate::errors::NotifyError;

/// Delays between callback attempts: 500ms, 2s, 5s.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_millis(500),
    Duration::from_secs(2),
    Duration::from_secs(5),
];

/// Delivers custom resource responses to CloudFormation.
pub trait Notifier {
    fn notify(
        &self,
        url: &str,
        response: &CustomResourceResponse,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Notifier that PUTs the response document to the event's pre-signed URL.
#[derive(Clone)]
pub struct CallbackNotifier {
    http: reqwest::Client,
    retry_delays: Vec<Duration>,
}

impl CallbackNotifier {
    /// Create a new notifier whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            retry_delays: RETRY_DELAYS.to_vec(),
        })
    }

    /// Replace the delays slept between attempts.
    #[cfg(test)]
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    async fn put(&self, url: &str, body: &str) -> Result<(), NotifyError> {
        // The URL is signed without a content type, so the header must be empty.
        let resp = self
            .http
            .put(url)
            .header(CONTENT_TYPE, "")
            .body(body.to_owned())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        Ok(())
    }
}

impl Notifier for CallbackNotifier {
    async fn notify(&self, url: &str, response: &CustomResourceResponse) -> Result<(), NotifyError> {
        let body = serde_json::to_string(response)?;

        info!(
            status = ?response.status,
            reason = %response.reason,
            physical_resource_id = %response.physical_resource_id,
            "sending custom resource response"
        );

        let mut delays = self.retry_delays.iter();
        let mut attempt = 0;

        loop {
            let err = match self.put(url, &body).await {
                Ok(()) => {
                    if attempt > 0 {
                        info!(attempt, "callback succeeded after retry");
                    }
                    return Ok(());
                }
                Err(e) => e,
            };

            if err.is_permanent() {
                warn!(attempt, error = %err, "callback rejected, not retrying");
                return Err(err);
            }

            let Some(delay) = delays.next() else {
                warn!(attempt, error = %err, "callback failed, giving up");
                return Err(err);
            };

            attempt += 1;
            warn!(attempt, error = %err, "callback failed, retrying after {delay:?}");
            tokio::time::sleep(*delay).await;
        }
    }
}
